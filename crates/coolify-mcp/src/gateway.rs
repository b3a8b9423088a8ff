//! HTTP mode: the JSON-RPC endpoint plus a small REST gateway for
//! automation tools that cannot speak MCP.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::{StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use coolify_api::CreateProjectRequest;
use serde::Serialize;
use serde_json::{Value, json};
use subtle::ConstantTimeEq;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::{CoolifyMcpServer, Session};

#[derive(Clone)]
pub struct GatewayState {
    server: CoolifyMcpServer,
    api_key: Option<Arc<str>>,
}

impl GatewayState {
    pub fn new(server: CoolifyMcpServer, api_key: Option<String>) -> Self {
        Self {
            server,
            api_key: api_key.map(Arc::from),
        }
    }
}

// ============================================================================
// Envelope and errors
// ============================================================================

/// Body of every gateway response.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }
}

impl Envelope<()> {
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Endpoint not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Coolify(#[from] coolify_api::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Coolify(e) if e.is_connection() => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Coolify(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::warn!(%status, error = %self, "gateway request failed");
        }

        (status, Json(Envelope::err(self.to_string()))).into_response()
    }
}

type GatewayResult<T> = Result<Json<Envelope<T>>, GatewayError>;

fn ok<T>(data: T) -> GatewayResult<T> {
    Ok(Json(Envelope::ok(data)))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: GatewayState) -> Router {
    let authed = Router::new()
        .route("/", get(index))
        .route("/mcp", post(mcp))
        .route("/servers", get(list_servers))
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/{uuid}", delete(delete_project))
        .route("/applications", get(list_applications))
        .route("/applications/{uuid}", get(get_application))
        .route("/applications/{uuid}/{action}", post(application_action))
        .route("/services", get(list_services))
        .route("/databases", get(list_databases))
        .route("/deployments", get(list_deployments))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(authed)
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Requires `Authorization: Bearer <key>` when a gateway key is configured.
async fn auth_middleware(State(state): State<GatewayState>, req: Request, next: Next) -> Response {
    match validate_request(&state, &req) {
        Ok(()) => next.run(req).await,
        Err(e) => e.into_response(),
    }
}

fn validate_request(state: &GatewayState, req: &Request) -> Result<(), GatewayError> {
    let Some(expected) = state.api_key.as_deref() else {
        return Ok(());
    };

    let token = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(GatewayError::Unauthorized)?;

    if !bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
        return Err(GatewayError::Unauthorized);
    }

    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

async fn not_found(uri: Uri) -> GatewayError {
    GatewayError::NotFound(uri.path().to_string())
}

async fn index() -> GatewayResult<Value> {
    ok(json!({
        "message": "Coolify MCP gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /mcp": "MCP JSON-RPC endpoint",
            "GET /health": "Check API health",
            "GET /servers": "List all servers",
            "GET /projects": "List all projects",
            "POST /projects": "Create project (body: {name, description})",
            "DELETE /projects/:uuid": "Delete project",
            "GET /applications": "List all applications",
            "GET /applications/:uuid": "Get application details",
            "POST /applications/:uuid/start": "Start application",
            "POST /applications/:uuid/stop": "Stop application",
            "POST /applications/:uuid/restart": "Restart application",
            "POST /applications/:uuid/deploy": "Deploy application",
            "GET /services": "List all services",
            "GET /databases": "List all databases",
            "GET /deployments": "List all deployments"
        }
    }))
}

/// One JSON-RPC message per request. Notifications get `202 Accepted`.
async fn mcp(State(state): State<GatewayState>, body: String) -> Response {
    let mut session = Session::stateless();
    match state.server.handle_message(&body, &mut session).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn health(State(state): State<GatewayState>) -> Response {
    let client = state.server.client();
    match client.list_projects().await {
        Ok(_) => Json(Envelope::ok(json!({
            "status": "healthy",
            "coolify": { "connected": true, "baseUrl": client.base_url() }
        })))
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            let body = Envelope {
                success: false,
                data: Some(json!({ "status": "unhealthy", "error": e.to_string() })),
                error: None,
                timestamp: Utc::now(),
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}

async fn list_servers(State(state): State<GatewayState>) -> GatewayResult<Vec<coolify_api::Server>> {
    ok(state.server.client().list_servers().await?)
}

async fn list_projects(State(state): State<GatewayState>) -> GatewayResult<Vec<coolify_api::Project>> {
    ok(state.server.client().list_projects().await?)
}

async fn create_project(
    State(state): State<GatewayState>,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<coolify_api::CreatedResource>>), GatewayError> {
    let Json(req) = body.map_err(|e| GatewayError::BadRequest(e.body_text()))?;
    let created = state.server.client().create_project(&req).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

async fn delete_project(
    State(state): State<GatewayState>,
    Path(uuid): Path<String>,
) -> GatewayResult<coolify_api::MessageResponse> {
    ok(state.server.client().delete_project(&uuid).await?)
}

async fn list_applications(
    State(state): State<GatewayState>,
) -> GatewayResult<Vec<coolify_api::Application>> {
    ok(state.server.client().list_applications().await?)
}

async fn get_application(
    State(state): State<GatewayState>,
    Path(uuid): Path<String>,
) -> GatewayResult<coolify_api::Application> {
    ok(state.server.client().get_application(&uuid).await?)
}

async fn application_action(
    State(state): State<GatewayState>,
    Path((uuid, action)): Path<(String, String)>,
) -> GatewayResult<Value> {
    let client = state.server.client();
    let data = match action.as_str() {
        "start" => to_value(client.start_application(&uuid).await?)?,
        "stop" => to_value(client.stop_application(&uuid).await?)?,
        "restart" => to_value(client.restart_application(&uuid).await?)?,
        "deploy" => to_value(client.deploy_application(&uuid).await?)?,
        _ => {
            return Err(GatewayError::NotFound(format!(
                "/applications/{uuid}/{action}"
            )));
        }
    };
    ok(data)
}

async fn list_services(State(state): State<GatewayState>) -> GatewayResult<Vec<coolify_api::Service>> {
    ok(state.server.client().list_services().await?)
}

async fn list_databases(
    State(state): State<GatewayState>,
) -> GatewayResult<Vec<coolify_api::Database>> {
    ok(state.server.client().list_databases().await?)
}

async fn list_deployments(
    State(state): State<GatewayState>,
) -> GatewayResult<Vec<coolify_api::Deployment>> {
    ok(state.server.client().list_deployments().await?)
}

fn to_value<T: Serialize>(value: T) -> Result<Value, GatewayError> {
    serde_json::to_value(value).map_err(|e| GatewayError::Internal(e.to_string()))
}
