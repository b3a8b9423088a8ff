//! Typed Rust client for the Coolify REST API.
//!
//! Covers servers, projects, environments, applications, deployments,
//! databases and services. Every method is one authenticated request
//! against `{base_url}/api/v1`; nothing is cached or retried.

mod types;

pub use types::*;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Config(String),

    #[error(
        "Failed to connect to Coolify server at {base_url}. Please check if the server is running and the URL is correct."
    )]
    Connection {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status. Displays the remote message verbatim.
    #[error("{message}")]
    Api {
        endpoint: &'static str,
        status: StatusCode,
        message: String,
    },

    #[error("coolify api {endpoint} returned an unexpected body: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("coolify api request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to connect to Coolify server: {0}")]
    ConnectionCheck(#[source] Box<Error>),
}

impl Error {
    /// True when the host could not be reached at all, as opposed to the
    /// platform answering with an error.
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::ConnectionCheck(inner) => inner.is_connection(),
            _ => false,
        }
    }

    /// HTTP status of a remote application error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::ConnectionCheck(inner) => inner.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Connection settings for [`CoolifyClient`].
#[derive(Debug, Clone)]
pub struct CoolifyConfig {
    pub base_url: String,
    pub access_token: String,
}

/// Client for the Coolify REST API.
#[derive(Clone)]
pub struct CoolifyClient {
    base_url: String,
    token: String,
    headers: HeaderMap,
    http: reqwest::Client,
}

impl std::fmt::Debug for CoolifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoolifyClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl CoolifyClient {
    pub fn new(config: CoolifyConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(Error::Config("Coolify base URL is required".into()));
        }
        if config.access_token.is_empty() {
            return Err(Error::Config("Coolify access token is required".into()));
        }

        let base_url = config
            .base_url
            .strip_suffix('/')
            .unwrap_or(&config.base_url)
            .to_string();

        Ok(Self {
            base_url,
            token: config.access_token,
            headers: HeaderMap::new(),
            http: reqwest::Client::new(),
        })
    }

    /// Attach extra headers to every request. `Authorization` and
    /// `Content-Type` are always overwritten with the client's own values.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    fn required_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| Error::Config("Coolify access token is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Send a prepared request and decode the JSON body into `T`.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        endpoint: &'static str,
    ) -> Result<T> {
        let resp = builder
            .headers(self.headers.clone())
            .headers(self.required_headers()?)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(Self::api_error(endpoint, status, &body));
        }

        serde_json::from_slice(&body).map_err(|source| Error::Decode { endpoint, source })
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        body: &B,
        endpoint: &'static str,
    ) -> Result<T> {
        self.send(builder.json(body), endpoint).await
    }

    fn classify(&self, e: reqwest::Error) -> Error {
        if e.is_connect() {
            Error::Connection {
                base_url: self.base_url.clone(),
                source: e,
            }
        } else {
            Error::Request(e)
        }
    }

    fn api_error(endpoint: &'static str, status: StatusCode, body: &[u8]) -> Error {
        let remote: ErrorResponse = serde_json::from_slice(body).unwrap_or_default();
        let message = remote
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown Status")
                )
            });
        Error::Api {
            endpoint,
            status,
            message,
        }
    }

    // ── Servers ─────────────────────────────────────────────────────

    pub async fn list_servers(&self) -> Result<Vec<Server>> {
        self.send(self.request(Method::GET, "/servers"), "list servers")
            .await
    }

    pub async fn get_server(&self, uuid: &str) -> Result<Server> {
        self.send(
            self.request(Method::GET, &format!("/servers/{uuid}")),
            "get server",
        )
        .await
    }

    pub async fn get_server_resources(&self, uuid: &str) -> Result<ServerResources> {
        self.send(
            self.request(Method::GET, &format!("/servers/{uuid}/resources")),
            "get server resources",
        )
        .await
    }

    pub async fn get_server_domains(&self, uuid: &str) -> Result<Vec<ServerDomain>> {
        self.send(
            self.request(Method::GET, &format!("/servers/{uuid}/domains")),
            "get server domains",
        )
        .await
    }

    pub async fn validate_server(&self, uuid: &str) -> Result<MessageResponse> {
        self.send(
            self.request(Method::GET, &format!("/servers/{uuid}/validate")),
            "validate server",
        )
        .await
    }

    /// Startup precondition: the server list must be reachable with the
    /// configured credentials.
    pub async fn validate_connection(&self) -> Result<()> {
        self.list_servers()
            .await
            .map(|_| ())
            .map_err(|e| Error::ConnectionCheck(Box::new(e)))
    }

    // ── Projects ────────────────────────────────────────────────────

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.send(self.request(Method::GET, "/projects"), "list projects")
            .await
    }

    pub async fn get_project(&self, uuid: &str) -> Result<Project> {
        self.send(
            self.request(Method::GET, &format!("/projects/{uuid}")),
            "get project",
        )
        .await
    }

    pub async fn create_project(&self, req: &CreateProjectRequest) -> Result<CreatedResource> {
        self.send_json(self.request(Method::POST, "/projects"), req, "create project")
            .await
    }

    pub async fn update_project(&self, uuid: &str, req: &UpdateProjectRequest) -> Result<Project> {
        self.send_json(
            self.request(Method::PATCH, &format!("/projects/{uuid}")),
            req,
            "update project",
        )
        .await
    }

    pub async fn delete_project(&self, uuid: &str) -> Result<MessageResponse> {
        self.send(
            self.request(Method::DELETE, &format!("/projects/{uuid}")),
            "delete project",
        )
        .await
    }

    /// Look up an environment of a project by name or uuid.
    pub async fn get_project_environment(
        &self,
        project_uuid: &str,
        environment_name_or_uuid: &str,
    ) -> Result<Environment> {
        self.send(
            self.request(
                Method::GET,
                &format!("/projects/{project_uuid}/{environment_name_or_uuid}"),
            ),
            "get project environment",
        )
        .await
    }

    // ── Environments ────────────────────────────────────────────────

    pub async fn list_environments(&self, project_uuid: Option<&str>) -> Result<Vec<Environment>> {
        let mut builder = self.request(Method::GET, "/environments");
        if let Some(p) = project_uuid {
            builder = builder.query(&[("project_uuid", p)]);
        }
        self.send(builder, "list environments").await
    }

    pub async fn get_environment(&self, uuid: &str) -> Result<Environment> {
        self.send(
            self.request(Method::GET, &format!("/environments/{uuid}")),
            "get environment",
        )
        .await
    }

    pub async fn create_environment(
        &self,
        req: &CreateEnvironmentRequest,
    ) -> Result<CreatedResource> {
        self.send_json(
            self.request(Method::POST, "/environments"),
            req,
            "create environment",
        )
        .await
    }

    pub async fn update_environment_variables(
        &self,
        uuid: &str,
        req: &UpdateEnvironmentVariablesRequest,
    ) -> Result<Environment> {
        self.send_json(
            self.request(Method::PUT, &format!("/environments/{uuid}/variables")),
            req,
            "update environment variables",
        )
        .await
    }

    pub async fn delete_environment(&self, uuid: &str) -> Result<MessageResponse> {
        self.send(
            self.request(Method::DELETE, &format!("/environments/{uuid}")),
            "delete environment",
        )
        .await
    }

    // ── Applications ────────────────────────────────────────────────

    pub async fn list_applications(&self) -> Result<Vec<Application>> {
        self.send(self.request(Method::GET, "/applications"), "list applications")
            .await
    }

    pub async fn get_application(&self, uuid: &str) -> Result<Application> {
        self.send(
            self.request(Method::GET, &format!("/applications/{uuid}")),
            "get application",
        )
        .await
    }

    pub async fn create_application(
        &self,
        req: &CreateApplicationRequest,
    ) -> Result<CreatedResource> {
        self.send_json(
            self.request(Method::POST, "/applications"),
            req,
            "create application",
        )
        .await
    }

    pub async fn delete_application(&self, uuid: &str) -> Result<MessageResponse> {
        self.send(
            self.request(Method::DELETE, &format!("/applications/{uuid}")),
            "delete application",
        )
        .await
    }

    /// Trigger a deployment. Sent without a body.
    pub async fn deploy_application(&self, uuid: &str) -> Result<Deployment> {
        self.send(
            self.request(Method::POST, &format!("/applications/{uuid}/deploy")),
            "deploy application",
        )
        .await
    }

    pub async fn start_application(&self, uuid: &str) -> Result<MessageResponse> {
        self.send(
            self.request(Method::POST, &format!("/applications/{uuid}/start")),
            "start application",
        )
        .await
    }

    pub async fn stop_application(&self, uuid: &str) -> Result<MessageResponse> {
        self.send(
            self.request(Method::POST, &format!("/applications/{uuid}/stop")),
            "stop application",
        )
        .await
    }

    pub async fn restart_application(&self, uuid: &str) -> Result<MessageResponse> {
        self.send(
            self.request(Method::POST, &format!("/applications/{uuid}/restart")),
            "restart application",
        )
        .await
    }

    // ── Deployments ─────────────────────────────────────────────────

    pub async fn list_deployments(&self) -> Result<Vec<Deployment>> {
        self.send(self.request(Method::GET, "/deployments"), "list deployments")
            .await
    }

    pub async fn get_deployment(&self, uuid: &str) -> Result<Deployment> {
        self.send(
            self.request(Method::GET, &format!("/deployments/{uuid}")),
            "get deployment",
        )
        .await
    }

    // ── Databases ───────────────────────────────────────────────────

    pub async fn list_databases(&self) -> Result<Vec<Database>> {
        self.send(self.request(Method::GET, "/databases"), "list databases")
            .await
    }

    pub async fn get_database(&self, uuid: &str) -> Result<Database> {
        self.send(
            self.request(Method::GET, &format!("/databases/{uuid}")),
            "get database",
        )
        .await
    }

    pub async fn update_database(
        &self,
        uuid: &str,
        req: &UpdateDatabaseRequest,
    ) -> Result<Database> {
        self.send_json(
            self.request(Method::PATCH, &format!("/databases/{uuid}")),
            req,
            "update database",
        )
        .await
    }

    pub async fn delete_database(
        &self,
        uuid: &str,
        options: &DeleteOptions,
    ) -> Result<MessageResponse> {
        self.send(
            self.request(Method::DELETE, &format!("/databases/{uuid}"))
                .query(options),
            "delete database",
        )
        .await
    }

    // ── Services ────────────────────────────────────────────────────

    pub async fn list_services(&self) -> Result<Vec<Service>> {
        self.send(self.request(Method::GET, "/services"), "list services")
            .await
    }

    pub async fn get_service(&self, uuid: &str) -> Result<Service> {
        self.send(
            self.request(Method::GET, &format!("/services/{uuid}")),
            "get service",
        )
        .await
    }

    pub async fn create_service(&self, req: &CreateServiceRequest) -> Result<CreatedResource> {
        self.send_json(self.request(Method::POST, "/services"), req, "create service")
            .await
    }

    pub async fn delete_service(
        &self,
        uuid: &str,
        options: &DeleteOptions,
    ) -> Result<MessageResponse> {
        self.send(
            self.request(Method::DELETE, &format!("/services/{uuid}"))
                .query(options),
            "delete service",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, token: &str) -> CoolifyConfig {
        CoolifyConfig {
            base_url: base_url.into(),
            access_token: token.into(),
        }
    }

    #[test]
    fn rejects_empty_base_url() {
        let err = CoolifyClient::new(config("", "token")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.to_string(), "Coolify base URL is required");
    }

    #[test]
    fn rejects_empty_token() {
        let err = CoolifyClient::new(config("http://coolify.test", "")).unwrap_err();
        assert_eq!(err.to_string(), "Coolify access token is required");
    }

    #[test]
    fn strips_single_trailing_slash() {
        let client = CoolifyClient::new(config("http://coolify.test/", "t")).unwrap();
        assert_eq!(client.base_url(), "http://coolify.test");
        assert_eq!(client.url("/servers"), "http://coolify.test/api/v1/servers");

        let client = CoolifyClient::new(config("http://coolify.test//", "t")).unwrap();
        assert_eq!(client.base_url(), "http://coolify.test/");
    }

    #[test]
    fn api_error_prefers_remote_message() {
        let body = br#"{"error":"Not Found","status":404,"message":"Server not found"}"#;
        let err = CoolifyClient::api_error("get server", StatusCode::NOT_FOUND, body);
        assert_eq!(err.to_string(), "Server not found");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn api_error_falls_back_to_status_line() {
        let err = CoolifyClient::api_error("list servers", StatusCode::BAD_GATEWAY, b"<html>");
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");

        let err = CoolifyClient::api_error("list servers", StatusCode::UNAUTHORIZED, br#"{"message":""}"#);
        assert_eq!(err.to_string(), "HTTP 401: Unauthorized");
    }

    #[test]
    fn service_type_wire_names() {
        assert_eq!(ServiceType::CodeServer.as_str(), "code-server");
        let parsed: ServiceType = serde_json::from_str(r#""n8n-with-postgresql""#).unwrap();
        assert_eq!(parsed, ServiceType::N8nWithPostgresql);
        assert!(ServiceType::ALL.len() > 80);
    }
}
