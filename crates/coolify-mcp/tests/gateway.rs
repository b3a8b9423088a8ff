use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use coolify_api::{CoolifyClient, CoolifyConfig};
use coolify_mcp::CoolifyMcpServer;
use coolify_mcp::gateway::{GatewayState, router};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(base_url: String, api_key: Option<&str>) -> Router {
    let client = CoolifyClient::new(CoolifyConfig {
        base_url,
        access_token: "test-token".into(),
    })
    .unwrap();
    router(GatewayState::new(
        CoolifyMcpServer::with_client(client),
        api_key.map(String::from),
    ))
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_connected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let (status, body) = call(app(mock_server.uri(), None), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["coolify"]["connected"], true);
    assert_eq!(body["data"]["coolify"]["baseUrl"], mock_server.uri());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn health_reports_unreachable_platform() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    drop(mock_server);

    let (status, body) = call(app(uri, None), get("/health")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["status"], "unhealthy");
    assert!(
        body["data"]["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to connect to Coolify server at")
    );
}

#[tokio::test]
async fn gateway_key_is_enforced_except_on_health() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = app(mock_server.uri(), Some("gw-key"));

    let (status, body) = call(app.clone(), get("/projects")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unauthorized");

    for presented in ["Bearer nope", "Bearer gw-ke", "Bearer gw-key2", "gw-key"] {
        let wrong = Request::builder()
            .uri("/projects")
            .header("authorization", presented)
            .body(Body::empty())
            .unwrap();
        let (status, _) = call(app.clone(), wrong).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{presented} was accepted");
    }

    let right = Request::builder()
        .uri("/projects")
        .header("authorization", "Bearer gw-key")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(app.clone(), right).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, _) = call(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn application_actions_forward_to_platform() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/applications/app-1/restart"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Restart request queued." })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/applications/app-1/deploy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uuid": "dep-1",
            "status": "queued"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = app(mock_server.uri(), None);

    let (status, body) = call(app.clone(), post_json("/applications/app-1/restart", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Restart request queued.");

    let (status, body) = call(app.clone(), post_json("/applications/app-1/deploy", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["uuid"], "dep-1");

    let (status, body) = call(app, post_json("/applications/app-1/explode", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found: /applications/app-1/explode");
}

#[tokio::test]
async fn create_project_validates_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/projects"))
        .and(body_json(json!({ "name": "demo" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "uuid": "proj-1" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = app(mock_server.uri(), None);

    let (status, body) = call(app.clone(), post_json("/projects", json!({ "name": "demo" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["uuid"], "proj-1");

    let (status, body) = call(app, post_json("/projects", json!({ "description": "no name" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn remote_errors_become_bad_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/applications/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Application not found."
        })))
        .mount(&mock_server)
        .await;

    let (status, body) = call(app(mock_server.uri(), None), get("/applications/missing")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Application not found.");
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (status, body) = call(app("http://127.0.0.1:9".into(), None), get("/volumes")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found: /volumes");
}

#[tokio::test]
async fn mcp_endpoint_speaks_json_rpc() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "uuid": "s1", "name": "main" }
        ])))
        .mount(&mock_server)
        .await;

    let app = app(mock_server.uri(), None);

    let (status, body) = call(
        app.clone(),
        post_json(
            "/mcp",
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": { "name": "list_servers" }
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["isError"], false);
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    assert_eq!(
        serde_json::from_str::<Value>(text).unwrap(),
        json!([{ "uuid": "s1", "name": "main" }])
    );

    let (status, body) = call(
        app,
        post_json(
            "/mcp",
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, Value::Null);
}
