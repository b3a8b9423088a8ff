//! MCP wire types.
//!
//! MCP is JSON-RPC 2.0 with a fixed set of method names. Only the subset
//! this server speaks is modelled: lifecycle, tools and resources.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::{DispatchError, ToolOutcome};

pub const JSONRPC_VERSION: &str = "2.0";

pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

pub const SERVER_NAME: &str = "coolify-mcp";

// ============================================================================
// Core Message Types
// ============================================================================

/// Incoming message. Notifications carry no `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    /// Serialized as `null` when the request id could not be read.
    pub id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpErrorResponse>,
}

impl McpResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<RequestId>, error: McpError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Request ID can be string or number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpErrorResponse {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// ============================================================================
// Error Codes
// ============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not initialized")]
    NotInitialized,

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Failed to read resource {uri}: {message}")]
    ResourceReadFailed { uri: String, message: String },
}

impl McpError {
    pub fn code(&self) -> i32 {
        match self {
            McpError::ParseError(_) => -32700,
            McpError::InvalidRequest(_) | McpError::NotInitialized => -32600,
            McpError::MethodNotFound(_) => -32601,
            McpError::InvalidParams(_) => -32602,
            McpError::InternalError(_) => -32603,
            McpError::Dispatch(DispatchError::UnknownTool(_)) => -32601,
            McpError::Dispatch(DispatchError::InvalidInput(_)) => -32602,
            McpError::ResourceNotFound(_) => -32002,
            McpError::ResourceReadFailed { .. } => -32603,
        }
    }
}

impl From<McpError> for McpErrorResponse {
    fn from(err: McpError) -> Self {
        let data = match &err {
            McpError::Dispatch(DispatchError::InvalidInput(violations)) => {
                Some(serde_json::json!({ "violations": violations }))
            }
            McpError::ResourceNotFound(uri) | McpError::ResourceReadFailed { uri, .. } => {
                Some(serde_json::json!({ "uri": uri }))
            }
            _ => None,
        };

        McpErrorResponse {
            code: err.code(),
            message: err.to_string(),
            data,
        }
    }
}

// ============================================================================
// MCP Method Names
// ============================================================================

pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const PING: &str = "ping";

    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";

    pub const RESOURCES_LIST: &str = "resources/list";
    pub const RESOURCES_READ: &str = "resources/read";
}

// ============================================================================
// Initialize
// ============================================================================

/// Client side of the handshake. Everything is optional; the server answers
/// with its own protocol version regardless.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

impl Default for InitializeResult {
    fn default() -> Self {
        Self {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability::default(),
                resources: ResourcesCapability {
                    subscribe: Some(false),
                    list_changed: None,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
    pub resources: ResourcesCapability,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapability {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribe: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

// ============================================================================
// Tools
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolsCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Tool call envelope. `isError` is always present on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCallResult {
    pub content: Vec<ToolResultContent>,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolResultContent {
    Text { text: String },
}

impl ToolsCallResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolResultContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolResultContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }
}

impl From<ToolOutcome> for ToolsCallResult {
    fn from(outcome: ToolOutcome) -> Self {
        match outcome {
            ToolOutcome::Success(value) => Self::text(
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
            ),
            ToolOutcome::Failure(message) => Self::error(message),
        }
    }
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ResourcesListResult {
    pub resources: Vec<ResourceDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourcesReadParams {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourcesReadResult {
    pub contents: Vec<ResourceContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PingResult {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_id_accepts_string_and_number() {
        let id: RequestId = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(id, RequestId::String("abc".to_string()));

        let id: RequestId = serde_json::from_str("42").unwrap();
        assert_eq!(id, RequestId::Number(42));
    }

    #[test]
    fn request_without_id_is_notification() {
        let req: McpRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(req.id.is_none());
        assert_eq!(req.method, methods::INITIALIZED);
    }

    #[test]
    fn error_response_keeps_null_id() {
        let resp = McpResponse::error(None, McpError::ParseError("eof".into()));
        let wire = serde_json::to_value(&resp).unwrap();

        assert_eq!(wire["id"], Value::Null);
        assert_eq!(wire["error"]["code"], -32700);
        assert_eq!(wire["error"]["message"], "Parse error: eof");
        assert!(wire.get("result").is_none());
    }

    #[test]
    fn dispatch_errors_map_to_rpc_codes() {
        let unknown = McpError::from(DispatchError::UnknownTool("nope".into()));
        assert_eq!(unknown.code(), -32601);
        assert_eq!(unknown.to_string(), "Unknown tool: nope");

        let invalid = McpError::from(DispatchError::InvalidInput(vec!["uuid: required".into()]));
        assert_eq!(invalid.code(), -32602);

        let body = McpErrorResponse::from(invalid);
        assert_eq!(body.data, Some(json!({ "violations": ["uuid: required"] })));
    }

    #[test]
    fn call_result_always_carries_is_error() {
        let ok = serde_json::to_value(ToolsCallResult::text("{}")).unwrap();
        assert_eq!(ok, json!({ "content": [{ "type": "text", "text": "{}" }], "isError": false }));

        let failed = serde_json::to_value(ToolsCallResult::error("boom")).unwrap();
        assert_eq!(failed["isError"], true);
        assert_eq!(failed["content"][0]["text"], "boom");
    }

    #[test]
    fn outcome_success_is_pretty_json() {
        let result = ToolsCallResult::from(ToolOutcome::Success(json!({ "uuid": "a" })));
        assert_eq!(
            result.content,
            vec![ToolResultContent::Text {
                text: "{\n  \"uuid\": \"a\"\n}".into()
            }]
        );
        assert!(!result.is_error);
    }

    #[test]
    fn initialize_result_advertises_tools_and_resources() {
        let wire = serde_json::to_value(InitializeResult::default()).unwrap();

        assert_eq!(wire["protocolVersion"], "2024-11-05");
        assert_eq!(wire["capabilities"]["tools"], json!({}));
        assert_eq!(wire["capabilities"]["resources"], json!({ "subscribe": false }));
        assert_eq!(wire["serverInfo"]["name"], "coolify-mcp");
    }
}
