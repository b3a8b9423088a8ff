//! MCP protocol handler and the stdio transport.

use std::sync::Arc;

use coolify_api::{CoolifyClient, CoolifyConfig};
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::error::StartupError;
use crate::protocol::{
    InitializeParams, InitializeResult, McpError, McpRequest, McpResponse, PingResult,
    ResourceDefinition, ResourcesListResult, ResourcesReadParams, ResourcesReadResult,
    ToolDefinition, ToolsCallParams, ToolsCallResult, ToolsListResult, JSONRPC_VERSION, methods,
};
use crate::registry::{DispatchError, McpRegistry, ToolOutcome};
use crate::resources::register_all_resources;
use crate::tools::register_all_tools;

/// Per-connection protocol state.
#[derive(Debug, Default)]
pub struct Session {
    initialized: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session for one-shot HTTP requests, where there is no handshake
    /// to wait for.
    pub fn stateless() -> Self {
        Self { initialized: true }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// The Coolify MCP server: a client plus the tool and resource tables.
#[derive(Clone)]
pub struct CoolifyMcpServer {
    client: CoolifyClient,
    registry: Arc<McpRegistry>,
}

impl CoolifyMcpServer {
    /// Build the client and check the platform is reachable. Nothing is
    /// served if the check fails.
    pub async fn start(config: CoolifyConfig) -> Result<Self, StartupError> {
        let client = CoolifyClient::new(config).map_err(StartupError::Client)?;

        client
            .validate_connection()
            .await
            .map_err(StartupError::Connection)?;

        info!(base_url = %client.base_url(), "connected to Coolify");
        Ok(Self::with_client(client))
    }

    /// Wrap an existing client without the startup check.
    pub fn with_client(client: CoolifyClient) -> Self {
        let mut registry = McpRegistry::new();
        register_all_tools(&mut registry);
        register_all_resources(&mut registry);

        debug!(
            tools = registry.tool_count(),
            resources = registry.resource_count(),
            "registry ready"
        );

        Self {
            client,
            registry: Arc::new(registry),
        }
    }

    pub fn client(&self) -> &CoolifyClient {
        &self.client
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.registry.list_tools()
    }

    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolOutcome, DispatchError> {
        debug!(tool = name, "calling tool");

        let outcome = self.registry.call_tool(&self.client, name, arguments).await;
        match &outcome {
            Ok(ToolOutcome::Failure(message)) => warn!(tool = name, %message, "tool failed"),
            Err(e) => warn!(tool = name, error = %e, "tool call rejected"),
            Ok(ToolOutcome::Success(_)) => {}
        }
        outcome
    }

    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        self.registry.list_resources()
    }

    pub async fn read_resource(&self, uri: &str) -> Result<ResourcesReadResult, McpError> {
        debug!(uri, "reading resource");
        let content = self.registry.read_resource(&self.client, uri).await?;
        Ok(ResourcesReadResult {
            contents: vec![content],
        })
    }

    /// Handle one raw JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_message(&self, text: &str, session: &mut Session) -> Option<McpResponse> {
        let raw: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "unparseable message");
                return Some(McpResponse::error(None, McpError::ParseError(e.to_string())));
            }
        };

        let request: McpRequest = match serde_json::from_value(raw.clone()) {
            Ok(request) => request,
            Err(e) => {
                let id = raw.get("id").cloned().and_then(|id| serde_json::from_value(id).ok());
                return Some(McpResponse::error(id, McpError::InvalidRequest(e.to_string())));
            }
        };

        self.handle_request(request, session).await
    }

    pub async fn handle_request(
        &self,
        request: McpRequest,
        session: &mut Session,
    ) -> Option<McpResponse> {
        let Some(id) = request.id.clone() else {
            match request.method.as_str() {
                methods::INITIALIZED => debug!("client finished initialization"),
                other => debug!(method = other, "ignoring notification"),
            }
            return None;
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(McpResponse::error(
                Some(id),
                McpError::InvalidRequest(format!("unsupported jsonrpc version {}", request.jsonrpc)),
            ));
        }

        let method = request.method.as_str();
        let needs_session = method.starts_with("tools/") || method.starts_with("resources/");

        let result = if needs_session && !session.initialized {
            Err(McpError::NotInitialized)
        } else {
            match method {
                methods::INITIALIZE => self.handle_initialize(&request, session),
                methods::PING => to_result(&PingResult {}),
                methods::TOOLS_LIST => to_result(&ToolsListResult {
                    tools: self.list_tools(),
                }),
                methods::TOOLS_CALL => self.handle_tools_call(&request).await,
                methods::RESOURCES_LIST => to_result(&ResourcesListResult {
                    resources: self.list_resources(),
                }),
                methods::RESOURCES_READ => self.handle_resources_read(&request).await,
                other => Err(McpError::MethodNotFound(other.to_string())),
            }
        };

        Some(match result {
            Ok(value) => McpResponse::success(id, value),
            Err(error) => McpResponse::error(Some(id), error),
        })
    }

    fn handle_initialize(
        &self,
        request: &McpRequest,
        session: &mut Session,
    ) -> Result<Value, McpError> {
        let params: InitializeParams = parse_params(request)?.unwrap_or_default();

        if let Some(client_info) = &params.client_info {
            info!(
                client = %client_info.name,
                client_version = client_info.version.as_deref().unwrap_or("unknown"),
                protocol_version = params.protocol_version.as_deref().unwrap_or("unknown"),
                "MCP session initialized"
            );
        }

        session.initialized = true;
        to_result(&InitializeResult::default())
    }

    async fn handle_tools_call(&self, request: &McpRequest) -> Result<Value, McpError> {
        let params: ToolsCallParams = parse_params(request)?
            .ok_or_else(|| McpError::InvalidParams("missing tool name".into()))?;

        let outcome = self.call_tool(&params.name, params.arguments).await?;
        to_result(&ToolsCallResult::from(outcome))
    }

    async fn handle_resources_read(&self, request: &McpRequest) -> Result<Value, McpError> {
        let params: ResourcesReadParams = parse_params(request)?
            .ok_or_else(|| McpError::InvalidParams("missing resource uri".into()))?;

        to_result(&self.read_resource(&params.uri).await?)
    }

    /// Serve line-delimited JSON-RPC on stdin/stdout until EOF.
    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve line-delimited JSON-RPC over any reader/writer pair. One
    /// response line per request, flushed immediately.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut session = Session::new();
        let mut lines = reader.lines();

        info!("MCP server listening on stdio");

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some(response) = self.handle_message(line, &mut session).await else {
                continue;
            };

            let json = match serde_json::to_string(&response) {
                Ok(json) => json,
                Err(e) => {
                    error!(error = %e, "failed to serialize MCP response");
                    continue;
                }
            };

            writer.write_all(json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        info!("MCP session closed");
        Ok(())
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(request: &McpRequest) -> Result<Option<T>, McpError> {
    request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn to_result<T: Serialize>(value: &T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::InternalError(e.to_string()))
}
