//! Tool and resource tables.
//!
//! Tools are registered once at startup with a typed input. The input type
//! supplies both the advertised JSON schema and the deserialization target,
//! so the catalog and the handlers cannot drift apart.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use coolify_api::CoolifyClient;
use schemars::JsonSchema;
use schemars::generate::SchemaSettings;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::protocol::{McpError, ResourceContent, ResourceDefinition, ToolDefinition};
use crate::validate::validate;

pub const JSON_MIME_TYPE: &str = "application/json";

// ============================================================================
// Tool Types
// ============================================================================

/// Why a tool call was refused before reaching the platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid input: {}", .0.join("; "))]
    InvalidInput(Vec<String>),
}

/// Result of a tool call that reached the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(Value),
    Failure(String),
}

impl ToolOutcome {
    pub fn from_result<T: Serialize>(result: coolify_api::Result<T>) -> Self {
        match result {
            Ok(value) => match serde_json::to_value(&value) {
                Ok(json) => Self::Success(json),
                Err(e) => Self::Failure(e.to_string()),
            },
            Err(e) => Self::Failure(e.to_string()),
        }
    }
}

pub type ToolFuture = Pin<Box<dyn Future<Output = ToolOutcome> + Send>>;

/// Decodes the arguments and starts the call. Decoding failures surface
/// before any request is made.
pub type ToolHandler =
    Arc<dyn Fn(CoolifyClient, Value) -> Result<ToolFuture, DispatchError> + Send + Sync>;

pub struct RegisteredTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub handler: ToolHandler,
}

// ============================================================================
// Resource Types
// ============================================================================

/// Placeholder values captured from a matched URI pattern.
pub type UriParams = HashMap<String, String>;

pub type ResourceFuture = Pin<Box<dyn Future<Output = Result<String, String>> + Send>>;

pub type ResourceHandler = Arc<dyn Fn(CoolifyClient, UriParams) -> ResourceFuture + Send + Sync>;

pub struct RegisteredResource {
    pub uri_pattern: String,
    pub name: String,
    pub description: Option<String>,
    pub mime_type: Option<String>,
    pub handler: ResourceHandler,
}

// ============================================================================
// Registry
// ============================================================================

pub struct McpRegistry {
    tools: BTreeMap<String, RegisteredTool>,
    resources: Vec<RegisteredResource>,
}

impl McpRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
            resources: Vec::new(),
        }
    }

    /// Panics on a duplicate name.
    pub fn register_tool(&mut self, tool: RegisteredTool) {
        assert!(
            !self.tools.contains_key(&tool.name),
            "tool {} registered twice",
            tool.name
        );
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Panics on a duplicate URI pattern.
    pub fn register_resource(&mut self, resource: RegisteredResource) {
        assert!(
            !self
                .resources
                .iter()
                .any(|r| r.uri_pattern == resource.uri_pattern),
            "resource {} registered twice",
            resource.uri_pattern
        );
        self.resources.push(resource);
    }

    /// Catalog entries, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: tool.input_schema.clone(),
            })
            .collect()
    }

    pub fn get_tool(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// Look up, validate and run a tool. Missing arguments are treated as
    /// an empty object.
    pub async fn call_tool(
        &self,
        client: &CoolifyClient,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolOutcome, DispatchError> {
        let tool = self
            .get_tool(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;

        let arguments = arguments.unwrap_or_else(|| Value::Object(Default::default()));
        let violations = validate(&tool.input_schema, &arguments);
        if !violations.is_empty() {
            return Err(DispatchError::InvalidInput(violations));
        }

        let call = (tool.handler)(client.clone(), arguments)?;
        Ok(call.await)
    }

    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        self.resources
            .iter()
            .map(|resource| ResourceDefinition {
                uri: resource.uri_pattern.clone(),
                name: resource.name.clone(),
                description: resource.description.clone(),
                mime_type: resource.mime_type.clone(),
            })
            .collect()
    }

    /// Exact patterns win over parameterised ones.
    pub fn find_resource(&self, uri: &str) -> Option<(&RegisteredResource, UriParams)> {
        if let Some(resource) = self.resources.iter().find(|r| r.uri_pattern == uri) {
            return Some((resource, UriParams::new()));
        }

        self.resources
            .iter()
            .find_map(|r| match_uri_pattern(&r.uri_pattern, uri).map(|params| (r, params)))
    }

    pub async fn read_resource(
        &self,
        client: &CoolifyClient,
        uri: &str,
    ) -> Result<ResourceContent, McpError> {
        let (resource, params) = self
            .find_resource(uri)
            .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()))?;

        let text = (resource.handler)(client.clone(), params)
            .await
            .map_err(|message| McpError::ResourceReadFailed {
                uri: uri.to_string(),
                message,
            })?;

        Ok(ResourceContent {
            uri: uri.to_string(),
            mime_type: resource.mime_type.clone(),
            text,
        })
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}

impl Default for McpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Match `uri` against a pattern with `{param}` segments. Placeholders
/// must match a non-empty segment.
fn match_uri_pattern(pattern: &str, uri: &str) -> Option<UriParams> {
    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let uri_parts: Vec<&str> = uri.split('/').collect();

    if pattern_parts.len() != uri_parts.len() {
        return None;
    }

    let mut params = UriParams::new();
    for (pattern_part, uri_part) in pattern_parts.iter().zip(uri_parts.iter()) {
        match pattern_part
            .strip_prefix('{')
            .and_then(|p| p.strip_suffix('}'))
        {
            Some(name) if !uri_part.is_empty() => {
                params.insert(name.to_string(), uri_part.to_string());
            }
            Some(_) => return None,
            None if pattern_part != uri_part => return None,
            None => {}
        }
    }

    Some(params)
}

/// Input schema for `T` with every subschema inlined, so the advertised
/// schema is self-contained.
pub fn input_schema_for<T: JsonSchema>() -> Value {
    let schema = SchemaSettings::draft07()
        .with(|s| s.inline_subschemas = true)
        .into_generator()
        .into_root_schema_for::<T>();
    let mut value = serde_json::to_value(schema).unwrap_or_default();
    if let Value::Object(map) = &mut value {
        map.remove("$schema");
        map.remove("title");
    }
    value
}

// ============================================================================
// Builder helpers
// ============================================================================

pub struct ToolBuilder {
    name: String,
    description: String,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Finish the tool. The handler's input type `T` defines the schema.
    pub fn build<T, F, Fut, R>(self, handler: F) -> RegisteredTool
    where
        T: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(CoolifyClient, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = coolify_api::Result<R>> + Send + 'static,
        R: Serialize,
    {
        RegisteredTool {
            name: self.name,
            description: self.description,
            input_schema: input_schema_for::<T>(),
            handler: Arc::new(
                move |client: CoolifyClient, arguments: Value| -> Result<ToolFuture, DispatchError> {
                    let input: T = serde_json::from_value(arguments)
                        .map_err(|e| DispatchError::InvalidInput(vec![e.to_string()]))?;
                    let call = handler(client, input);
                    let fut: ToolFuture = Box::pin(async move { ToolOutcome::from_result(call.await) });
                    Ok(fut)
                },
            ),
        }
    }
}

pub struct ResourceBuilder {
    uri_pattern: String,
    name: String,
    description: Option<String>,
    mime_type: Option<String>,
}

impl ResourceBuilder {
    pub fn new(uri_pattern: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri_pattern: uri_pattern.into(),
            name: name.into(),
            description: None,
            mime_type: Some(JSON_MIME_TYPE.to_string()),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// The handler's value is rendered as pretty-printed JSON.
    pub fn build<F, Fut, R>(self, handler: F) -> RegisteredResource
    where
        F: Fn(CoolifyClient, UriParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = coolify_api::Result<R>> + Send + 'static,
        R: Serialize,
    {
        RegisteredResource {
            uri_pattern: self.uri_pattern,
            name: self.name,
            description: self.description,
            mime_type: self.mime_type,
            handler: Arc::new(move |client: CoolifyClient, params: UriParams| -> ResourceFuture {
                let read = handler(client, params);
                Box::pin(async move {
                    let value = read.await.map_err(|e| e.to_string())?;
                    serde_json::to_string_pretty(&value).map_err(|e| e.to_string())
                })
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Deserialize, JsonSchema)]
    struct EchoInput {
        uuid: String,
        #[serde(default)]
        note: Option<String>,
    }

    fn offline_client() -> CoolifyClient {
        CoolifyClient::new(coolify_api::CoolifyConfig {
            base_url: "http://127.0.0.1:9".into(),
            access_token: "t".into(),
        })
        .unwrap()
    }

    fn echo_registry() -> McpRegistry {
        let mut registry = McpRegistry::new();
        registry.register_tool(ToolBuilder::new("echo").description("Echo the uuid").build(
            |_client, input: EchoInput| async move {
                Ok::<_, coolify_api::Error>(json!({ "uuid": input.uuid, "note": input.note }))
            },
        ));
        registry
    }

    #[test]
    fn uri_pattern_exact_and_param() {
        assert!(match_uri_pattern("coolify://servers", "coolify://servers").is_some());
        assert!(match_uri_pattern("coolify://servers", "coolify://projects").is_none());

        let params = match_uri_pattern("coolify://servers/{uuid}", "coolify://servers/abc").unwrap();
        assert_eq!(params.get("uuid").map(String::as_str), Some("abc"));
    }

    #[test]
    fn uri_pattern_rejects_empty_segment_and_length_mismatch() {
        assert!(match_uri_pattern("coolify://servers/{uuid}", "coolify://servers/").is_none());
        assert!(match_uri_pattern("coolify://servers/{uuid}", "coolify://servers").is_none());
        assert!(match_uri_pattern("coolify://servers/{uuid}", "coolify://servers/a/b").is_none());
    }

    #[test]
    fn schema_lists_required_fields() {
        let schema = input_schema_for::<EchoInput>();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["uuid"]));
        assert!(schema.get("$schema").is_none());
    }

    #[tokio::test]
    async fn call_tool_validates_before_running() {
        let registry = echo_registry();
        let client = offline_client();

        let err = registry.call_tool(&client, "echo", None).await.unwrap_err();
        assert_eq!(err, DispatchError::InvalidInput(vec!["uuid: required".into()]));
        assert_eq!(err.to_string(), "Invalid input: uuid: required");

        let outcome = registry
            .call_tool(&client, "echo", Some(json!({ "uuid": "a" })))
            .await
            .unwrap();
        assert_eq!(outcome, ToolOutcome::Success(json!({ "uuid": "a", "note": null })));
    }

    #[tokio::test]
    async fn unknown_tool_is_rejected() {
        let err = echo_registry()
            .call_tool(&offline_client(), "nope", None)
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::UnknownTool("nope".into()));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_tool_panics() {
        let mut registry = echo_registry();
        registry.register_tool(
            ToolBuilder::new("echo").build(|_client, _input: EchoInput| async move {
                Ok::<_, coolify_api::Error>(())
            }),
        );
    }
}
