use coolify_api::{CoolifyClient, CreateEnvironmentRequest, UpdateEnvironmentVariablesRequest};
use schemars::JsonSchema;
use serde::Deserialize;

use super::UuidInput;
use crate::registry::{McpRegistry, ToolBuilder};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListEnvironmentsInput {
    /// Only list environments of this project
    #[serde(default)]
    pub project_uuid: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateVariablesInput {
    /// Uuid of the environment
    pub uuid: String,
    #[serde(flatten)]
    pub request: UpdateEnvironmentVariablesRequest,
}

pub fn register(registry: &mut McpRegistry) {
    registry.register_tool(
        ToolBuilder::new("list_environments")
            .description("List environments, optionally scoped to one project")
            .build(|client: CoolifyClient, input: ListEnvironmentsInput| async move {
                client
                    .list_environments(input.project_uuid.as_deref())
                    .await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("get_environment")
            .description("Get an environment by uuid")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.get_environment(&input.uuid).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("create_environment")
            .description("Create an environment inside a project")
            .build(|client: CoolifyClient, input: CreateEnvironmentRequest| async move {
                client.create_environment(&input).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("update_environment_variables")
            .description("Replace the variables of an environment")
            .build(|client: CoolifyClient, input: UpdateVariablesInput| async move {
                client
                    .update_environment_variables(&input.uuid, &input.request)
                    .await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("delete_environment")
            .description("Delete an environment")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.delete_environment(&input.uuid).await
            }),
    );
}
