use coolify_api::{CoolifyClient, CreateProjectRequest, UpdateProjectRequest};
use schemars::JsonSchema;
use serde::Deserialize;

use super::{NoInput, UuidInput};
use crate::registry::{McpRegistry, ToolBuilder};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateProjectInput {
    /// Uuid of the project to update
    pub uuid: String,
    #[serde(flatten)]
    pub changes: UpdateProjectRequest,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProjectEnvironmentInput {
    /// Uuid of the project
    pub project_uuid: String,
    /// Environment name (e.g. "production") or uuid
    pub environment_name_or_uuid: String,
}

pub fn register(registry: &mut McpRegistry) {
    registry.register_tool(
        ToolBuilder::new("list_projects")
            .description("List all projects")
            .build(|client: CoolifyClient, _: NoInput| async move { client.list_projects().await }),
    );

    registry.register_tool(
        ToolBuilder::new("get_project")
            .description("Get a project by uuid, including its environments")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.get_project(&input.uuid).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("create_project")
            .description("Create a new project")
            .build(|client: CoolifyClient, input: CreateProjectRequest| async move {
                client.create_project(&input).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("update_project")
            .description("Rename a project or change its description")
            .build(|client: CoolifyClient, input: UpdateProjectInput| async move {
                client.update_project(&input.uuid, &input.changes).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("delete_project")
            .description("Delete a project. The project must be empty")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.delete_project(&input.uuid).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("get_project_environment")
            .description("Get one environment of a project by name or uuid")
            .build(|client: CoolifyClient, input: ProjectEnvironmentInput| async move {
                client
                    .get_project_environment(&input.project_uuid, &input.environment_name_or_uuid)
                    .await
            }),
    );
}
