use coolify_api::{CoolifyClient, UpdateDatabaseRequest};
use schemars::JsonSchema;
use serde::Deserialize;

use super::{DeleteInput, NoInput, UuidInput};
use crate::registry::{McpRegistry, ToolBuilder};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateDatabaseInput {
    /// Uuid of the database to update
    pub uuid: String,
    #[serde(flatten)]
    pub changes: UpdateDatabaseRequest,
}

pub fn register(registry: &mut McpRegistry) {
    registry.register_tool(
        ToolBuilder::new("list_databases")
            .description("List all databases")
            .build(|client: CoolifyClient, _: NoInput| async move { client.list_databases().await }),
    );

    registry.register_tool(
        ToolBuilder::new("get_database")
            .description("Get a database by uuid")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.get_database(&input.uuid).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("update_database")
            .description("Update database settings. Only the fields given are changed")
            .build(|client: CoolifyClient, input: UpdateDatabaseInput| async move {
                client.update_database(&input.uuid, &input.changes).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("delete_database")
            .description("Delete a database, optionally removing its volumes and configuration")
            .build(|client: CoolifyClient, input: DeleteInput| async move {
                client.delete_database(&input.uuid, &input.options).await
            }),
    );
}
