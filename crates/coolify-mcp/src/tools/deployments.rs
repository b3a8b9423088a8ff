use coolify_api::CoolifyClient;

use super::{NoInput, UuidInput};
use crate::registry::{McpRegistry, ToolBuilder};

pub fn register(registry: &mut McpRegistry) {
    registry.register_tool(
        ToolBuilder::new("list_deployments")
            .description("List deployments that are queued or in progress")
            .build(|client: CoolifyClient, _: NoInput| async move {
                client.list_deployments().await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("get_deployment")
            .description("Get a deployment by uuid")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.get_deployment(&input.uuid).await
            }),
    );
}
