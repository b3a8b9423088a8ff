use coolify_api::{CoolifyClient, CreateServiceRequest};

use super::{DeleteInput, NoInput, UuidInput};
use crate::registry::{McpRegistry, ToolBuilder};

pub fn register(registry: &mut McpRegistry) {
    registry.register_tool(
        ToolBuilder::new("list_services")
            .description("List all services")
            .build(|client: CoolifyClient, _: NoInput| async move { client.list_services().await }),
    );

    registry.register_tool(
        ToolBuilder::new("get_service")
            .description("Get a service by uuid")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.get_service(&input.uuid).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("create_service")
            .description("Create a service from one of the one-click templates")
            .build(|client: CoolifyClient, input: CreateServiceRequest| async move {
                client.create_service(&input).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("delete_service")
            .description("Delete a service, optionally removing its volumes and configuration")
            .build(|client: CoolifyClient, input: DeleteInput| async move {
                client.delete_service(&input.uuid, &input.options).await
            }),
    );
}
