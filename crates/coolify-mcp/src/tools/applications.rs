use coolify_api::{CoolifyClient, CreateApplicationRequest};

use super::{NoInput, UuidInput};
use crate::registry::{McpRegistry, ToolBuilder};

pub fn register(registry: &mut McpRegistry) {
    registry.register_tool(
        ToolBuilder::new("list_applications")
            .description("List all applications")
            .build(|client: CoolifyClient, _: NoInput| async move {
                client.list_applications().await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("get_application")
            .description("Get an application by uuid")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.get_application(&input.uuid).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("create_application")
            .description("Create an application from a public git repository")
            .build(|client: CoolifyClient, input: CreateApplicationRequest| async move {
                client.create_application(&input).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("delete_application")
            .description("Delete an application")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.delete_application(&input.uuid).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("deploy_application")
            .description("Queue a new deployment of an application")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.deploy_application(&input.uuid).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("start_application")
            .description("Start a stopped application")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.start_application(&input.uuid).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("stop_application")
            .description("Stop a running application")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.stop_application(&input.uuid).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("restart_application")
            .description("Restart an application")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.restart_application(&input.uuid).await
            }),
    );
}
