use coolify_api::CoolifyClient;

use super::{NoInput, UuidInput};
use crate::registry::{McpRegistry, ToolBuilder};

pub fn register(registry: &mut McpRegistry) {
    registry.register_tool(
        ToolBuilder::new("list_servers")
            .description("List all servers registered in Coolify")
            .build(|client: CoolifyClient, _: NoInput| async move { client.list_servers().await }),
    );

    registry.register_tool(
        ToolBuilder::new("get_server")
            .description("Get details of a server by uuid")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.get_server(&input.uuid).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("get_server_resources")
            .description("List the applications, databases and services running on a server")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.get_server_resources(&input.uuid).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("get_server_domains")
            .description("List the domains routed to a server, grouped by IP")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.get_server_domains(&input.uuid).await
            }),
    );

    registry.register_tool(
        ToolBuilder::new("validate_server")
            .description("Check that Coolify can reach and manage a server")
            .build(|client: CoolifyClient, input: UuidInput| async move {
                client.validate_server(&input.uuid).await
            }),
    );
}
