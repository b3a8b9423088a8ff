//! Read-only `coolify://` resources.

use coolify_api::CoolifyClient;

use crate::registry::{McpRegistry, ResourceBuilder, UriParams};

fn uuid(params: &UriParams) -> String {
    params.get("uuid").cloned().unwrap_or_default()
}

pub fn register_all_resources(registry: &mut McpRegistry) {
    registry.register_resource(
        ResourceBuilder::new("coolify://servers", "servers")
            .description("All servers registered in Coolify")
            .build(|client: CoolifyClient, _| async move { client.list_servers().await }),
    );

    registry.register_resource(
        ResourceBuilder::new("coolify://servers/{uuid}", "server")
            .description("One server by uuid")
            .build(|client: CoolifyClient, params: UriParams| async move {
                client.get_server(&uuid(&params)).await
            }),
    );

    registry.register_resource(
        ResourceBuilder::new("coolify://projects", "projects")
            .description("All projects")
            .build(|client: CoolifyClient, _| async move { client.list_projects().await }),
    );

    registry.register_resource(
        ResourceBuilder::new("coolify://projects/{uuid}", "project")
            .description("One project by uuid, with its environments")
            .build(|client: CoolifyClient, params: UriParams| async move {
                client.get_project(&uuid(&params)).await
            }),
    );

    registry.register_resource(
        ResourceBuilder::new("coolify://applications", "applications")
            .description("All applications")
            .build(|client: CoolifyClient, _| async move { client.list_applications().await }),
    );

    registry.register_resource(
        ResourceBuilder::new("coolify://databases", "databases")
            .description("All databases")
            .build(|client: CoolifyClient, _| async move { client.list_databases().await }),
    );

    registry.register_resource(
        ResourceBuilder::new("coolify://services", "services")
            .description("All services")
            .build(|client: CoolifyClient, _| async move { client.list_services().await }),
    );

    registry.register_resource(
        ResourceBuilder::new("coolify://deployments", "deployments")
            .description("Deployments that are queued or in progress")
            .build(|client: CoolifyClient, _| async move { client.list_deployments().await }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_uris_win_over_patterns() {
        let mut registry = McpRegistry::new();
        register_all_resources(&mut registry);

        assert_eq!(registry.resource_count(), 8);

        let (resource, params) = registry.find_resource("coolify://servers").unwrap();
        assert_eq!(resource.name, "servers");
        assert!(params.is_empty());

        let (resource, params) = registry.find_resource("coolify://servers/abc").unwrap();
        assert_eq!(resource.name, "server");
        assert_eq!(uuid(&params), "abc");

        assert!(registry.find_resource("coolify://volumes").is_none());
    }

    #[test]
    fn every_resource_is_json() {
        let mut registry = McpRegistry::new();
        register_all_resources(&mut registry);

        for resource in registry.list_resources() {
            assert_eq!(resource.mime_type.as_deref(), Some("application/json"));
            assert!(resource.uri.starts_with("coolify://"));
        }
    }
}
