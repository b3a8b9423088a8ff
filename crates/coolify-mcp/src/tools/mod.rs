//! Tool catalog. One tool per client operation, grouped by resource kind.

mod applications;
mod databases;
mod deployments;
mod environments;
mod projects;
mod servers;
mod services;

use coolify_api::DeleteOptions;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::registry::McpRegistry;

/// Input of tools that take no arguments.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct NoInput {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UuidInput {
    /// Uuid of the target resource
    pub uuid: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteInput {
    /// Uuid of the resource to delete
    pub uuid: String,
    #[serde(flatten)]
    pub options: DeleteOptions,
}

pub fn register_all_tools(registry: &mut McpRegistry) {
    servers::register(registry);
    projects::register(registry);
    environments::register(registry);
    applications::register(registry);
    deployments::register(registry);
    databases::register(registry);
    services::register(registry);
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: [&str; 34] = [
        "create_application",
        "create_environment",
        "create_project",
        "create_service",
        "delete_application",
        "delete_database",
        "delete_environment",
        "delete_project",
        "delete_service",
        "deploy_application",
        "get_application",
        "get_database",
        "get_deployment",
        "get_environment",
        "get_project",
        "get_project_environment",
        "get_server",
        "get_server_domains",
        "get_server_resources",
        "get_service",
        "list_applications",
        "list_databases",
        "list_deployments",
        "list_environments",
        "list_projects",
        "list_servers",
        "list_services",
        "restart_application",
        "start_application",
        "stop_application",
        "update_database",
        "update_environment_variables",
        "update_project",
        "validate_server",
    ];

    fn registry() -> McpRegistry {
        let mut registry = McpRegistry::new();
        register_all_tools(&mut registry);
        registry
    }

    #[test]
    fn catalog_matches_handler_table() {
        let registry = registry();
        let names: Vec<String> = registry.list_tools().into_iter().map(|t| t.name).collect();

        assert_eq!(names, CATALOG);
        assert_eq!(registry.tool_count(), CATALOG.len());
        for name in CATALOG {
            assert!(registry.get_tool(name).is_some(), "{name} has no handler");
        }
    }

    #[test]
    fn every_tool_is_described() {
        for tool in registry().list_tools() {
            assert!(!tool.description.is_empty(), "{} has no description", tool.name);
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
        }
    }

    #[test]
    fn uuid_tools_require_uuid() {
        let registry = registry();
        for name in ["get_server", "delete_project", "deploy_application", "delete_database"] {
            let tool = registry.get_tool(name).unwrap();
            assert_eq!(tool.input_schema["required"], serde_json::json!(["uuid"]), "{name}");
        }
    }

    #[test]
    fn delete_flags_are_flattened_into_the_schema() {
        let registry = registry();
        let schema = &registry.get_tool("delete_service").unwrap().input_schema;
        for flag in [
            "delete_configurations",
            "delete_volumes",
            "docker_cleanup",
            "delete_connected_networks",
        ] {
            assert!(schema["properties"].get(flag).is_some(), "{flag}");
        }
    }

    #[test]
    fn enum_arguments_are_closed() {
        let registry = registry();
        let schema = &registry.get_tool("create_application").unwrap().input_schema;
        let build_pack = serde_json::to_string(&schema["properties"]["build_pack"]).unwrap();
        for pack in ["nixpacks", "static", "dockerfile", "dockercompose"] {
            assert!(build_pack.contains(pack), "{pack}");
        }
    }
}
