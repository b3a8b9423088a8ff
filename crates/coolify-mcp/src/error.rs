use std::net::SocketAddr;

use crate::config::ConfigError;

/// Anything that stops the server before it serves its first message.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to start Coolify MCP server: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start Coolify MCP server: {0}")]
    Client(#[source] coolify_api::Error),

    #[error("Failed to start Coolify MCP server: {0}")]
    Connection(#[source] coolify_api::Error),

    #[error("Failed to start Coolify MCP server: could not bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
