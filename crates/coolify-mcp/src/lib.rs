//! Model Context Protocol adapter for Coolify.
//!
//! Exposes the Coolify REST API as MCP tools and `coolify://` resources,
//! over stdio or HTTP.

pub mod config;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod server;
pub mod tools;
mod validate;

pub use config::{AppConfig, ConfigError, Transport};
pub use error::StartupError;
pub use server::{CoolifyMcpServer, Session};
