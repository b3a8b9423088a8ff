use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use coolify_mcp::gateway::{self, GatewayState};
use coolify_mcp::{AppConfig, CoolifyMcpServer, StartupError, Transport};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries the protocol in stdio mode
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env().map_err(StartupError::from)?;

    info!(base_url = %config.coolify.base_url, transport = ?config.transport, "starting Coolify MCP server");

    let server = CoolifyMcpServer::start(config.coolify.clone()).await?;

    match config.transport {
        Transport::Stdio => server.serve_stdio().await?,
        Transport::Http => {
            let app = gateway::router(GatewayState::new(server, config.gateway_api_key.clone()));

            let listener = tokio::net::TcpListener::bind(config.listen_addr)
                .await
                .map_err(|source| StartupError::Bind {
                    addr: config.listen_addr,
                    source,
                })?;

            info!(
                addr = %config.listen_addr,
                auth = config.gateway_api_key.is_some(),
                "serving MCP over HTTP"
            );

            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
