use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use zaudio_gateway::routes::{cors_layer, create_api_router};
use zaudio_gateway::{AppState, ServerConfig};

/// Z-Audio TTS bridging gateway.
#[derive(Debug, Parser)]
#[command(name = "zaudio-gateway", version, about)]
struct Cli {
    /// Bind address, overrides the HOST environment variable.
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overrides the HTTP_PORT environment variable.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env().context("invalid configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    info!(
        base_url = %config.base_url,
        default_voice = %config.default_voice,
        "Starting Z-Audio gateway"
    );

    let state = Arc::new(AppState::new(config.clone()).context("failed to build HTTP client")?);
    let app = create_api_router().layer(cors_layer()).with_state(state);

    let listener = TcpListener::bind(config.address())
        .await
        .with_context(|| format!("failed to bind {}", config.address()))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .context("server terminated")?;
    Ok(())
}
