//! # GameConnecting
//!
//! A game lobby server with friends, rooms, and a realtime relay.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Database connection pool and migrations
//! - Redis client
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use gameconnecting::config::Settings;
use gameconnecting::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    gameconnecting::telemetry::init_tracing();

    info!("Starting GameConnecting server...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
