//! # Messenger Server
//!
//! Messaging backend for chats, messages, folders and privacy rules.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Storage backend (PostgreSQL or in-memory)
//! - HTTP server

use anyhow::Result;
use tracing::info;

use messenger_server::config::Settings;
use messenger_server::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    messenger_server::telemetry::init_tracing();

    info!("Starting Messenger Server...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        backend = ?settings.database.backend,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    info!("Server stopped");
    Ok(())
}
