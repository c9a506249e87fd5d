//! # Chat Backend
//!
//! Group chat and AI chat HTTP backend.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Database connection pool and migrations
//! - HTTP server

use anyhow::Result;
use tracing::info;

use chat_backend::config::Settings;
use chat_backend::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    chat_backend::telemetry::init_tracing();

    info!("Starting Chat Backend...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        model = %settings.completion.model,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
