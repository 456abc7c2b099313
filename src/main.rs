//! NutChat
//!
//! HTTP server for the nutrition chat backend.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use nutchat::api::{self, AppState};
use nutchat::build_info;
use nutchat::chat::ChatService;
use nutchat::config::Config;
use nutchat::db;
use nutchat::llm::GeminiClient;
use nutchat::status::StatusTracker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nutchat=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();

    let config = Config::from_env().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e
    })?;

    eprintln!("Nutrition reference: {}", config.nutrition_path.display());
    let table = db::load_table(&config.nutrition_path, &config.load).map_err(|e| {
        error!(
            path = %config.nutrition_path.display(),
            error = %e,
            "Failed to load nutrition reference"
        );
        e
    })?;
    eprintln!("Loaded {} foods", table.len());
    let table = Arc::new(table);

    let generator = GeminiClient::new(config.api_key.clone(), config.model.clone())
        .with_base_url(config.llm_base_url.clone())
        .with_timeout(config.llm_timeout);
    info!(model = %generator.model(), "Using Gemini backend");

    let chat = ChatService::new(table.clone(), Arc::new(generator))
        .with_advice_language(config.advice_language.clone());
    let status = Arc::new(StatusTracker::new(config.nutrition_path.clone(), table.len()));
    let app = api::create_app(AppState::new(chat, status), config.cors_origins.as_deref());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    eprintln!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
