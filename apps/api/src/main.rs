mod agents;
mod config;
mod db;
mod errors;
mod frameworks;
mod llm_client;
mod models;
mod pipeline;
mod routes;
mod state;
mod store;
mod streaming;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::agents::registry::SpecialistRegistry;
use crate::config::Config;
use crate::db::create_pool;
use crate::frameworks::FrameworkCatalog;
use crate::llm_client::{LlmClient, ModelBackend};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Parley API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (interview-tracking collaborator)
    let db = create_pool(&config.database_url).await?;

    // Initialize the model backend
    let llm: Arc<dyn ModelBackend> = Arc::new(LlmClient::new(config.anthropic_api_key.clone()));
    info!("Model backend initialized (model: {})", llm_client::MODEL);

    // Build the immutable specialist registry and framework catalog
    let registry = Arc::new(SpecialistRegistry::bootstrap());
    info!("Specialist registry loaded: {} specialists", registry.len());

    let frameworks = Arc::new(FrameworkCatalog::bootstrap());
    info!("Framework catalog loaded: {} categories", frameworks.len());

    // Build app state
    let state = AppState {
        db,
        llm,
        registry,
        frameworks,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
