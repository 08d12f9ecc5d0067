mod chat;
mod config;
mod errors;
mod llm_client;
mod portfolio;
mod routes;
mod site;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::portfolio::DirectoryPortfolioSource;
use crate::routes::build_router;
use crate::site::SiteLayout;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("portfolio_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Portfolio API v{}", env!("CARGO_PKG_VERSION"));

    // The credential is checked per request so the site still serves without it.
    if config.api_key.is_none() {
        warn!("No chat credential configured; /api/chat will answer with a configuration error");
    }

    let llm = LlmClient::new(config.chat_api_url.clone(), config.chat_model.clone())?;
    info!("LLM client initialized (model: {})", llm.model());

    let portfolio = Arc::new(DirectoryPortfolioSource::new(&config.data_dir));
    info!("Portfolio data directory: {}", config.data_dir.display());

    let site = SiteLayout::from_config(config.site_pages_dir.clone());

    let state = AppState {
        config: config.clone(),
        llm,
        portfolio,
        site,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
