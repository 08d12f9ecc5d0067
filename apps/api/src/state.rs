use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::portfolio::PortfolioSource;
use crate::site::SiteLayout;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm: LlmClient,
    /// Read on every chat request; no cross-request cache.
    pub portfolio: Arc<dyn PortfolioSource>,
    pub site: SiteLayout,
}
