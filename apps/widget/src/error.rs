use thiserror::Error;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chat endpoint returned status {0}")]
    Status(u16),

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Failed to (de)serialize history: {0}")]
    Serde(#[from] serde_json::Error),
}
