use std::path::PathBuf;

use anyhow::{Context, Result};

/// Default upstream chat-completion endpoint (OpenAI-compatible router).
pub const DEFAULT_CHAT_API_URL: &str = "https://router.huggingface.co/v1/chat/completions";
/// Default upstream model identifier.
pub const DEFAULT_CHAT_MODEL: &str = "Qwen/Qwen2.5-7B-Instruct:together";

/// Environment variables consulted, in order, for the upstream bearer token.
pub const CREDENTIAL_VARS: &[&str] = &["HUGGINGFACE_TOKEN", "HUGGINGFACE_API_KEY", "HF_TOKEN"];

/// Application configuration loaded from environment variables.
///
/// A missing upstream credential is not fatal at startup: the chat route
/// reports it per request as a configuration error.
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub data_dir: PathBuf,
    pub site_pages_dir: Option<PathBuf>,
    pub cv_pdf_path: Option<PathBuf>,
    pub chat_api_url: String,
    pub chat_model: String,
    pub api_key: Option<String>,
}

// Hand-written so the credential never ends up in a log line.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .field("data_dir", &self.data_dir)
            .field("site_pages_dir", &self.site_pages_dir)
            .field("cv_pdf_path", &self.cv_pdf_path)
            .field("chat_api_url", &self.chat_api_url)
            .field("chat_model", &self.chat_model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            data_dir: optional_env("PORTFOLIO_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            site_pages_dir: optional_env("SITE_PAGES_DIR").map(PathBuf::from),
            cv_pdf_path: optional_env("CV_PDF_PATH").map(PathBuf::from),
            chat_api_url: optional_env("CHAT_API_URL")
                .unwrap_or_else(|| DEFAULT_CHAT_API_URL.to_string()),
            chat_model: optional_env("CHAT_MODEL")
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            api_key: resolve_credential(|key| std::env::var(key).ok()),
        })
    }
}

/// Picks the first non-empty credential from `CREDENTIAL_VARS`.
pub fn resolve_credential(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    CREDENTIAL_VARS
        .iter()
        .filter_map(|key| lookup(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
