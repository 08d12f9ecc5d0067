//! Optional CV text extraction.
//!
//! PDF parsing is CPU-bound and runs inside `tokio::task::spawn_blocking`,
//! bounded by `CV_PARSE_TIMEOUT`. Any failure yields `None`: a missing CV
//! never breaks the rest of the context.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

const CV_PARSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Extracts the CV's text, or `None` if the file is absent, unreadable, or empty.
pub async fn load_cv_text(path: &Path) -> Option<String> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        warn!("CV PDF not found at {}", path.display());
        return None;
    }

    let owned: PathBuf = path.to_path_buf();
    let task = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned));

    let text = match tokio::time::timeout(CV_PARSE_TIMEOUT, task).await {
        Ok(Ok(Ok(text))) => text,
        Ok(Ok(Err(e))) => {
            warn!("CV PDF parse error: {e}");
            return None;
        }
        Ok(Err(e)) => {
            warn!("CV PDF parse task failed: {e}");
            return None;
        }
        Err(_) => {
            warn!("CV PDF parse timed out after {:?}", CV_PARSE_TIMEOUT);
            return None;
        }
    };

    let text = text.trim();
    if text.is_empty() {
        warn!("CV PDF parsed but no text found");
        return None;
    }

    debug!("CV loaded, text length: {}", text.len());
    Some(text.to_string())
}
