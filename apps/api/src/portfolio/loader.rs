//! Portfolio Data Loader — reads every `*.json` file in the data directory.
//!
//! Each file stem becomes a category key (`experience.json` → `experience`).
//! Data is read fresh on every call; there is no process-wide cache.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::portfolio::PortfolioError;

/// Category key → raw JSON document, exactly as found on disk.
/// Ordered by key so everything derived from it is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPortfolio {
    categories: BTreeMap<String, Value>,
}

impl RawPortfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: impl Into<String>, value: Value) {
        self.categories.insert(category.into(), value);
    }

    pub fn get(&self, category: &str) -> Option<&Value> {
        self.categories.get(category)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// A category counts as having data unless it is an empty array.
    pub fn has_data(&self, category: &str) -> bool {
        match self.categories.get(category) {
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
            None => false,
        }
    }
}

impl FromIterator<(String, Value)> for RawPortfolio {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            categories: iter.into_iter().collect(),
        }
    }
}

/// Where portfolio data comes from. Carried in `AppState` as `Arc<dyn PortfolioSource>`.
#[async_trait]
pub trait PortfolioSource: Send + Sync {
    async fn load(&self) -> Result<RawPortfolio, PortfolioError>;
}

/// Loads `*.json` files from a directory on every call.
#[derive(Debug, Clone)]
pub struct DirectoryPortfolioSource {
    dir: PathBuf,
}

impl DirectoryPortfolioSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl PortfolioSource for DirectoryPortfolioSource {
    async fn load(&self) -> Result<RawPortfolio, PortfolioError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Portfolio data directory {} not found", self.dir.display());
                return Ok(RawPortfolio::new());
            }
            Err(source) => {
                return Err(PortfolioError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let io_err = |source| PortfolioError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut portfolio = RawPortfolio::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(category) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match read_json(&path).await {
                Ok(value) => portfolio.insert(category, value),
                // One bad file must not take the whole assistant down.
                Err(e) => warn!("Skipping portfolio file {}: {e}", path.display()),
            }
        }

        debug!(
            "Loaded {} portfolio categories from {}",
            portfolio.len(),
            self.dir.display()
        );
        Ok(portfolio)
    }
}

async fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}
