// Portfolio data pipeline
// Implements: data loading, schema normalization, experience categorization,
// and the bounded-length context summary handed to the prompt builder.

pub mod categorizer;
pub mod cv;
pub mod loader;
pub mod models;
pub mod summarizer;

use std::path::PathBuf;

use thiserror::Error;

pub use loader::{DirectoryPortfolioSource, PortfolioSource, RawPortfolio};

#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Category '{category}' has an unexpected shape (expected {expected})")]
    UnexpectedShape {
        category: String,
        expected: &'static str,
    },
}
