//! Error types for issuetrail-sources

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SourceError>;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input column '{0}' not found in CSV header")]
    MissingColumn(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("No element matching '{selector}' after {timeout_ms} ms")]
    AnchorTimeout { selector: String, timeout_ms: u64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
