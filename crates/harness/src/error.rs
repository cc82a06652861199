//! Error types for the harness

use thiserror::Error;
use webharness_testdata::DataError;

/// Result type alias using the harness error
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

/// Harness error types
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Playwright not found. Install with: npx playwright install")]
    BrowserNotFound,

    #[error("browser bridge error: {0}")]
    Bridge(String),

    #[error("interaction failed on {target}: {reason}")]
    Interaction { target: String, reason: String },

    #[error("verification failed for field '{field}': {reason}")]
    Assertion { field: String, reason: String },

    #[error("timed out after {ms}ms waiting for {what}")]
    Timeout { what: String, ms: u64 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("test data error: {0}")]
    Data(#[from] DataError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
