//! Error types for test data resolution

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for test data operations
pub type DataResult<T> = std::result::Result<T, DataError>;

/// Test data error types
#[derive(Error, Debug)]
pub enum DataError {
    #[error("invalid JSON in {}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("data file not found: {name} (checked: {}, {})", env_path.display(), base_path.display())]
    NotFound {
        name: String,
        env_path: PathBuf,
        base_path: PathBuf,
    },

    #[error("test case '{id}' not found in test_mapping.json. Available: {available:?}")]
    UnknownTestCase { id: String, available: Vec<String> },

    #[error("dataset '{name}' not found in {}. Available: {available:?}", path.display())]
    UnknownDataset {
        name: String,
        path: PathBuf,
        available: Vec<String>,
    },

    #[error("invalid mapping entry for '{id}': {reason}")]
    InvalidMapping { id: String, reason: String },

    #[error("unexpected structure in {}: {reason}", path.display())]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("file already exists: {} (pass overwrite = true to replace)", .0.display())]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
