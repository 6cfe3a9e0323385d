//! Error types shared across headtrack crates.

use std::path::PathBuf;

/// Top-level error type for headtrack operations.
#[derive(Debug, thiserror::Error)]
pub enum HeadtrackError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using HeadtrackError.
pub type HeadtrackResult<T> = Result<T, HeadtrackError>;

impl HeadtrackError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
