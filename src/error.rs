//! Application-wide error types.
//!
//! Invalid user input never produces an error; these types cover the storage and
//! terminal failures that can still happen underneath.

/// Failures of the key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Top-level error for the binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Storage errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Terminal/UI I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Logger initialization errors
    #[error("Logger error: {0}")]
    Logger(String),
}

/// Convenience type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
