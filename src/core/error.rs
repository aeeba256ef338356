//! Error types for voxel extraction

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for voxel source construction and geometry commits
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not load volume '{path}': {source}")]
    VolumeLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Short read on volume '{path}': expected {expected} bytes, got {actual}")]
    ShortRead {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Geometry has not been committed")]
    NotCommitted,
}

impl Error {
    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
