//! Error types for airward-wpa

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for cracking operations
pub type Result<T> = std::result::Result<T, WpaError>;

/// Main error type for dictionary resolution and engine runs
#[derive(Error, Debug)]
pub enum WpaError {
    /// Neither the dictionary nor its compressed variant exists
    #[error("Dictionary unavailable: {0} (no compressed fallback found)")]
    DictionaryUnavailable(PathBuf),

    /// Capture artifact is missing
    #[error("Capture artifact not found: {0}")]
    NoArtifact(PathBuf),

    /// The external cracking engine failed to start or misbehaved
    #[error("Engine error: {0}")]
    Engine(String),

    /// Operation cancelled
    #[error("Operation cancelled")]
    Cancelled,

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WpaError {
    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
