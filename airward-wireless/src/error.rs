//! Error types for airward-wireless

use thiserror::Error;

/// Result type alias for wireless operations
pub type Result<T> = std::result::Result<T, WirelessError>;

/// Main error type for wireless operations
#[derive(Error, Debug)]
pub enum WirelessError {
    /// Interface not found or invalid
    #[error("Interface error: {0}")]
    Interface(String),

    /// Monitor mode operation failed
    #[error("Monitor mode error: {0}")]
    MonitorMode(String),

    /// Network survey failed
    #[error("Survey error: {0}")]
    Survey(String),

    /// Packet capture failed
    #[error("Capture error: {0}")]
    Capture(String),

    /// Operation timed out
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Operation cancelled
    #[error("Operation cancelled")]
    Cancelled,

    /// System/OS error
    #[error("System error: {0}")]
    System(String),

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WirelessError {
    /// Create an interface error
    pub fn interface(msg: impl Into<String>) -> Self {
        Self::Interface(msg.into())
    }

    /// Create a monitor mode error
    pub fn monitor(msg: impl Into<String>) -> Self {
        Self::MonitorMode(msg.into())
    }

    /// Create a survey error
    pub fn survey(msg: impl Into<String>) -> Self {
        Self::Survey(msg.into())
    }

    /// Create a capture error
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
