//! Error types for HDLC port detection

use thiserror::Error;

/// Errors that can occur during detection
///
/// Only [`DetectError::EnumerationFailed`] ever reaches the caller of a scan;
/// the other variants are confined to the probe of a single port.
#[derive(Debug, Error)]
pub enum DetectError {
    /// Failed to enumerate serial ports
    #[error("failed to enumerate ports: {0}")]
    EnumerationFailed(String),

    /// Failed to open serial port
    #[error("failed to open port {port}: {reason}")]
    OpenFailed { port: String, reason: String },

    /// I/O error while reading frames
    #[error("I/O error on {port}: {source}")]
    Io {
        port: String,
        #[source]
        source: std::io::Error,
    },
}

impl DetectError {
    /// Build an [`DetectError::OpenFailed`] from any displayable cause
    pub fn open_failed(port: &str, reason: impl std::fmt::Display) -> Self {
        Self::OpenFailed {
            port: port.to_string(),
            reason: reason.to_string(),
        }
    }
}
