//! Error types for HDLC frame decoding

use thiserror::Error;

/// Reasons a candidate frame was discarded by the decoder
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Frame shorter than the FCS plus one payload byte
    #[error("frame too short: {len} bytes")]
    TooShort { len: usize },

    /// Frame check sequence mismatch
    #[error("FCS mismatch: expected 0x{expected:04X}, got 0x{actual:04X}")]
    FcsMismatch { expected: u16, actual: u16 },

    /// Frame exceeded the configured maximum length
    #[error("frame exceeds {max} bytes")]
    Oversize { max: usize },

    /// Escape followed by a flag (abort sequence)
    #[error("frame aborted by sender")]
    Aborted,
}
