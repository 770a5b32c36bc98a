//! # Error Types
//!
//! Custom error types for the WT440H receiver using `thiserror`.
//!
//! Frame decoding never fails: timing, preamble and parity problems are
//! resynchronization events reported through
//! [`Rejection`](crate::protocol::assembler::Rejection), not errors.

use thiserror::Error;

/// Main error type for the WT440H receiver
#[derive(Debug, Error)]
pub enum Wt440hError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Bit timing thresholds that cannot be classified unambiguously
    #[error("Invalid timing: {0}")]
    InvalidTiming(String),

    /// Malformed line in an edge timestamp stream
    #[error("Invalid edge on line {line}: {content:?}")]
    EdgeParse { line: u64, content: String },

    /// Reading output errors
    #[error("Output error: {0}")]
    Output(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the WT440H receiver
pub type Result<T> = std::result::Result<T, Wt440hError>;
