//! Unified error type for hwp-tables.
//!
//! Every stage of the pipeline (container access, decompression, record
//! framing, text decoding and table reconstruction) reports through this
//! single enum so callers can decide per section whether to skip or abort.
use thiserror::Error;

/// Main error type for hwp-tables operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Compound file (OLE2) container error
    #[cfg(feature = "ole")]
    #[error("OLE error: {0}")]
    Ole(#[from] crate::ole::OleError),

    /// Truncated or malformed record framing (header, escaped size, payload)
    /// or a payload too short for its fixed-offset fields.
    #[error("Format error: {0}")]
    Format(String),

    /// Corrupt raw-deflate data in a compressed section stream
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// A control marker code with no entry in the control character table
    #[error("Unknown control character: {0:#04x}")]
    UnknownControlCharacter(u8),

    /// Record tree that does not describe a consistent table, e.g. a cell
    /// seen before any table definition
    #[error("Structural error: {0}")]
    Structural(String),

    /// File is not an HWP 5.x document or misses a mandatory stream
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Document feature this crate does not handle (encryption, distribution)
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Caller supplied an out-of-range parameter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for hwp-tables operations.
pub type Result<T> = std::result::Result<T, Error>;
