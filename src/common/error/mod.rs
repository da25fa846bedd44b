//! Unified error types for hwp-tables.
//!
//! This module provides the crate-wide error type shared by the container,
//! record, text and table layers.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
