//! Options controlling table extraction from a whole document.

use super::stream::DEFAULT_CHUNK_SIZE;

/// What to do when one section fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SectionErrorPolicy {
    /// Stop and return the error
    #[default]
    Abort,
    /// Log the error at warn level and continue with the next section
    Skip,
}

/// Configuration for [`Package::tables_with_options`](super::Package::tables_with_options).
///
/// # Examples
///
/// ```rust
/// use hwp_tables::hwp::{ExtractOptions, SectionErrorPolicy};
///
/// let options = ExtractOptions::new()
///     .with_section_errors(SectionErrorPolicy::Skip)
///     .with_chunk_size(16 * 1024);
/// assert_eq!(options.section_errors, SectionErrorPolicy::Skip);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Handling of per-section failures
    pub section_errors: SectionErrorPolicy,
    /// Compressed bytes read from a section stream per inflate step
    pub chunk_size: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            section_errors: SectionErrorPolicy::Abort,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ExtractOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-section error policy.
    #[inline]
    pub fn with_section_errors(mut self, policy: SectionErrorPolicy) -> Self {
        self.section_errors = policy;
        self
    }

    /// Set the decompressor input chunk size. Must be non-zero.
    #[inline]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}
