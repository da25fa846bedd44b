//! Options for HTML rendering.

/// Configuration options for HTML output.
///
/// # Examples
///
/// ```rust
/// use hwp_tables::render::HtmlOptions;
///
/// // Full document with the default stylesheet
/// let options = HtmlOptions::default();
/// assert!(options.standalone);
///
/// // Bare tables, four-space indentation
/// let options = HtmlOptions::new().with_standalone(false).with_indent(4);
/// ```
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Wrap the tables in a complete HTML document with a stylesheet
    pub standalone: bool,
    /// Spaces per nesting level
    pub indent: usize,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            standalone: true,
            indent: 2,
        }
    }
}

impl HtmlOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to emit a complete document or table fragments only.
    #[inline]
    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Set the indentation width in spaces.
    #[inline]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}
