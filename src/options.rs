//! Configuration options for parsing TOML text.
//!
//! ## Examples
//!
//! ```rust
//! use toml_codec::{from_str_with_options, ParseOptions};
//!
//! let options = ParseOptions::new().with_max_depth(4);
//! assert!(from_str_with_options("a = [[[[[1]]]]]", options).is_err());
//! ```

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options controlling the bundled parser.
///
/// # Examples
///
/// ```rust
/// use toml_codec::ParseOptions;
///
/// let options = ParseOptions::new();
/// assert_eq!(options.max_depth, 128);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest allowed nesting of inline arrays and inline tables.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nesting limit for inline values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toml_codec::ParseOptions;
    ///
    /// let options = ParseOptions::new().with_max_depth(16);
    /// assert_eq!(options.max_depth, 16);
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
