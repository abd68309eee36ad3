/// Configuration shared by the envelope parser and the document compiler.
///
/// The envelope parser itself only consults `max_nesting_depth`; the rest of
/// the struct travels through [`crate::DocumentCompiler::compile`] opaquely.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Recursion guard for `variables`/`extensions` value decoding.
    pub max_nesting_depth: usize,
    /// Whether the document compiler should record source locations in the
    /// compiled document.
    pub include_locations: bool,
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_nesting_depth(mut self, max_nesting_depth: usize) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }

    pub fn with_include_locations(mut self, include_locations: bool) -> Self {
        self.include_locations = include_locations;
        self
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: 64,
            include_locations: true,
        }
    }
}
