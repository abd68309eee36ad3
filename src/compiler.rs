use crate::options::ParserOptions;
use crate::Result;

/// Compiles unescaped query text into a document AST.
///
/// A pure function of its input bytes plus the options: the parser hands it
/// the query exactly once per cache miss and shares no other state with it.
/// Failures are propagated to the caller unchanged.
pub trait DocumentCompiler {
    type Document;

    fn compile(&self, query: &[u8], options: &ParserOptions) -> Result<Self::Document>;
}
