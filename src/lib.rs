//! Zero-copy decoder for GraphQL HTTP request envelopes.
//!
//! A request payload is a JSON-like envelope (or an ordered batch of them)
//! carrying `operationName`, `namedQuery`, `query`, `variables` and
//! `extensions`. This crate walks the raw bytes with a hand-rolled token
//! cursor instead of a generic JSON parser: the query text is captured as a
//! borrowed span and only unescaped — into an exactly-sized scratch buffer —
//! when an attached document cache cannot already answer for it.
//!
//! The document compiler, hash provider and cache are injected capabilities;
//! see [`DocumentCompiler`], [`HashProvider`] and [`DocumentCache`]. Default
//! [`Sha256HashProvider`] and [`InMemoryDocumentCache`] implementations are
//! provided.
//!
//! ```
//! use graphql_envelope::{parse, DocumentCompiler, ParserOptions, Result};
//!
//! struct EchoCompiler;
//!
//! impl DocumentCompiler for EchoCompiler {
//!     type Document = String;
//!
//!     fn compile(&self, query: &[u8], _options: &ParserOptions) -> Result<String> {
//!         Ok(String::from_utf8_lossy(query).into_owned())
//!     }
//! }
//!
//! let requests = parse(
//!     br#"{"query":"{ hero { name } }"}"#,
//!     &ParserOptions::default(),
//!     &EchoCompiler,
//! )?;
//! assert_eq!(requests.len(), 1);
//! assert_eq!(*requests[0].document, "{ hero { name } }");
//! # Ok::<(), graphql_envelope::Error>(())
//! ```

pub mod cache;
pub mod compiler;
pub mod error;
pub mod options;
pub mod parser;
pub mod request;
pub mod scratch;
pub mod token;
pub mod value;

mod text;

pub use crate::cache::{DocumentCache, HashProvider, InMemoryDocumentCache, Sha256HashProvider};
pub use crate::compiler::DocumentCompiler;
pub use crate::error::{Error, ErrorKind, Location};
pub use crate::options::ParserOptions;
pub use crate::parser::RequestParser;
pub use crate::request::RequestResult;
pub use crate::value::{Decimal, Value, ValueMap};

pub type Result<T> = std::result::Result<T, Error>;

/// Parses a request payload without a document cache; every envelope's query
/// is unescaped and compiled.
pub fn parse<C: DocumentCompiler>(
    data: &[u8],
    options: &ParserOptions,
    compiler: &C,
) -> Result<Vec<RequestResult<C::Document>>> {
    RequestParser::new(data, options, compiler).parse()
}

/// Parses a request payload with a document cache: envelopes whose query is
/// already cached (by alias or content fingerprint) skip unescaping and
/// compilation entirely, and cache misses register the freshly compiled
/// document for the next caller.
pub fn parse_with_cache<C: DocumentCompiler>(
    data: &[u8],
    options: &ParserOptions,
    compiler: &C,
    cache: &dyn DocumentCache<C::Document>,
    hash_provider: &dyn HashProvider,
) -> Result<Vec<RequestResult<C::Document>>> {
    RequestParser::with_cache(data, options, compiler, cache, hash_provider).parse()
}
