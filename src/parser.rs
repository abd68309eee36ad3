use std::sync::Arc;

use smol_str::SmolStr;

use crate::cache::{DocumentCache, HashProvider};
use crate::compiler::DocumentCompiler;
use crate::error::{Error, ErrorKind, Location};
use crate::options::ParserOptions;
use crate::request::{field, RawRequest, RequestResult};
use crate::scratch::ScratchBuffer;
use crate::text;
use crate::token::{TokenCursor, TokenKind};
use crate::value::{Decimal, Value, ValueMap};
use crate::Result;

const KEYWORD_TRUE: &[u8] = b"true";
const KEYWORD_FALSE: &[u8] = b"false";
const KEYWORD_NULL: &[u8] = b"null";

/// Decodes one raw request payload into resolved requests.
///
/// The parser walks the token stream once, capturing the query text as a raw
/// span and decoding `variables`/`extensions` into dynamic values as it goes.
/// With a cache and hash provider attached, previously seen query text is
/// resolved without unescaping or recompiling.
pub struct RequestParser<'a, C: DocumentCompiler> {
    cursor: TokenCursor<'a>,
    options: &'a ParserOptions,
    compiler: &'a C,
    cache: Option<CachePair<'a, C::Document>>,
}

struct CachePair<'a, D> {
    store: &'a dyn DocumentCache<D>,
    hash: &'a dyn HashProvider,
}

impl<'a, C: DocumentCompiler> RequestParser<'a, C> {
    pub fn new(input: &'a [u8], options: &'a ParserOptions, compiler: &'a C) -> Self {
        Self {
            cursor: TokenCursor::new(input),
            options,
            compiler,
            cache: None,
        }
    }

    pub fn with_cache(
        input: &'a [u8],
        options: &'a ParserOptions,
        compiler: &'a C,
        cache: &'a dyn DocumentCache<C::Document>,
        hash: &'a dyn HashProvider,
    ) -> Self {
        Self {
            cursor: TokenCursor::new(input),
            options,
            compiler,
            cache: Some(CachePair { store: cache, hash }),
        }
    }

    /// Parses the payload into an ordered list of resolved requests.
    ///
    /// A leading `{` is a single request, a leading `[` an ordered batch of
    /// them. Any failure inside a batch element fails the whole batch.
    pub fn parse(mut self) -> Result<Vec<RequestResult<C::Document>>> {
        self.cursor.advance()?;

        let results = match self.cursor.kind() {
            TokenKind::ObjectOpen => vec![self.parse_request()?],
            TokenKind::ArrayOpen => self.parse_batch()?,
            other => {
                return Err(Error::unexpected_structure(
                    format!(
                        "expected a request object or a batch array, found {}",
                        other.describe()
                    ),
                    self.cursor.location(),
                ))
            }
        };

        if self.cursor.kind() != TokenKind::EndOfInput {
            return Err(Error::syntax(
                "unexpected content after the request payload",
                self.cursor.location(),
            ));
        }
        Ok(results)
    }

    fn parse_batch(&mut self) -> Result<Vec<RequestResult<C::Document>>> {
        self.cursor.expect(TokenKind::ArrayOpen)?;
        let mut results = Vec::new();
        while self.cursor.kind() != TokenKind::ArrayClose {
            results.push(self.parse_request()?);
        }
        self.cursor.expect(TokenKind::ArrayClose)?;
        Ok(results)
    }

    fn parse_request(&mut self) -> Result<RequestResult<C::Document>> {
        self.cursor.expect(TokenKind::ObjectOpen)?;

        let mut request = RawRequest::default();
        while self.cursor.kind() != TokenKind::ObjectClose {
            self.parse_request_field(&mut request)?;
        }

        let close_location = self.cursor.location();
        self.cursor.expect(TokenKind::ObjectClose)?;

        if request.query.is_empty() {
            return Err(Error::missing_query(close_location));
        }

        let document = self.resolve_document(&mut request)?;
        Ok(RequestResult {
            operation_name: request.operation_name,
            named_query: request.named_query,
            document,
            variables: request.variables,
            extensions: request.extensions,
        })
    }

    fn parse_request_field(&mut self, request: &mut RawRequest<'a>) -> Result<()> {
        let name_location = self.cursor.location();
        let name = self.cursor.expect(TokenKind::String)?;
        self.cursor.expect(TokenKind::Colon)?;

        match name {
            b"operationName" => {
                note_field(request, field::OPERATION_NAME, name, name_location)?;
                request.operation_name = self.expect_string_or_null()?;
            }
            b"namedQuery" => {
                note_field(request, field::NAMED_QUERY, name, name_location)?;
                request.named_query = self.expect_string_or_null()?.map(SmolStr::from);
            }
            b"query" => {
                note_field(request, field::QUERY, name, name_location)?;
                // Captured raw: unescaping is deferred until the cache has
                // had a chance to answer.
                request.query_location = Some(self.cursor.location());
                request.query = self.cursor.expect(TokenKind::String)?;
            }
            b"variables" => {
                note_field(request, field::VARIABLES, name, name_location)?;
                request.variables = self.expect_object_or_null()?;
            }
            b"extensions" => {
                note_field(request, field::EXTENSIONS, name, name_location)?;
                request.extensions = self.expect_object_or_null()?;
            }
            other => {
                return Err(Error::unrecognized_field(
                    &String::from_utf8_lossy(other),
                    name_location,
                ))
            }
        }
        Ok(())
    }

    fn expect_string_or_null(&mut self) -> Result<Option<String>> {
        match self.cursor.kind() {
            TokenKind::String => {
                let text = self.cursor.decode_string()?;
                self.cursor.advance()?;
                Ok(Some(text))
            }
            TokenKind::Name if self.cursor.raw_bytes() == KEYWORD_NULL => {
                self.cursor.advance()?;
                Ok(None)
            }
            other => Err(Error::syntax(
                format!("expected a string or null, found {}", other.describe()),
                self.cursor.location(),
            )),
        }
    }

    fn expect_object_or_null(&mut self) -> Result<Option<ValueMap>> {
        match self.cursor.kind() {
            TokenKind::ObjectOpen => Ok(Some(self.parse_object(0)?)),
            TokenKind::Name if self.cursor.raw_bytes() == KEYWORD_NULL => {
                self.cursor.advance()?;
                Ok(None)
            }
            other => Err(Error::syntax(
                format!("expected an object or null, found {}", other.describe()),
                self.cursor.location(),
            )),
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Value> {
        match self.cursor.kind() {
            TokenKind::ObjectOpen => Ok(Value::Object(self.parse_object(depth)?)),
            TokenKind::ArrayOpen => self.parse_list(depth),
            TokenKind::String | TokenKind::Name | TokenKind::Integer | TokenKind::Float => {
                self.parse_scalar()
            }
            other => Err(Error::syntax(
                format!("expected a value, found {}", other.describe()),
                self.cursor.location(),
            )),
        }
    }

    fn parse_object(&mut self, depth: usize) -> Result<ValueMap> {
        self.check_depth(depth)?;
        self.cursor.expect(TokenKind::ObjectOpen)?;

        let mut map = ValueMap::new();
        while self.cursor.kind() != TokenKind::ObjectClose {
            let key_location = self.cursor.location();
            let key = self.cursor.decode_string()?;
            self.cursor.advance()?;
            self.cursor.expect(TokenKind::Colon)?;
            let value = self.parse_value(depth + 1)?;
            if map.contains_key(&key) {
                return Err(Error::duplicate_key(&key, key_location));
            }
            map.insert(key, value);
        }

        self.cursor.expect(TokenKind::ObjectClose)?;
        Ok(map)
    }

    fn parse_list(&mut self, depth: usize) -> Result<Value> {
        self.check_depth(depth)?;
        self.cursor.expect(TokenKind::ArrayOpen)?;

        let mut items = Vec::new();
        while self.cursor.kind() != TokenKind::ArrayClose {
            items.push(self.parse_value(depth + 1)?);
        }

        self.cursor.expect(TokenKind::ArrayClose)?;
        Ok(Value::Array(items))
    }

    fn parse_scalar(&mut self) -> Result<Value> {
        let location = self.cursor.location();
        let value = match self.cursor.kind() {
            TokenKind::String => Value::String(self.cursor.decode_string()?),
            TokenKind::Integer => {
                let raw = self.cursor.raw_bytes();
                let int = std::str::from_utf8(raw)
                    .ok()
                    .and_then(|text| text.parse::<i64>().ok())
                    .ok_or_else(|| {
                        Error::malformed_number(
                            format!(
                                "integer literal `{}` does not fit a 64-bit signed integer",
                                String::from_utf8_lossy(raw)
                            ),
                            location,
                        )
                    })?;
                Value::Int(int)
            }
            TokenKind::Float => {
                let raw = self.cursor.raw_bytes();
                let decimal = std::str::from_utf8(raw)
                    .ok()
                    .and_then(Decimal::parse)
                    .ok_or_else(|| {
                        Error::malformed_number(
                            format!(
                                "malformed decimal literal `{}`",
                                String::from_utf8_lossy(raw)
                            ),
                            location,
                        )
                    })?;
                Value::Float(decimal)
            }
            TokenKind::Name => match self.cursor.raw_bytes() {
                KEYWORD_TRUE => Value::Bool(true),
                KEYWORD_FALSE => Value::Bool(false),
                KEYWORD_NULL => Value::Null,
                other => {
                    return Err(Error::syntax(
                        format!(
                            "unexpected name `{}` in value position",
                            String::from_utf8_lossy(other)
                        ),
                        location,
                    ))
                }
            },
            other => {
                return Err(Error::syntax(
                    format!("expected a scalar value, found {}", other.describe()),
                    location,
                ))
            }
        };
        self.cursor.advance()?;
        Ok(value)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth >= self.options.max_nesting_depth {
            return Err(Error::syntax(
                format!(
                    "value nesting exceeds the configured limit of {}",
                    self.options.max_nesting_depth
                ),
                self.cursor.location(),
            ));
        }
        Ok(())
    }

    /// Produces the compiled document for a scanned envelope.
    ///
    /// With a cache attached the lookup key is the client's alias, or a
    /// fingerprint of the raw query bytes (which is then also recorded as
    /// the result's alias). A hit adopts the cached document with no
    /// unescape or compile; a miss compiles and registers the document
    /// under the same key.
    fn resolve_document(&mut self, request: &mut RawRequest<'a>) -> Result<Arc<C::Document>> {
        let Some(cache) = &self.cache else {
            return Ok(Arc::new(self.compile_query(request)?));
        };

        let key = match &request.named_query {
            Some(alias) => alias.clone(),
            None => {
                let fingerprint = cache.hash.fingerprint(request.query)?;
                request.named_query = Some(fingerprint.clone());
                fingerprint
            }
        };

        if let Some(document) = cache.store.try_get(&key) {
            return Ok(document);
        }

        let document = Arc::new(self.compile_query(request)?);
        cache.store.set(&key, Arc::clone(&document));
        Ok(document)
    }

    /// Unescapes the raw query span into a scratch buffer and compiles it.
    /// The buffer is zeroed and released when this frame unwinds, whether
    /// the unescape or the compiler failed or not.
    fn compile_query(&self, request: &RawRequest<'a>) -> Result<C::Document> {
        let raw = request.query;
        let mut scratch = ScratchBuffer::acquire(raw.len());
        let written = text::unescape_into(raw, &mut scratch)
            .map_err(|err| escape_error(err, request.query_location))?;
        self.compiler.compile(&scratch[..written], self.options)
    }
}

fn note_field(
    request: &mut RawRequest<'_>,
    bit: u8,
    name: &[u8],
    location: Location,
) -> Result<()> {
    if !request.mark_seen(bit) {
        return Err(Error::duplicate_key(
            &String::from_utf8_lossy(name),
            location,
        ));
    }
    Ok(())
}

fn escape_error(err: text::EscapeError, query_location: Option<Location>) -> Error {
    Error {
        kind: ErrorKind::Syntax,
        message: err.message.to_string(),
        location: query_location.map(|location| Location {
            offset: location.offset + 1 + err.offset,
            line: location.line,
            column: location.column + 1 + err.offset,
        }),
    }
}
