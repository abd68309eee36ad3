use memchr::memchr3;

use crate::error::{Error, Location};
use crate::text;
use crate::Result;

/// Lexical classification of the current token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    ObjectOpen,
    ObjectClose,
    ArrayOpen,
    ArrayClose,
    Colon,
    String,
    Name,
    Integer,
    Float,
    EndOfInput,
}

impl TokenKind {
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::ObjectOpen => "`{`",
            TokenKind::ObjectClose => "`}`",
            TokenKind::ArrayOpen => "`[`",
            TokenKind::ArrayClose => "`]`",
            TokenKind::Colon => "`:`",
            TokenKind::String => "a string",
            TokenKind::Name => "a name",
            TokenKind::Integer => "an integer",
            TokenKind::Float => "a decimal number",
            TokenKind::EndOfInput => "end of input",
        }
    }
}

/// Classifies byte runs of a request payload into lexical tokens.
///
/// Whitespace, line terminators, commas and a leading BOM are insignificant,
/// per GraphQL lexing rules; consumers therefore never see separator tokens
/// between list elements or object fields. String tokens expose the raw span
/// between the quotes with escapes intact; [`TokenCursor::decode_string`]
/// resolves them on demand.
pub struct TokenCursor<'a> {
    input: &'a [u8],
    position: usize,
    line: usize,
    line_start: usize,
    kind: TokenKind,
    span: (usize, usize),
    location: Location,
}

impl<'a> TokenCursor<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let position = if input.starts_with(&[0xef, 0xbb, 0xbf]) {
            3
        } else {
            0
        };
        Self {
            input,
            position,
            line: 1,
            line_start: 0,
            kind: TokenKind::EndOfInput,
            span: (position, position),
            location: Location {
                offset: position,
                line: 1,
                column: position + 1,
            },
        }
    }

    /// Moves to the next token; at the end of the buffer the cursor parks on
    /// `EndOfInput` and stays there.
    pub fn advance(&mut self) -> Result<()> {
        self.skip_insignificant();

        let start = self.position;
        self.location = Location {
            offset: start,
            line: self.line,
            column: start - self.line_start + 1,
        };

        let Some(&byte) = self.input.get(start) else {
            self.kind = TokenKind::EndOfInput;
            self.span = (start, start);
            return Ok(());
        };

        match byte {
            b'{' => self.punctuator(TokenKind::ObjectOpen),
            b'}' => self.punctuator(TokenKind::ObjectClose),
            b'[' => self.punctuator(TokenKind::ArrayOpen),
            b']' => self.punctuator(TokenKind::ArrayClose),
            b':' => self.punctuator(TokenKind::Colon),
            b'"' => self.scan_string(start),
            b'-' | b'0'..=b'9' => self.scan_number(start),
            b'_' | b'a'..=b'z' | b'A'..=b'Z' => self.scan_name(start),
            other => Err(Error::syntax(
                format!("unexpected byte 0x{other:02x}"),
                self.location,
            )),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Position of the current token.
    pub fn location(&self) -> Location {
        self.location
    }

    /// The current token's unprocessed byte span. For strings this is the
    /// content between the quotes, escapes unresolved.
    pub fn raw_bytes(&self) -> &'a [u8] {
        &self.input[self.span.0..self.span.1]
    }

    /// Asserts the current token kind, returns its raw span, and advances.
    pub fn expect(&mut self, kind: TokenKind) -> Result<&'a [u8]> {
        if self.kind != kind {
            return Err(Error::syntax(
                format!(
                    "expected {}, found {}",
                    kind.describe(),
                    self.kind.describe()
                ),
                self.location,
            ));
        }
        let raw = self.raw_bytes();
        self.advance()?;
        Ok(raw)
    }

    /// The current string token with escapes resolved into owned text.
    pub fn decode_string(&self) -> Result<String> {
        if self.kind != TokenKind::String {
            return Err(Error::syntax(
                format!("expected a string, found {}", self.kind.describe()),
                self.location,
            ));
        }
        text::decode_string(self.raw_bytes())
            .map_err(|err| Error::syntax(err.message, self.location_within_string(err.offset)))
    }

    /// Rebases a span-relative offset onto the token position. String tokens
    /// cannot contain raw line breaks, so the line never changes.
    fn location_within_string(&self, relative: usize) -> Location {
        Location {
            offset: self.location.offset + 1 + relative,
            line: self.location.line,
            column: self.location.column + 1 + relative,
        }
    }

    fn punctuator(&mut self, kind: TokenKind) -> Result<()> {
        self.kind = kind;
        self.span = (self.position, self.position + 1);
        self.position += 1;
        Ok(())
    }

    fn skip_insignificant(&mut self) {
        while let Some(&byte) = self.input.get(self.position) {
            match byte {
                b' ' | b'\t' | b'\r' | b',' => self.position += 1,
                b'\n' => {
                    self.position += 1;
                    self.line += 1;
                    self.line_start = self.position;
                }
                _ => break,
            }
        }
    }

    fn scan_string(&mut self, start: usize) -> Result<()> {
        let mut idx = start + 1;
        loop {
            let rest = &self.input[idx..];
            match memchr3(b'"', b'\\', b'\n', rest) {
                Some(found) => match rest[found] {
                    b'"' => {
                        self.kind = TokenKind::String;
                        self.span = (start + 1, idx + found);
                        self.position = idx + found + 1;
                        return Ok(());
                    }
                    b'\\' => {
                        if idx + found + 1 >= self.input.len() {
                            return Err(Error::syntax(
                                "unterminated string literal",
                                self.location,
                            ));
                        }
                        idx += found + 2;
                    }
                    _ => {
                        return Err(Error::syntax(
                            "unescaped line break in string literal",
                            self.location,
                        ))
                    }
                },
                None => {
                    return Err(Error::syntax("unterminated string literal", self.location))
                }
            }
        }
    }

    fn scan_number(&mut self, start: usize) -> Result<()> {
        let mut idx = start;
        if self.input.get(idx) == Some(&b'-') {
            idx += 1;
        }
        idx = self.require_digits(idx, "expected a digit in numeric literal")?;

        let mut is_float = false;
        if self.input.get(idx) == Some(&b'.') {
            is_float = true;
            idx = self.require_digits(idx + 1, "expected a digit after the decimal point")?;
        }
        if matches!(self.input.get(idx), Some(b'e' | b'E')) {
            is_float = true;
            idx += 1;
            if matches!(self.input.get(idx), Some(b'+' | b'-')) {
                idx += 1;
            }
            idx = self.require_digits(idx, "expected a digit in the exponent")?;
        }

        // A numeric literal must end at a token boundary; `12x` is not two
        // tokens.
        if matches!(
            self.input.get(idx),
            Some(b'_' | b'.' | b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9')
        ) {
            return Err(Error::malformed_number(
                "unexpected character in numeric literal",
                self.location,
            ));
        }

        self.kind = if is_float {
            TokenKind::Float
        } else {
            TokenKind::Integer
        };
        self.span = (start, idx);
        self.position = idx;
        Ok(())
    }

    fn require_digits(&self, mut idx: usize, message: &'static str) -> Result<usize> {
        let first = idx;
        while matches!(self.input.get(idx), Some(b'0'..=b'9')) {
            idx += 1;
        }
        if idx == first {
            return Err(Error::malformed_number(message, self.location));
        }
        Ok(idx)
    }

    fn scan_name(&mut self, start: usize) -> Result<()> {
        let mut idx = start + 1;
        while matches!(
            self.input.get(idx),
            Some(b'_' | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z')
        ) {
            idx += 1;
        }
        self.kind = TokenKind::Name;
        self.span = (start, idx);
        self.position = idx;
        Ok(())
    }
}
