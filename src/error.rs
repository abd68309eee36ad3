use std::fmt;

use serde::Serialize;

/// Classification of a parse failure. Every kind is fatal to the envelope
/// being parsed; in batch mode the whole batch fails with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// The token stream does not match the expected grammar.
    Syntax,
    /// The top-level payload is neither an object nor an array.
    UnexpectedStructure,
    /// An envelope field name outside the recognized set.
    UnrecognizedField,
    /// The envelope closed without a non-empty `query` field.
    MissingQuery,
    /// A map literal or the envelope itself repeats a key.
    DuplicateKey,
    /// An integer or decimal literal cannot be represented.
    MalformedNumber,
    /// The hash provider or document compiler reported a failure.
    Upstream,
}

/// Byte offset plus 1-based line and column of the offending token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Option<Location>,
}

impl Error {
    pub fn syntax(message: impl Into<String>, location: Location) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            message: message.into(),
            location: Some(location),
        }
    }

    pub fn unexpected_structure(message: impl Into<String>, location: Location) -> Self {
        Self {
            kind: ErrorKind::UnexpectedStructure,
            message: message.into(),
            location: Some(location),
        }
    }

    pub fn unrecognized_field(name: &str, location: Location) -> Self {
        Self {
            kind: ErrorKind::UnrecognizedField,
            message: format!("unrecognized request field `{name}`"),
            location: Some(location),
        }
    }

    pub fn missing_query(location: Location) -> Self {
        Self {
            kind: ErrorKind::MissingQuery,
            message: "request is missing a non-empty `query` field".to_string(),
            location: Some(location),
        }
    }

    pub fn duplicate_key(key: &str, location: Location) -> Self {
        Self {
            kind: ErrorKind::DuplicateKey,
            message: format!("duplicate key `{key}`"),
            location: Some(location),
        }
    }

    pub fn malformed_number(message: impl Into<String>, location: Location) -> Self {
        Self {
            kind: ErrorKind::MalformedNumber,
            message: message.into(),
            location: Some(location),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Upstream,
            message: message.into(),
            location: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(
                f,
                "{} at line {}, column {} (offset {})",
                self.message, location.line, location.column, location.offset
            ),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for Error {}
