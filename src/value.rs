use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

/// Insertion-ordered map literal. Duplicate keys are rejected at decode time,
/// never silently overwritten.
pub type ValueMap = IndexMap<String, Value>;

/// A decoded `variables`/`extensions` value. Closed over exactly the shapes
/// the wire format can carry, so consumers handle all of them exhaustively.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(Decimal),
    String(String),
    Array(Vec<Value>),
    Object(ValueMap),
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(decimal) => decimal.to_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ValueMap> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

/// A base-10 decimal literal, kept as its validated source text so no
/// precision is lost before the consumer decides how to interpret it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal(SmolStr);

impl Decimal {
    /// Validates `text` as `-? digits (. digits)? ((e|E) (+|-)? digits)?`.
    pub fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let mut idx = 0;
        if bytes.first() == Some(&b'-') {
            idx += 1;
        }
        idx = eat_digits(bytes, idx)?;
        if bytes.get(idx) == Some(&b'.') {
            idx = eat_digits(bytes, idx + 1)?;
        }
        if matches!(bytes.get(idx), Some(b'e' | b'E')) {
            idx += 1;
            if matches!(bytes.get(idx), Some(b'+' | b'-')) {
                idx += 1;
            }
            idx = eat_digits(bytes, idx)?;
        }
        if idx != bytes.len() {
            return None;
        }
        Some(Self(SmolStr::new(text)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lossy conversion; `None` when the magnitude does not fit an `f64`.
    pub fn to_f64(&self) -> Option<f64> {
        let value: f64 = self.0.parse().ok()?;
        value.is_finite().then_some(value)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn eat_digits(bytes: &[u8], mut idx: usize) -> Option<usize> {
    let first = idx;
    while matches!(bytes.get(idx), Some(b'0'..=b'9')) {
        idx += 1;
    }
    (idx > first).then_some(idx)
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(value) => serde_json::Value::Bool(value),
            Value::Int(value) => serde_json::Value::Number(value.into()),
            Value::Float(decimal) => decimal
                .to_f64()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(value) => serde_json::Value::String(value),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Object(map) => {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    object.insert(key, value.into());
                }
                serde_json::Value::Object(object)
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Bool(value),
            serde_json::Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    Value::Int(int)
                } else {
                    Decimal::parse(&number.to_string())
                        .map(Value::Float)
                        .unwrap_or(Value::Null)
                }
            }
            serde_json::Value::String(value) => Value::String(value),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(object) => {
                let mut map = ValueMap::new();
                for (key, value) in object {
                    map.insert(key, value.into());
                }
                Value::Object(map)
            }
        }
    }
}
