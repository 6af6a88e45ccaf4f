//! Literal values and their natural document encoding

use indexmap::IndexMap;
use serde_json::{Number, Value};

use crate::error::CodecError;

use super::Token;

/// An ordered list whose elements may themselves be references
pub type List<T> = Vec<Token<T>>;

/// A string-keyed record whose values may themselves be references
pub type Record<T> = IndexMap<String, Token<T>>;

/// A type that can appear as the literal payload of a [`Token`]
///
/// The declared type only selects which encoding to use; it is never
/// checked against the document at serialization time.
pub trait Literal: Sized {
    /// Name of the expected encoding, used in error messages
    const KIND: &'static str;

    /// Whether a `{"Condition": name}` object decodes as a condition
    /// reference rather than as a literal
    const CONDITION_REFS: bool = false;

    /// Encode as a document value
    fn to_value(&self) -> Value;

    /// Decode from a document value
    fn from_value(value: &Value) -> Result<Self, CodecError>;
}

/// Short description of a document value's shape
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Error for a value that does not have the expected literal shape
///
/// An object where a literal was expected can only have been meant as a
/// reference or intrinsic form, so it is reported as unrecognized.
pub(crate) fn mismatch(expected: &str, value: &Value) -> CodecError {
    match value {
        Value::Object(map) => CodecError::unrecognized(expected, map.keys()),
        other => CodecError::format(
            expected,
            format!("expected {}, found {}", expected, kind_of(other)),
        ),
    }
}

impl Literal for String {
    const KIND: &'static str = "string";

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(mismatch(Self::KIND, other)),
        }
    }
}

impl Literal for bool {
    const KIND: &'static str = "boolean";
    const CONDITION_REFS: bool = true;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch(Self::KIND, other)),
        }
    }
}

impl Literal for i64 {
    const KIND: &'static str = "integer";

    fn to_value(&self) -> Value {
        Value::Number(Number::from(*self))
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| CodecError::format(Self::KIND, format!("{} is not an integer", n))),
            other => Err(mismatch(Self::KIND, other)),
        }
    }
}

impl Literal for f64 {
    const KIND: &'static str = "number";

    fn to_value(&self) -> Value {
        // NaN and infinities have no JSON form
        Number::from_f64(*self).map_or(Value::Null, Value::Number)
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| CodecError::format(Self::KIND, format!("{} is out of range", n))),
            other => Err(mismatch(Self::KIND, other)),
        }
    }
}

/// Untyped document values pass through as they are
impl Literal for Value {
    const KIND: &'static str = "value";

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        Ok(value.clone())
    }
}

impl<T: Literal> Literal for Vec<Token<T>> {
    const KIND: &'static str = "list";

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(Token::to_value).collect())
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    Token::from_value(item).map_err(|e| e.within(&format!("[{}]", i)))
                })
                .collect(),
            other => Err(mismatch(Self::KIND, other)),
        }
    }
}

impl<T: Literal> Literal for IndexMap<String, Token<T>> {
    const KIND: &'static str = "record";

    fn to_value(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(key, token)| (key.clone(), token.to_value()))
                .collect(),
        )
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        match value {
            Value::Object(map) => map
                .iter()
                .map(|(key, item)| {
                    Token::from_value(item)
                        .map(|token| (key.clone(), token))
                        .map_err(|e| e.within(key))
                })
                .collect(),
            other => Err(mismatch(Self::KIND, other)),
        }
    }
}
