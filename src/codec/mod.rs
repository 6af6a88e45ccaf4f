//! Conversion between the template model and the JSON document schema
//!
//! Tokens encode as their literal's natural form, as `{"Ref": name}`, as
//! `{"Fn::GetAtt": [resource, attribute]}`, or as a single-key object named
//! after the intrinsic. Decoding recognizes those forms in that order and
//! falls back to a literal, which means a literal object that happens to be
//! shaped like `{"Ref": "X"}` always comes back as a reference.
//! `{"Condition": name}` is a call only where a boolean is expected; anywhere
//! else it is an ordinary literal object.

mod fold;
mod intrinsic;
pub(crate) mod placeholder;
mod template;

pub use fold::fold_constants;
pub use template::{from_document, to_document, to_document_with};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::CodecError;
use crate::token::{Intrinsic, Literal, Token};

/// Document key of a parameter or resource reference
pub const REF: &str = "Ref";

/// Document key of a resource attribute reference
pub const GET_ATT: &str = "Fn::GetAtt";

/// The only entry of a single-key object
pub(crate) fn single_entry(map: &Map<String, Value>) -> Option<(&String, &Value)> {
    if map.len() == 1 {
        map.iter().next()
    } else {
        None
    }
}

/// Build a single-key object
pub(crate) fn single(key: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), value);
    Value::Object(map)
}

impl<T: Literal> Token<T> {
    /// Encode as a document value
    pub fn to_value(&self) -> Value {
        match self {
            Token::Literal(value) => value.to_value(),
            Token::Ref(name) => single(REF, Value::String(name.clone())),
            Token::GetAtt {
                resource,
                attribute,
            } => single(
                GET_ATT,
                Value::Array(vec![
                    Value::String(resource.clone()),
                    Value::String(attribute.clone()),
                ]),
            ),
            Token::Call(call) => call.to_value(),
        }
    }

    /// Decode from a document value
    pub fn from_value(value: &Value) -> Result<Self, CodecError> {
        if let Value::Object(map) = value {
            if let Some((key, operand)) = single_entry(map) {
                match key.as_str() {
                    REF => return decode_ref(operand).map(Token::Ref),
                    GET_ATT => {
                        let (resource, attribute) = decode_get_att(operand)?;
                        return Ok(Token::GetAtt {
                            resource,
                            attribute,
                        });
                    }
                    Intrinsic::CONDITION if !T::CONDITION_REFS => {}
                    name if Intrinsic::is_known(name) => {
                        return Intrinsic::from_entry(name, operand).map(Token::call);
                    }
                    _ => {}
                }
            }
        }
        T::from_value(value).map(Token::Literal)
    }
}

fn decode_ref(operand: &Value) -> Result<String, CodecError> {
    match operand {
        Value::String(name) => Ok(name.clone()),
        _ => Err(CodecError::format(REF, "expected a logical name string")),
    }
}

/// Accepts `[resource, attribute]` and the dotted `"resource.attribute"` form
fn decode_get_att(operand: &Value) -> Result<(String, String), CodecError> {
    match operand {
        Value::Array(items) => match items.as_slice() {
            [Value::String(resource), Value::String(attribute)] => {
                Ok((resource.clone(), attribute.clone()))
            }
            _ => Err(CodecError::format(
                GET_ATT,
                "expected [resource, attribute] strings",
            )),
        },
        Value::String(dotted) => match dotted.split_once('.') {
            Some((resource, attribute)) if !resource.is_empty() && !attribute.is_empty() => {
                Ok((resource.to_string(), attribute.to_string()))
            }
            _ => Err(CodecError::format(
                GET_ATT,
                format!("'{}' is not of the form resource.attribute", dotted),
            )),
        },
        _ => Err(CodecError::format(
            GET_ATT,
            "expected [resource, attribute] strings",
        )),
    }
}

impl<T: Literal> Serialize for Token<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de, T: Literal> Deserialize<'de> for Token<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Token::from_value(&value).map_err(D::Error::custom)
    }
}
