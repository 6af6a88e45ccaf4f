//! Encoding and decoding rules for each intrinsic function

use serde_json::{Number, Value};

use crate::error::CodecError;
use crate::token::{Intrinsic, List, Literal, Record, Token};

use super::single;

fn tokens<T: Literal>(values: &[Token<T>]) -> Value {
    Value::Array(values.iter().map(Token::to_value).collect())
}

impl Intrinsic {
    /// Encode as a single-key document object
    ///
    /// Single-operand functions take the operand directly, the rest take a
    /// list. `Fn::Not` is the exception and always wraps its operand in a list.
    pub fn to_value(&self) -> Value {
        let operand = match self {
            Intrinsic::Join { delimiter, values } => {
                Value::Array(vec![Value::String(delimiter.clone()), tokens(values)])
            }
            Intrinsic::Select { index, values } => {
                Value::Array(vec![Value::Number(Number::from(*index)), values.to_value()])
            }
            Intrinsic::Split { delimiter, source } => {
                Value::Array(vec![Value::String(delimiter.clone()), source.to_value()])
            }
            Intrinsic::If {
                condition,
                then,
                otherwise,
            } => Value::Array(vec![
                Value::String(condition.clone()),
                then.to_value(),
                otherwise.to_value(),
            ]),
            Intrinsic::Equals(left, right) => Value::Array(vec![left.to_value(), right.to_value()]),
            Intrinsic::And(conditions) | Intrinsic::Or(conditions) => tokens(conditions),
            Intrinsic::Not(condition) => Value::Array(vec![condition.to_value()]),
            Intrinsic::Condition(name) => Value::String(name.clone()),
            Intrinsic::FindInMap {
                mapping,
                top_key,
                second_key,
            } => Value::Array(vec![
                Value::String(mapping.clone()),
                top_key.to_value(),
                second_key.to_value(),
            ]),
            Intrinsic::Base64(value) => value.to_value(),
            Intrinsic::Sub {
                template,
                variables,
            } => {
                if variables.is_empty() {
                    Value::String(template.clone())
                } else {
                    Value::Array(vec![Value::String(template.clone()), variables.to_value()])
                }
            }
            Intrinsic::GetAZs(region) => region.to_value(),
            Intrinsic::ImportValue(name) => name.to_value(),
            Intrinsic::Cidr { block, count, bits } => {
                Value::Array(vec![block.to_value(), count.to_value(), bits.to_value()])
            }
        };
        single(self.name(), operand)
    }

    /// Decode the operand of a known intrinsic key
    pub(crate) fn from_entry(name: &str, operand: &Value) -> Result<Self, CodecError> {
        decode(name, operand).map_err(|e| e.within(name))
    }
}

fn decode(name: &str, operand: &Value) -> Result<Intrinsic, CodecError> {
    let call = match name {
        Intrinsic::JOIN => {
            let [delimiter, values] = operands::<2>(operand)?;
            Intrinsic::Join {
                delimiter: String::from_value(delimiter)?,
                values: List::<String>::from_value(values)?,
            }
        }
        Intrinsic::SELECT => {
            let [index, values] = operands::<2>(operand)?;
            Intrinsic::Select {
                index: decode_index(index)?,
                values: Token::from_value(values)?,
            }
        }
        Intrinsic::SPLIT => {
            let [delimiter, source] = operands::<2>(operand)?;
            Intrinsic::Split {
                delimiter: String::from_value(delimiter)?,
                source: Token::from_value(source)?,
            }
        }
        Intrinsic::IF => {
            let [condition, then, otherwise] = operands::<3>(operand)?;
            Intrinsic::If {
                condition: String::from_value(condition)?,
                then: Token::from_value(then)?,
                otherwise: Token::from_value(otherwise)?,
            }
        }
        Intrinsic::EQUALS => {
            let [left, right] = operands::<2>(operand)?;
            Intrinsic::Equals(Token::from_value(left)?, Token::from_value(right)?)
        }
        Intrinsic::AND => Intrinsic::And(List::<bool>::from_value(operand)?),
        Intrinsic::OR => Intrinsic::Or(List::<bool>::from_value(operand)?),
        Intrinsic::NOT => {
            let condition = match operand {
                Value::Array(_) => {
                    let [condition] = operands::<1>(operand)?;
                    condition
                }
                other => other,
            };
            Intrinsic::Not(Token::from_value(condition)?)
        }
        Intrinsic::CONDITION => Intrinsic::Condition(String::from_value(operand)?),
        Intrinsic::FIND_IN_MAP => {
            let [mapping, top_key, second_key] = operands::<3>(operand)?;
            Intrinsic::FindInMap {
                mapping: String::from_value(mapping)?,
                top_key: Token::from_value(top_key)?,
                second_key: Token::from_value(second_key)?,
            }
        }
        Intrinsic::BASE64 => Intrinsic::Base64(Token::from_value(operand)?),
        Intrinsic::SUB => match operand {
            Value::String(template) => Intrinsic::Sub {
                template: template.clone(),
                variables: Default::default(),
            },
            _ => {
                let [template, variables] = operands::<2>(operand)?;
                Intrinsic::Sub {
                    template: String::from_value(template)?,
                    variables: Record::<String>::from_value(variables)?,
                }
            }
        },
        Intrinsic::GET_AZS => Intrinsic::GetAZs(Token::from_value(operand)?),
        Intrinsic::IMPORT_VALUE => Intrinsic::ImportValue(Token::from_value(operand)?),
        Intrinsic::CIDR => {
            let [block, count, bits] = operands::<3>(operand)?;
            Intrinsic::Cidr {
                block: Token::from_value(block)?,
                count: Token::from_value(count)?,
                bits: Token::from_value(bits)?,
            }
        }
        other => {
            return Err(CodecError::format(
                other,
                "not an intrinsic function".to_string(),
            ))
        }
    };
    Ok(call)
}

/// Exactly `N` positional operands
fn operands<const N: usize>(operand: &Value) -> Result<&[Value; N], CodecError> {
    operand
        .as_array()
        .and_then(|items| <&[Value; N]>::try_from(items.as_slice()).ok())
        .ok_or_else(|| {
            CodecError::format("", format!("expected a list of {} operands", N))
        })
}

/// Indexes are numbers, but the service also accepts them as digit strings
fn decode_index(value: &Value) -> Result<u32, CodecError> {
    let index = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.parse::<u32>().ok(),
        _ => None,
    };
    index.ok_or_else(|| CodecError::format("index", "expected a non-negative integer"))
}
