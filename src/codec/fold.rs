//! Constant folding over encoded documents
//!
//! Intrinsics whose operands are all literal can be evaluated while the
//! document is written instead of by the service. Folding runs bottom-up so
//! nested calls collapse first, and leaves everything it cannot evaluate as
//! it was.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

use crate::token::Intrinsic;

use super::placeholder::unescape;
use super::single_entry;

/// Replace every foldable intrinsic in a document value with its result
pub fn fold_constants(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(fold_constants).collect()),
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .map(|(key, value)| (key, fold_constants(value)))
                .collect();
            fold_call(map)
        }
        other => other,
    }
}

fn fold_call(map: Map<String, Value>) -> Value {
    let folded = single_entry(&map).and_then(|(key, operand)| {
        let result = match key.as_str() {
            Intrinsic::JOIN => fold_join(operand),
            Intrinsic::BASE64 => operand.as_str().map(|s| Value::String(STANDARD.encode(s))),
            Intrinsic::SELECT => fold_select(operand),
            Intrinsic::SUB => operand.as_str().and_then(unescape).map(Value::String),
            _ => None,
        };
        if result.is_some() {
            tracing::trace!(function = %key, "folded constant intrinsic");
        }
        result
    });
    folded.unwrap_or(Value::Object(map))
}

fn fold_join(operand: &Value) -> Option<Value> {
    let [delimiter, values] = operand.as_array()?.as_slice() else {
        return None;
    };
    let delimiter = delimiter.as_str()?;
    let parts = values
        .as_array()?
        .iter()
        .map(Value::as_str)
        .collect::<Option<Vec<_>>>()?;
    Some(Value::String(parts.join(delimiter)))
}

fn fold_select(operand: &Value) -> Option<Value> {
    let [index, values] = operand.as_array()?.as_slice() else {
        return None;
    };
    let index = match index {
        Value::Number(n) => usize::try_from(n.as_u64()?).ok()?,
        Value::String(s) => s.parse().ok()?,
        _ => return None,
    };
    values.as_array()?.get(index).cloned()
}
