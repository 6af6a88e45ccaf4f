//! Token algebra: literal values, references and intrinsic function calls
//!
//! A [`Token<T>`] is a value of logical type `T` that may be known when the
//! document is written (a literal) or only when the provisioning service
//! evaluates it (a reference or an intrinsic call). Tokens are plain owned
//! trees; they refer to other entities by logical name only.
//!
//! # Example
//!
//! ```rust
//! use stackform::Token;
//!
//! let bucket: Token<String> = Token::join("-", ["logs".into(), Token::reference("Stage")]);
//! assert_eq!(
//!     bucket.to_value(),
//!     serde_json::json!({"Fn::Join": ["-", ["logs", {"Ref": "Stage"}]]})
//! );
//! ```

mod interpolate;
mod intrinsic;
mod literal;
mod timestamp;

pub use interpolate::{interpolate, TokenError};
pub use intrinsic::Intrinsic;
pub use literal::{List, Literal, Record};
pub(crate) use literal::mismatch;
pub use timestamp::{timestamp_codec, Timestamp, TimestampCodec};

use serde_json::Value;

/// A value of logical type `T`, resolved either now or at deployment time
#[derive(Debug, Clone, PartialEq)]
pub enum Token<T> {
    /// A value known when the document is written
    Literal(T),
    /// The value bound to a named parameter or resource (`Ref`)
    Ref(String),
    /// A computed attribute of a named resource (`Fn::GetAtt`)
    GetAtt { resource: String, attribute: String },
    /// The result of an intrinsic function evaluated by the service
    Call(Box<Intrinsic>),
}

/// Lift a plain value into a literal token
pub fn lift<T>(value: T) -> Token<T> {
    Token::Literal(value)
}

impl<T> From<T> for Token<T> {
    fn from(value: T) -> Self {
        Token::Literal(value)
    }
}

impl From<&str> for Token<String> {
    fn from(value: &str) -> Self {
        Token::Literal(value.to_string())
    }
}

/// Untyped tokens accept any typed literal or token, erasing its type
macro_rules! erase_into_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Token<Value> {
                fn from(value: $ty) -> Self {
                    Token::Literal(value.to_value())
                }
            }

            impl From<Token<$ty>> for Token<Value> {
                fn from(token: Token<$ty>) -> Self {
                    token.erase()
                }
            }
        )*
    };
}

erase_into_value!(
    String,
    bool,
    i64,
    f64,
    Timestamp,
    List<String>,
    List<Value>,
    Record<String>,
    Record<Value>,
);

impl From<&str> for Token<Value> {
    fn from(value: &str) -> Self {
        Token::Literal(Value::String(value.to_string()))
    }
}

impl<T> Token<T> {
    /// Create a literal token
    pub fn lit(value: T) -> Self {
        Token::Literal(value)
    }

    /// Reference a parameter or resource by logical name
    pub fn reference(name: impl Into<String>) -> Self {
        Token::Ref(name.into())
    }

    /// Reference an attribute of a resource
    pub fn attribute(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Token::GetAtt {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }

    /// Look up a value in a two-level mapping
    pub fn find_in_map(
        mapping: impl Into<String>,
        top_key: impl Into<Token<String>>,
        second_key: impl Into<Token<String>>,
    ) -> Self {
        Self::call(Intrinsic::FindInMap {
            mapping: mapping.into(),
            top_key: top_key.into(),
            second_key: second_key.into(),
        })
    }

    /// Import a value exported by another stack
    pub fn import_value(export_name: impl Into<Token<String>>) -> Self {
        Self::call(Intrinsic::ImportValue(export_name.into()))
    }

    /// Wrap an intrinsic call
    ///
    /// The caller is responsible for `T` matching what the intrinsic produces;
    /// the typed constructors on `Token` are the checked way in.
    pub fn call(intrinsic: Intrinsic) -> Self {
        Token::Call(Box::new(intrinsic))
    }

    /// The literal value, if this token is one
    pub fn as_literal(&self) -> Option<&T> {
        match self {
            Token::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Whether the value is known without evaluating anything
    pub fn is_literal(&self) -> bool {
        matches!(self, Token::Literal(_))
    }
}

impl<T: Literal> Token<T> {
    /// Choose between two values depending on a named condition
    pub fn if_(
        condition: impl Into<String>,
        then: impl Into<Token<T>>,
        otherwise: impl Into<Token<T>>,
    ) -> Self {
        Self::call(Intrinsic::If {
            condition: condition.into(),
            then: then.into().erase(),
            otherwise: otherwise.into().erase(),
        })
    }

    /// Pick one element out of a list by position
    pub fn select(index: u32, values: impl Into<Token<List<T>>>) -> Self {
        Self::call(Intrinsic::Select {
            index,
            values: values.into().erase(),
        })
    }

    /// Forget the logical type, keeping the encoded form
    ///
    /// Literals are replaced by their document encoding; references and calls
    /// are untyped already and pass through unchanged.
    pub fn erase(self) -> Token<Value> {
        match self {
            Token::Literal(value) => Token::Literal(value.to_value()),
            Token::Ref(name) => Token::Ref(name),
            Token::GetAtt {
                resource,
                attribute,
            } => Token::GetAtt {
                resource,
                attribute,
            },
            Token::Call(call) => Token::Call(call),
        }
    }
}

impl Token<String> {
    /// Concatenate values with a delimiter
    pub fn join(
        delimiter: impl Into<String>,
        values: impl IntoIterator<Item = Token<String>>,
    ) -> Self {
        Self::call(Intrinsic::Join {
            delimiter: delimiter.into(),
            values: values.into_iter().collect(),
        })
    }

    /// Base64-encode a string
    pub fn base64(value: impl Into<Token<String>>) -> Self {
        Self::call(Intrinsic::Base64(value.into()))
    }

    /// Substitute `${Name}` placeholders in a string
    pub fn sub(template: impl Into<String>) -> Self {
        Self::call(Intrinsic::Sub {
            template: template.into(),
            variables: Default::default(),
        })
    }

    /// Substitute placeholders, binding some of them to local variables
    pub fn sub_with<K, V>(
        template: impl Into<String>,
        variables: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<Token<String>>,
    {
        Self::call(Intrinsic::Sub {
            template: template.into(),
            variables: variables
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        })
    }
}

impl Token<bool> {
    /// Compare two values of the same type
    pub fn equals<U: Literal>(left: impl Into<Token<U>>, right: impl Into<Token<U>>) -> Self {
        Self::call(Intrinsic::Equals(left.into().erase(), right.into().erase()))
    }

    /// True when every condition holds
    pub fn and(conditions: impl IntoIterator<Item = Token<bool>>) -> Self {
        Self::call(Intrinsic::And(conditions.into_iter().collect()))
    }

    /// True when any condition holds
    pub fn or(conditions: impl IntoIterator<Item = Token<bool>>) -> Self {
        Self::call(Intrinsic::Or(conditions.into_iter().collect()))
    }

    /// Negate a condition
    pub fn not(condition: impl Into<Token<bool>>) -> Self {
        Self::call(Intrinsic::Not(condition.into()))
    }

    /// Reuse another named condition
    pub fn condition(name: impl Into<String>) -> Self {
        Self::call(Intrinsic::Condition(name.into()))
    }
}

impl Token<List<String>> {
    /// Split a string into a list
    pub fn split(delimiter: impl Into<String>, source: impl Into<Token<String>>) -> Self {
        Self::call(Intrinsic::Split {
            delimiter: delimiter.into(),
            source: source.into(),
        })
    }

    /// The availability zones of a region (empty string = current region)
    pub fn get_azs(region: impl Into<Token<String>>) -> Self {
        Self::call(Intrinsic::GetAZs(region.into()))
    }

    /// Carve a CIDR block into `count` subnets of `bits` host bits each
    pub fn cidr(
        block: impl Into<Token<String>>,
        count: impl Into<Token<i64>>,
        bits: impl Into<Token<i64>>,
    ) -> Self {
        Self::call(Intrinsic::Cidr {
            block: block.into(),
            count: count.into(),
            bits: bits.into(),
        })
    }
}
