//! The catalog of intrinsic functions

use indexmap::IndexMap;
use serde_json::Value;

use super::Token;

/// An intrinsic function call, evaluated by the provisioning service
///
/// Operands whose type follows the call site (`If` branches, `Equals`
/// operands, `Select` lists) are stored erased to `Token<Value>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Intrinsic {
    /// `Fn::Join`: concatenate strings with a delimiter
    Join {
        delimiter: String,
        values: Vec<Token<String>>,
    },
    /// `Fn::Select`: pick a list element by index
    Select { index: u32, values: Token<Value> },
    /// `Fn::Split`: split a string into a list
    Split {
        delimiter: String,
        source: Token<String>,
    },
    /// `Fn::If`: choose a branch based on a named condition
    If {
        condition: String,
        then: Token<Value>,
        otherwise: Token<Value>,
    },
    /// `Fn::Equals`
    Equals(Token<Value>, Token<Value>),
    /// `Fn::And`
    And(Vec<Token<bool>>),
    /// `Fn::Or`
    Or(Vec<Token<bool>>),
    /// `Fn::Not`
    Not(Token<bool>),
    /// `Condition`: the value of another named condition
    Condition(String),
    /// `Fn::FindInMap`: two-level lookup in a named mapping
    FindInMap {
        mapping: String,
        top_key: Token<String>,
        second_key: Token<String>,
    },
    /// `Fn::Base64`
    Base64(Token<String>),
    /// `Fn::Sub`: placeholder substitution with optional local variables
    Sub {
        template: String,
        variables: IndexMap<String, Token<String>>,
    },
    /// `Fn::GetAZs`
    GetAZs(Token<String>),
    /// `Fn::ImportValue`
    ImportValue(Token<String>),
    /// `Fn::Cidr`
    Cidr {
        block: Token<String>,
        count: Token<i64>,
        bits: Token<i64>,
    },
}

impl Intrinsic {
    pub const JOIN: &'static str = "Fn::Join";
    pub const SELECT: &'static str = "Fn::Select";
    pub const SPLIT: &'static str = "Fn::Split";
    pub const IF: &'static str = "Fn::If";
    pub const EQUALS: &'static str = "Fn::Equals";
    pub const AND: &'static str = "Fn::And";
    pub const OR: &'static str = "Fn::Or";
    pub const NOT: &'static str = "Fn::Not";
    pub const CONDITION: &'static str = "Condition";
    pub const FIND_IN_MAP: &'static str = "Fn::FindInMap";
    pub const BASE64: &'static str = "Fn::Base64";
    pub const SUB: &'static str = "Fn::Sub";
    pub const GET_AZS: &'static str = "Fn::GetAZs";
    pub const IMPORT_VALUE: &'static str = "Fn::ImportValue";
    pub const CIDR: &'static str = "Fn::Cidr";

    /// Every document key that decodes to an intrinsic call
    pub const NAMES: &'static [&'static str] = &[
        Self::JOIN,
        Self::SELECT,
        Self::SPLIT,
        Self::IF,
        Self::EQUALS,
        Self::AND,
        Self::OR,
        Self::NOT,
        Self::CONDITION,
        Self::FIND_IN_MAP,
        Self::BASE64,
        Self::SUB,
        Self::GET_AZS,
        Self::IMPORT_VALUE,
        Self::CIDR,
    ];

    /// The document key this call is serialized under
    pub fn name(&self) -> &'static str {
        match self {
            Intrinsic::Join { .. } => Self::JOIN,
            Intrinsic::Select { .. } => Self::SELECT,
            Intrinsic::Split { .. } => Self::SPLIT,
            Intrinsic::If { .. } => Self::IF,
            Intrinsic::Equals(..) => Self::EQUALS,
            Intrinsic::And(_) => Self::AND,
            Intrinsic::Or(_) => Self::OR,
            Intrinsic::Not(_) => Self::NOT,
            Intrinsic::Condition(_) => Self::CONDITION,
            Intrinsic::FindInMap { .. } => Self::FIND_IN_MAP,
            Intrinsic::Base64(_) => Self::BASE64,
            Intrinsic::Sub { .. } => Self::SUB,
            Intrinsic::GetAZs(_) => Self::GET_AZS,
            Intrinsic::ImportValue(_) => Self::IMPORT_VALUE,
            Intrinsic::Cidr { .. } => Self::CIDR,
        }
    }

    /// Whether a document key names a known intrinsic
    pub fn is_known(key: &str) -> bool {
        Self::NAMES.contains(&key)
    }

    /// Whether this call belongs in condition expressions
    ///
    /// Nothing enforces this; it is exposed for callers that want to check.
    pub fn is_condition_function(&self) -> bool {
        matches!(
            self,
            Intrinsic::Equals(..)
                | Intrinsic::And(_)
                | Intrinsic::Or(_)
                | Intrinsic::Not(_)
                | Intrinsic::Condition(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_variants() {
        let call = Intrinsic::Base64(Token::Literal("x".to_string()));
        assert_eq!(call.name(), "Fn::Base64");
        assert!(Intrinsic::is_known(call.name()));
    }

    #[test]
    fn test_reference_forms_are_not_calls() {
        assert!(!Intrinsic::is_known("Ref"));
        assert!(!Intrinsic::is_known("Fn::GetAtt"));
        assert!(!Intrinsic::is_known("Fn::Frobnicate"));
    }

    #[test]
    fn test_condition_functions() {
        assert!(Intrinsic::Condition("IsProd".to_string()).is_condition_function());
        assert!(!Intrinsic::GetAZs(Token::Literal(String::new())).is_condition_function());
    }
}
