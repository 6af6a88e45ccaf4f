//! Named entities: parameters, conditions, mappings, resources and outputs

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::token::{Literal, Record, Token};

/// The five kinds of named entity a template declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Parameters,
    Conditions,
    Mappings,
    Resources,
    Outputs,
}

impl Category {
    /// All categories in document order
    pub const ALL: [Category; 5] = [
        Category::Parameters,
        Category::Conditions,
        Category::Mappings,
        Category::Resources,
        Category::Outputs,
    ];

    /// The top-level document key for this category
    pub fn key(&self) -> &'static str {
        match self {
            Category::Parameters => "Parameters",
            Category::Conditions => "Conditions",
            Category::Mappings => "Mappings",
            Category::Resources => "Resources",
            Category::Outputs => "Outputs",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Anything declared under a logical name within a category
pub trait NamedEntity {
    const CATEGORY: Category;

    fn logical_name(&self) -> &str;
}

/// An input value supplied when the stack is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Parameter {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Number>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_echo: bool,
}

impl Parameter {
    pub const STRING: &'static str = "String";
    pub const NUMBER: &'static str = "Number";
    pub const NUMBER_LIST: &'static str = "List<Number>";
    pub const COMMA_DELIMITED_LIST: &'static str = "CommaDelimitedList";

    /// Create a parameter of the given type
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            description: None,
            default: None,
            allowed_values: Vec::new(),
            allowed_pattern: None,
            constraint_description: None,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            no_echo: false,
        }
    }

    /// Create a `String` parameter
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, Self::STRING)
    }

    /// Create a `Number` parameter
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, Self::NUMBER)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default<T: Literal>(mut self, default: T) -> Self {
        self.default = Some(default.to_value());
        self
    }

    pub fn with_allowed_values<T: Literal>(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.allowed_values = values.into_iter().map(|v| v.to_value()).collect();
        self
    }

    pub fn with_allowed_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.allowed_pattern = Some(pattern.into());
        self
    }

    pub fn with_constraint_description(mut self, description: impl Into<String>) -> Self {
        self.constraint_description = Some(description.into());
        self
    }

    pub fn with_length(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_range(mut self, min: Option<Number>, max: Option<Number>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    /// Mask the value in console and API output
    pub fn with_no_echo(mut self) -> Self {
        self.no_echo = true;
        self
    }

    /// A token resolving to this parameter's value
    pub fn reference<T>(&self) -> Token<T> {
        Token::reference(&self.name)
    }
}

impl NamedEntity for Parameter {
    const CATEGORY: Category = Category::Parameters;

    fn logical_name(&self) -> &str {
        &self.name
    }
}

/// A named boolean expression that gates resources and outputs
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub name: String,
    pub expression: Token<bool>,
}

impl Condition {
    pub fn new(name: impl Into<String>, expression: impl Into<Token<bool>>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }

    /// A token evaluating to this condition, for use in other conditions
    pub fn reference(&self) -> Token<bool> {
        Token::condition(&self.name)
    }

    /// Choose between two values depending on this condition
    pub fn select<T: Literal>(
        &self,
        then: impl Into<Token<T>>,
        otherwise: impl Into<Token<T>>,
    ) -> Token<T> {
        Token::if_(&self.name, then, otherwise)
    }
}

impl NamedEntity for Condition {
    const CATEGORY: Category = Category::Conditions;

    fn logical_name(&self) -> &str {
        &self.name
    }
}

/// A two-level lookup table: top key, then second key, then value
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    pub name: String,
    pub entries: IndexMap<String, IndexMap<String, Value>>,
}

impl Mapping {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    /// Add or replace one value
    pub fn with_entry<T: Literal>(
        mut self,
        top_key: impl Into<String>,
        second_key: impl Into<String>,
        value: T,
    ) -> Self {
        self.entries
            .entry(top_key.into())
            .or_default()
            .insert(second_key.into(), value.to_value());
        self
    }

    /// The literal value stored under the two keys, if any
    pub fn get(&self, top_key: &str, second_key: &str) -> Option<&Value> {
        self.entries.get(top_key)?.get(second_key)
    }

    /// A token that looks a value up in this mapping at deployment time
    pub fn find<T>(
        &self,
        top_key: impl Into<Token<String>>,
        second_key: impl Into<Token<String>>,
    ) -> Token<T> {
        Token::find_in_map(&self.name, top_key, second_key)
    }
}

impl NamedEntity for Mapping {
    const CATEGORY: Category = Category::Mappings;

    fn logical_name(&self) -> &str {
        &self.name
    }
}

/// What happens to a resource's physical object when it leaves the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPolicy {
    Delete,
    Retain,
    RetainExceptOnCreate,
    Snapshot,
}

impl DeletionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionPolicy::Delete => "Delete",
            DeletionPolicy::Retain => "Retain",
            DeletionPolicy::RetainExceptOnCreate => "RetainExceptOnCreate",
            DeletionPolicy::Snapshot => "Snapshot",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Delete" => Some(DeletionPolicy::Delete),
            "Retain" => Some(DeletionPolicy::Retain),
            "RetainExceptOnCreate" => Some(DeletionPolicy::RetainExceptOnCreate),
            "Snapshot" => Some(DeletionPolicy::Snapshot),
            _ => None,
        }
    }
}

/// A provisioned infrastructure object
///
/// Properties are opaque to this crate beyond being encodable tokens; their
/// shape per resource type is the resource catalog's business.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub name: String,
    pub kind: String,
    pub properties: Record<Value>,
    pub depends_on: Vec<String>,
    pub condition: Option<String>,
    pub deletion_policy: Option<DeletionPolicy>,
    pub update_replace_policy: Option<DeletionPolicy>,
    pub creation_policy: Option<Value>,
    pub update_policy: Option<Value>,
    pub metadata: Option<Value>,
}

impl Resource {
    /// Create a resource of the given type, e.g. `AWS::S3::Bucket`
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            properties: IndexMap::new(),
            depends_on: Vec::new(),
            condition: None,
            deletion_policy: None,
            update_replace_policy: None,
            creation_policy: None,
            update_policy: None,
            metadata: None,
        }
    }

    /// Set a property; later calls with the same key replace earlier ones
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Token<Value>>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_depends_on(mut self, resource: impl Into<String>) -> Self {
        self.depends_on.push(resource.into());
        self
    }

    /// Only create this resource when the named condition holds
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = Some(policy);
        self
    }

    pub fn with_update_replace_policy(mut self, policy: DeletionPolicy) -> Self {
        self.update_replace_policy = Some(policy);
        self
    }

    pub fn with_creation_policy(mut self, policy: Value) -> Self {
        self.creation_policy = Some(policy);
        self
    }

    pub fn with_update_policy(mut self, policy: Value) -> Self {
        self.update_policy = Some(policy);
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn property(&self, key: &str) -> Option<&Token<Value>> {
        self.properties.get(key)
    }

    /// A token resolving to this resource's primary identifier
    pub fn reference<T>(&self) -> Token<T> {
        Token::reference(&self.name)
    }

    /// A token resolving to one of this resource's computed attributes
    pub fn attribute<T>(&self, attribute: impl Into<String>) -> Token<T> {
        Token::attribute(&self.name, attribute)
    }
}

impl NamedEntity for Resource {
    const CATEGORY: Category = Category::Resources;

    fn logical_name(&self) -> &str {
        &self.name
    }
}

/// A value reported, and optionally exported, once the stack is created
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub name: String,
    pub value: Token<Value>,
    pub description: Option<String>,
    pub export: Option<Token<String>>,
    pub condition: Option<String>,
}

impl Output {
    pub fn new(name: impl Into<String>, value: impl Into<Token<Value>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            description: None,
            export: None,
            condition: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Export the value under a name other stacks can import
    pub fn with_export(mut self, name: impl Into<Token<String>>) -> Self {
        self.export = Some(name.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

impl NamedEntity for Output {
    const CATEGORY: Category = Category::Outputs;

    fn logical_name(&self) -> &str {
        &self.name
    }
}

/// Any one named entity
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Parameter(Parameter),
    Condition(Condition),
    Mapping(Mapping),
    Resource(Resource),
    Output(Output),
}

impl Entity {
    pub fn category(&self) -> Category {
        match self {
            Entity::Parameter(_) => Category::Parameters,
            Entity::Condition(_) => Category::Conditions,
            Entity::Mapping(_) => Category::Mappings,
            Entity::Resource(_) => Category::Resources,
            Entity::Output(_) => Category::Outputs,
        }
    }

    pub fn logical_name(&self) -> &str {
        match self {
            Entity::Parameter(e) => e.logical_name(),
            Entity::Condition(e) => e.logical_name(),
            Entity::Mapping(e) => e.logical_name(),
            Entity::Resource(e) => e.logical_name(),
            Entity::Output(e) => e.logical_name(),
        }
    }
}

impl From<Parameter> for Entity {
    fn from(e: Parameter) -> Self {
        Entity::Parameter(e)
    }
}

impl From<Condition> for Entity {
    fn from(e: Condition) -> Self {
        Entity::Condition(e)
    }
}

impl From<Mapping> for Entity {
    fn from(e: Mapping) -> Self {
        Entity::Mapping(e)
    }
}

impl From<Resource> for Entity {
    fn from(e: Resource) -> Self {
        Entity::Resource(e)
    }
}

impl From<Output> for Entity {
    fn from(e: Output) -> Self {
        Entity::Output(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_keys() {
        let keys: Vec<_> = Category::ALL.iter().map(|c| c.key()).collect();
        assert_eq!(
            keys,
            vec!["Parameters", "Conditions", "Mappings", "Resources", "Outputs"]
        );
        assert_eq!(Category::Resources.to_string(), "Resources");
    }

    #[test]
    fn test_parameter_builder() {
        let param = Parameter::string("Env")
            .with_description("Deployment stage")
            .with_default("dev".to_string())
            .with_allowed_values(["dev".to_string(), "prod".to_string()]);
        assert_eq!(param.kind, "String");
        assert_eq!(param.default, Some(json!("dev")));
        assert_eq!(param.allowed_values, vec![json!("dev"), json!("prod")]);
        assert_eq!(param.reference::<String>(), Token::Ref("Env".to_string()));
    }

    #[test]
    fn test_mapping_entries() {
        let mapping = Mapping::new("RegionMap")
            .with_entry("us-east-1", "Ami", "ami-1".to_string())
            .with_entry("us-east-1", "Size", 2_i64)
            .with_entry("eu-west-1", "Ami", "ami-2".to_string());
        assert_eq!(mapping.entries.len(), 2);
        assert_eq!(mapping.get("us-east-1", "Size"), Some(&json!(2)));
        assert_eq!(mapping.get("eu-west-1", "Size"), None);
    }

    #[test]
    fn test_resource_references() {
        let bucket = Resource::new("Logs", "AWS::S3::Bucket");
        assert_eq!(bucket.reference::<String>(), Token::Ref("Logs".to_string()));
        assert_eq!(
            bucket.attribute::<String>("Arn"),
            Token::GetAtt {
                resource: "Logs".to_string(),
                attribute: "Arn".to_string(),
            }
        );
    }

    #[test]
    fn test_resource_property_replaces() {
        let resource = Resource::new("Web", "AWS::EC2::Instance")
            .with_property("InstanceType", "t3.micro")
            .with_property("InstanceType", "t3.large");
        assert_eq!(resource.properties.len(), 1);
        assert_eq!(
            resource.property("InstanceType"),
            Some(&Token::Literal(json!("t3.large")))
        );
    }

    #[test]
    fn test_entity_identity() {
        let entity: Entity = Output::new("Url", "https://example.com").into();
        assert_eq!(entity.category(), Category::Outputs);
        assert_eq!(entity.logical_name(), "Url");
    }

    #[test]
    fn test_deletion_policy_names() {
        for policy in [
            DeletionPolicy::Delete,
            DeletionPolicy::Retain,
            DeletionPolicy::RetainExceptOnCreate,
            DeletionPolicy::Snapshot,
        ] {
            assert_eq!(DeletionPolicy::from_name(policy.as_str()), Some(policy));
        }
        assert_eq!(DeletionPolicy::from_name("Keep"), None);
    }
}
