//! The template aggregate and its named entities
//!
//! A [`Template`] holds the declarations of one infrastructure document in
//! insertion order. Templates are built with consuming `with_*` methods and
//! combined with [`merge`]; nothing is edited in place once it has been
//! handed over.
//!
//! # Example
//!
//! ```rust
//! use stackform::template::{merge, Parameter, Resource, Template};
//!
//! let network = Template::from_entity(Parameter::string("VpcCidr"));
//! let compute = Template::from_entity(Resource::new("Web", "AWS::EC2::Instance"));
//!
//! let stack = merge(network, compute).unwrap();
//! assert_eq!(stack.parameters.len(), 1);
//! assert_eq!(stack.resources.len(), 1);
//! ```

mod entity;
mod error;
mod merge;

pub use entity::{
    Category, Condition, DeletionPolicy, Entity, Mapping, NamedEntity, Output, Parameter, Resource,
};
pub use error::TemplateError;
pub use merge::{collapse, merge};

use merge::check_unique;

/// One infrastructure document, prior to encoding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    pub format_version: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<Parameter>,
    pub conditions: Vec<Condition>,
    pub mappings: Vec<Mapping>,
    pub resources: Vec<Resource>,
    pub outputs: Vec<Output>,
}

impl Template {
    /// The template with nothing in it; the identity of [`merge`]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A template declaring exactly one entity
    pub fn from_entity(entity: impl Into<Entity>) -> Self {
        Self::empty().with_entity(entity)
    }

    /// Append an entity to its category
    ///
    /// Name collisions are not checked here; they surface on [`merge`] or
    /// when the template is encoded.
    pub fn with_entity(mut self, entity: impl Into<Entity>) -> Self {
        match entity.into() {
            Entity::Parameter(e) => self.parameters.push(e),
            Entity::Condition(e) => self.conditions.push(e),
            Entity::Mapping(e) => self.mappings.push(e),
            Entity::Resource(e) => self.resources.push(e),
            Entity::Output(e) => self.outputs.push(e),
        }
        self
    }

    pub fn with_parameter(self, parameter: Parameter) -> Self {
        self.with_entity(parameter)
    }

    pub fn with_condition(self, condition: Condition) -> Self {
        self.with_entity(condition)
    }

    pub fn with_mapping(self, mapping: Mapping) -> Self {
        self.with_entity(mapping)
    }

    pub fn with_resource(self, resource: Resource) -> Self {
        self.with_entity(resource)
    }

    pub fn with_output(self, output: Output) -> Self {
        self.with_entity(output)
    }

    pub fn with_format_version(mut self, version: impl Into<String>) -> Self {
        self.format_version = Some(version.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Combine with another template; see [`merge`]
    pub fn merge(self, other: Template) -> Result<Template, TemplateError> {
        merge(self, other)
    }

    /// Check that logical names are unique within every category
    pub fn validate(&self) -> Result<(), TemplateError> {
        check_unique(&self.parameters)?;
        check_unique(&self.conditions)?;
        check_unique(&self.mappings)?;
        check_unique(&self.resources)?;
        check_unique(&self.outputs)?;
        Ok(())
    }

    /// Whether no entity and no scalar slot is set
    pub fn is_empty(&self) -> bool {
        self == &Self::empty()
    }

    /// Logical names declared in one category, in order
    pub fn names(&self, category: Category) -> Vec<&str> {
        fn collect<E: NamedEntity>(entities: &[E]) -> Vec<&str> {
            entities.iter().map(|e| e.logical_name()).collect()
        }

        match category {
            Category::Parameters => collect(&self.parameters),
            Category::Conditions => collect(&self.conditions),
            Category::Mappings => collect(&self.mappings),
            Category::Resources => collect(&self.resources),
            Category::Outputs => collect(&self.outputs),
        }
    }

    /// Whether an entity with this name exists in the category
    pub fn contains(&self, category: Category, name: &str) -> bool {
        self.names(category).contains(&name)
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.iter().find(|o| o.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    #[test]
    fn test_from_entity_places_by_category() {
        let template = Template::from_entity(Condition::new(
            "IsProd",
            Token::equals::<String>(Token::<String>::reference("Env"), Token::lit("prod".to_string())),
        ));
        assert_eq!(template.conditions.len(), 1);
        assert!(template.contains(Category::Conditions, "IsProd"));
        assert!(!template.contains(Category::Resources, "IsProd"));
    }

    #[test]
    fn test_empty_template() {
        assert!(Template::empty().is_empty());
        assert!(!Template::empty().with_description("x").is_empty());
    }

    #[test]
    fn test_validate_finds_duplicates_in_one_template() {
        let template = Template::empty()
            .with_output(Output::new("Url", "a"))
            .with_output(Output::new("Url", "b"));
        assert_eq!(
            template.validate(),
            Err(TemplateError::duplicate(Category::Outputs, "Url"))
        );
    }

    #[test]
    fn test_names_in_insertion_order() {
        let template = Template::empty()
            .with_resource(Resource::new("Zeta", "AWS::SNS::Topic"))
            .with_resource(Resource::new("Alpha", "AWS::SQS::Queue"));
        assert_eq!(template.names(Category::Resources), vec!["Zeta", "Alpha"]);
        assert_eq!(template.resource("Alpha").map(|r| r.kind.as_str()), Some("AWS::SQS::Queue"));
    }
}
