//! Error types for template composition

use thiserror::Error;

use super::entity::Category;

/// Errors that can occur while combining or validating templates
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// Two entities in one category share a logical name
    #[error("duplicate logical name '{name}' in {category}")]
    DuplicateLogicalName { category: Category, name: String },
}

impl TemplateError {
    /// Create a duplicate logical name error
    pub fn duplicate(category: Category, name: impl Into<String>) -> Self {
        Self::DuplicateLogicalName {
            category,
            name: name.into(),
        }
    }
}
