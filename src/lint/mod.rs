//! Lint pass for detecting dangling logical names in templates.
//!
//! Runs over the encoded form of every condition, resource and output and
//! reports names that nothing in the template declares. A template with
//! warnings still encodes; whether they matter is up to the caller.

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::codec::placeholder::placeholders;
use crate::codec::{single_entry, GET_ATT, REF};
use crate::template::{Category, Template};
use crate::token::{Intrinsic, Literal};

/// Prefix of the names the service defines for every stack
const PSEUDO_PARAMETER_PREFIX: &str = "AWS::";

/// A lint warning about a name that does not resolve
#[derive(Debug, Clone, PartialEq)]
pub struct LintWarning {
    pub category: LintCategory,
    /// Dotted document path of the offending value, e.g. `Resources.Web.Properties`
    pub location: String,
    pub message: String,
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.category, self.location, self.message)
    }
}

/// Category of lint defect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintCategory {
    /// `Ref` or `DependsOn` naming nothing declared
    Reference,
    /// `Fn::GetAtt` on a resource that does not exist
    Attribute,
    /// A condition name that is not declared
    Condition,
    /// `Fn::FindInMap` on a missing mapping or key
    Mapping,
    /// A `Fn::Sub` placeholder that resolves to nothing
    Substitution,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::Reference => write!(f, "reference"),
            LintCategory::Attribute => write!(f, "attribute"),
            LintCategory::Condition => write!(f, "condition"),
            LintCategory::Mapping => write!(f, "mapping"),
            LintCategory::Substitution => write!(f, "substitution"),
        }
    }
}

/// Run all lint checks on a template.
pub fn check(template: &Template) -> Vec<LintWarning> {
    let mut linter = Linter {
        template,
        warnings: Vec::new(),
    };

    for condition in &template.conditions {
        let location = format!("Conditions.{}", condition.name);
        linter.walk(&condition.expression.to_value(), &location, true);
    }

    for resource in &template.resources {
        let location = format!("Resources.{}", resource.name);
        if let Some(condition) = &resource.condition {
            linter.check_condition(condition, &location);
        }
        for dependency in &resource.depends_on {
            if !template.contains(Category::Resources, dependency) {
                linter.warn(
                    LintCategory::Reference,
                    &location,
                    format!("depends on undeclared resource '{}'", dependency),
                );
            }
        }
        linter.walk(
            &resource.properties.to_value(),
            &format!("{}.Properties", location),
            false,
        );
    }

    for output in &template.outputs {
        let location = format!("Outputs.{}", output.name);
        if let Some(condition) = &output.condition {
            linter.check_condition(condition, &location);
        }
        linter.walk(&output.value.to_value(), &location, false);
        if let Some(export) = &output.export {
            linter.walk(&export.to_value(), &location, false);
        }
    }

    linter.warnings
}

struct Linter<'a> {
    template: &'a Template,
    warnings: Vec<LintWarning>,
}

impl Linter<'_> {
    fn warn(&mut self, category: LintCategory, location: &str, message: String) {
        self.warnings.push(LintWarning {
            category,
            location: location.to_string(),
            message,
        });
    }

    fn is_referable(&self, name: &str) -> bool {
        name.starts_with(PSEUDO_PARAMETER_PREFIX)
            || self.template.contains(Category::Parameters, name)
            || self.template.contains(Category::Resources, name)
    }

    fn check_condition(&mut self, name: &str, location: &str) {
        if !self.template.contains(Category::Conditions, name) {
            self.warn(
                LintCategory::Condition,
                location,
                format!("undeclared condition '{}'", name),
            );
        }
    }

    fn check_resource(&mut self, category: LintCategory, resource: &str, location: &str) {
        if !self.template.contains(Category::Resources, resource) {
            self.warn(
                category,
                location,
                format!("attribute of undeclared resource '{}'", resource),
            );
        }
    }

    /// `conditions` is set inside condition expressions, where a bare
    /// `{"Condition": name}` object refers to another condition
    fn walk(&mut self, value: &Value, location: &str, conditions: bool) {
        match value {
            Value::Array(items) => {
                for item in items {
                    self.walk(item, location, conditions);
                }
            }
            Value::Object(map) => {
                if let Some((key, operand)) = single_entry(map) {
                    self.visit_call(key, operand, location, conditions);
                }
                for nested in map.values() {
                    self.walk(nested, location, conditions);
                }
            }
            _ => {}
        }
    }

    fn visit_call(&mut self, key: &str, operand: &Value, location: &str, conditions: bool) {
        match key {
            REF => {
                if let Some(name) = operand.as_str() {
                    if !self.is_referable(name) {
                        self.warn(
                            LintCategory::Reference,
                            location,
                            format!("reference to undeclared '{}'", name),
                        );
                    }
                }
            }
            GET_ATT => {
                let resource = match operand {
                    Value::Array(items) => items.first().and_then(Value::as_str),
                    Value::String(dotted) => dotted.split_once('.').map(|(r, _)| r),
                    _ => None,
                };
                if let Some(resource) = resource {
                    self.check_resource(LintCategory::Attribute, resource, location);
                }
            }
            Intrinsic::IF => {
                if let Some(name) = operand.get(0).and_then(Value::as_str) {
                    self.check_condition(name, location);
                }
            }
            Intrinsic::CONDITION if conditions => {
                if let Some(name) = operand.as_str() {
                    self.check_condition(name, location);
                }
            }
            Intrinsic::FIND_IN_MAP => self.check_find_in_map(operand, location),
            Intrinsic::SUB => self.check_sub(operand, location),
            _ => {}
        }
    }

    fn check_find_in_map(&mut self, operand: &Value, location: &str) {
        let Some(name) = operand.get(0).and_then(Value::as_str) else {
            return;
        };
        let template = self.template;
        let Some(mapping) = template.mappings.iter().find(|m| m.name == name) else {
            self.warn(
                LintCategory::Mapping,
                location,
                format!("undeclared mapping '{}'", name),
            );
            return;
        };

        // Keys given as tokens are only known at deployment time
        let top_key = operand.get(1).and_then(Value::as_str);
        let second_key = operand.get(2).and_then(Value::as_str);
        let message = match (top_key, second_key) {
            (Some(top), _) if !mapping.entries.contains_key(top) => {
                format!("mapping '{}' has no key '{}'", name, top)
            }
            (Some(top), Some(second)) if mapping.get(top, second).is_none() => {
                format!("mapping '{}' has no key '{}.{}'", name, top, second)
            }
            _ => return,
        };
        self.warn(LintCategory::Mapping, location, message);
    }

    fn check_sub(&mut self, operand: &Value, location: &str) {
        let (template, variables) = match operand {
            Value::String(template) => (template.as_str(), HashSet::new()),
            Value::Array(items) => match items.as_slice() {
                [Value::String(template), Value::Object(variables)] => (
                    template.as_str(),
                    variables.keys().map(String::as_str).collect(),
                ),
                _ => return,
            },
            _ => return,
        };

        for placeholder in placeholders(template) {
            if variables.contains(placeholder.name) {
                continue;
            }
            let target = placeholder.target();
            let resolves = if placeholder.is_attribute() {
                self.template.contains(Category::Resources, target)
            } else {
                self.is_referable(target)
            };
            if !resolves {
                self.warn(
                    LintCategory::Substitution,
                    location,
                    format!("placeholder '${{{}}}' names nothing declared", placeholder.name),
                );
            }
        }
    }
}
