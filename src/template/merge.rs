//! Combining independently built template fragments

use std::collections::HashSet;

use super::entity::NamedEntity;
use super::error::TemplateError;
use super::Template;

/// Combine two templates into one
///
/// Each category is `a`'s entities followed by `b`'s. Any logical name that
/// then appears twice in one category is an error, even when both
/// definitions are identical. For the scalar slots, a value set on `b`
/// replaces the one on `a`.
///
/// Merging is associative and [`Template::empty`] is its identity, so any
/// number of fragments can be folded left to right.
pub fn merge(a: Template, b: Template) -> Result<Template, TemplateError> {
    let Template {
        format_version,
        description,
        mut parameters,
        mut conditions,
        mut mappings,
        mut resources,
        mut outputs,
    } = a;

    parameters.extend(b.parameters);
    conditions.extend(b.conditions);
    mappings.extend(b.mappings);
    resources.extend(b.resources);
    outputs.extend(b.outputs);

    let merged = Template {
        format_version: b.format_version.or(format_version),
        description: b.description.or(description),
        parameters,
        conditions,
        mappings,
        resources,
        outputs,
    };
    merged.validate()?;

    tracing::debug!(
        parameters = merged.parameters.len(),
        conditions = merged.conditions.len(),
        mappings = merged.mappings.len(),
        resources = merged.resources.len(),
        outputs = merged.outputs.len(),
        "merged templates"
    );

    Ok(merged)
}

/// Merge a sequence of optional fragments, treating absent ones as empty
pub fn collapse(
    fragments: impl IntoIterator<Item = Option<Template>>,
) -> Result<Template, TemplateError> {
    fragments
        .into_iter()
        .flatten()
        .try_fold(Template::empty(), merge)
}

/// Fail on the first logical name that repeats within one category
pub(crate) fn check_unique<E: NamedEntity>(entities: &[E]) -> Result<(), TemplateError> {
    let mut seen = HashSet::new();
    for entity in entities {
        let name = entity.logical_name();
        if !seen.insert(name) {
            return Err(TemplateError::duplicate(E::CATEGORY, name));
        }
    }
    Ok(())
}
