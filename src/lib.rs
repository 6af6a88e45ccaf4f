//! Stackform - typed construction of infrastructure-as-code templates
//!
//! This library provides a token algebra for deployment-time values, a
//! template model with an associative merge, and a codec to and from the
//! JSON document format understood by the provisioning service.
//!
//! # Example
//!
//! ```rust
//! use stackform::{render, Output, Parameter, Resource, Template, Token};
//!
//! let template = Template::empty()
//!     .with_parameter(Parameter::string("Stage"))
//!     .with_resource(
//!         Resource::new("Logs", "AWS::S3::Bucket")
//!             .with_property("BucketName", Token::join("-", ["logs".into(), Token::reference("Stage")])),
//!     )
//!     .with_output(Output::new("LogsArn", Token::<String>::attribute("Logs", "Arn")));
//!
//! let json = render(&template).unwrap();
//! assert!(json.contains("\"Fn::Join\""));
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod lint;
pub mod template;
pub mod token;

pub use codec::{from_document, to_document, to_document_with};
pub use config::{ConfigError, RenderConfig};
pub use error::CodecError;
pub use lint::{LintCategory, LintWarning};
pub use template::{
    collapse, merge, Category, Condition, DeletionPolicy, Entity, Mapping, Output, Parameter,
    Resource, Template, TemplateError,
};
pub use token::{interpolate, lift, Intrinsic, List, Literal, Record, Timestamp, Token, TokenError};

use thiserror::Error;

/// Errors that can occur while rendering a template to text
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template itself is invalid
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// The document could not be produced
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl From<serde_json::Error> for RenderError {
    fn from(error: serde_json::Error) -> Self {
        RenderError::Codec(CodecError::Json(error))
    }
}

/// Render a template to JSON text with default configuration
///
/// This is the main entry point for the library. It checks the template for
/// duplicate logical names, encodes it and serializes the document.
pub fn render(template: &Template) -> Result<String, RenderError> {
    render_with_config(template, RenderConfig::default())
}

/// Render a template to JSON text with custom configuration
///
/// # Example
///
/// ```rust
/// use stackform::{render_with_config, RenderConfig, Resource, Template};
///
/// let config = RenderConfig::new()
///     .with_pretty(false)
///     .with_default_format_version("2010-09-09");
///
/// let template = Template::from_entity(Resource::new("Topic", "AWS::SNS::Topic"));
/// let json = render_with_config(&template, config).unwrap();
/// assert_eq!(
///     json,
///     r#"{"AWSTemplateFormatVersion":"2010-09-09","Resources":{"Topic":{"Type":"AWS::SNS::Topic"}}}"#
/// );
/// ```
pub fn render_with_config(template: &Template, config: RenderConfig) -> Result<String, RenderError> {
    if config.lint {
        for warning in lint::check(template) {
            tracing::warn!(%warning, "lint");
        }
    }
    serialize(template, &config)
}

/// Render a template and return the lint warnings alongside the text
///
/// Linting runs regardless of `config.lint`; warnings never make rendering fail.
pub fn render_with_lint(
    template: &Template,
    config: RenderConfig,
) -> Result<(String, Vec<LintWarning>), RenderError> {
    let text = serialize(template, &config)?;
    let warnings = lint::check(template);
    for warning in &warnings {
        tracing::warn!(%warning, "lint");
    }
    Ok((text, warnings))
}

fn serialize(template: &Template, config: &RenderConfig) -> Result<String, RenderError> {
    let document = to_document_with(template, config)?;
    let text = if config.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(text)
}

/// Parse JSON text into a template
pub fn parse(source: &str) -> Result<Template, CodecError> {
    let document: serde_json::Value = serde_json::from_str(source)?;
    from_document(&document)
}
