//! Error types for decoding documents into the template model

use thiserror::Error;

/// Errors that can occur while decoding a document value
#[derive(Error, Debug)]
pub enum CodecError {
    /// A value does not match its expected external encoding
    #[error("format error in {context}: {message}")]
    Format { context: String, message: String },

    /// An object that should have been a single-key reference or intrinsic
    /// form matched none of them
    #[error("unrecognized value in {context}: object with keys [{}]", keys.join(", "))]
    UnrecognizedVariant { context: String, keys: Vec<String> },

    /// The input text was not valid JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Create a format error
    pub fn format(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an unrecognized variant error from the keys of the offending object
    pub fn unrecognized<'a>(
        context: impl Into<String>,
        keys: impl IntoIterator<Item = &'a String>,
    ) -> Self {
        Self::UnrecognizedVariant {
            context: context.into(),
            keys: keys.into_iter().cloned().collect(),
        }
    }

    /// Prefix the error context with an enclosing location, e.g. `Resources.Web`
    pub fn within(self, outer: &str) -> Self {
        match self {
            Self::Format { context, message } => Self::Format {
                context: join_context(outer, &context),
                message,
            },
            Self::UnrecognizedVariant { context, keys } => Self::UnrecognizedVariant {
                context: join_context(outer, &context),
                keys,
            },
            other => other,
        }
    }

    /// Where in the document the error was detected, if known
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Format { context, .. } | Self::UnrecognizedVariant { context, .. } => {
                Some(context)
            }
            Self::Json(_) => None,
        }
    }
}

fn join_context(outer: &str, inner: &str) -> String {
    if inner.is_empty() {
        outer.to_string()
    } else {
        format!("{}.{}", outer, inner)
    }
}
