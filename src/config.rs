//! Configuration for rendering templates to documents

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a render configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Options controlling how a template becomes a document
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Indent the JSON output
    pub pretty: bool,

    /// `AWSTemplateFormatVersion` to emit when the template sets none
    pub default_format_version: Option<String>,

    /// Emit `Parameters`, `Conditions`, `Mappings` and `Outputs` even when empty
    pub empty_sections: bool,

    /// Evaluate intrinsics whose operands are all literal
    pub fold_constants: bool,

    /// Collect reference warnings while rendering
    pub lint: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            default_format_version: None,
            empty_sections: false,
            fold_constants: false,
            lint: false,
        }
    }
}

/// TOML structure for deserializing render configuration
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    output: Option<TomlOutput>,
    passes: Option<TomlPasses>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlOutput {
    pretty: Option<bool>,
    default_format_version: Option<String>,
    empty_sections: Option<bool>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlPasses {
    fold_constants: Option<bool>,
    lint: Option<bool>,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(output) = parsed.output {
            if let Some(pretty) = output.pretty {
                config.pretty = pretty;
            }
            if output.default_format_version.is_some() {
                config.default_format_version = output.default_format_version;
            }
            if let Some(empty_sections) = output.empty_sections {
                config.empty_sections = empty_sections;
            }
        }

        if let Some(passes) = parsed.passes {
            if let Some(fold_constants) = passes.fold_constants {
                config.fold_constants = fold_constants;
            }
            if let Some(lint) = passes.lint {
                config.lint = lint;
            }
        }

        Ok(config)
    }

    /// Set whether to pretty-print output
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Set the format version used when a template has none
    pub fn with_default_format_version(mut self, version: impl Into<String>) -> Self {
        self.default_format_version = Some(version.into());
        self
    }

    /// Set whether empty optional sections are emitted
    pub fn with_empty_sections(mut self, empty_sections: bool) -> Self {
        self.empty_sections = empty_sections;
        self
    }

    /// Enable or disable constant folding
    pub fn with_fold_constants(mut self, fold: bool) -> Self {
        self.fold_constants = fold;
        self
    }

    /// Enable or disable reference linting
    pub fn with_lint(mut self, lint: bool) -> Self {
        self.lint = lint;
        self
    }
}
