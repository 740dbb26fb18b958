//! Configuration for template rendering

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration or message files
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// How the variable name is reflected on a bound component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentIdMode {
    /// Leave the component untouched
    #[default]
    None,
    /// Pass the name to [`Component::set_object_name`](crate::Component::set_object_name)
    SetObjectName,
    /// Use the name as the component id
    ///
    /// Two templates binding the same name then produce duplicate ids.
    SetId,
}

/// Configuration options for rendering
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Written before the name of an unresolved variable
    pub unresolved_prefix: String,

    /// Written after the name of an unresolved variable
    pub unresolved_suffix: String,

    /// Upper bound on iterations of a single `while` expansion
    pub max_while_iterations: usize,

    /// Upper bound on nested `block`/`while` expansions
    pub max_block_depth: usize,

    pub component_id_mode: ComponentIdMode,

    /// Rewrite anchors to internal paths (`href="#/..."`)
    pub encode_internal_paths: bool,

    /// Encode internal paths in the template text before resolution,
    /// rather than in the output after it
    pub encode_template_text: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            unresolved_prefix: "??".to_string(),
            unresolved_suffix: "??".to_string(),
            max_while_iterations: 1000,
            max_block_depth: 64,
            component_id_mode: ComponentIdMode::None,
            encode_internal_paths: false,
            encode_template_text: true,
        }
    }
}

impl TemplateConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string; missing keys take defaults
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the marker written around unresolved variable names
    pub fn with_unresolved_marker(
        mut self,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        self.unresolved_prefix = prefix.into();
        self.unresolved_suffix = suffix.into();
        self
    }

    /// Set the `while` iteration cap
    pub fn with_max_while_iterations(mut self, max: usize) -> Self {
        self.max_while_iterations = max;
        self
    }

    /// Set the macro block nesting cap
    pub fn with_max_block_depth(mut self, depth: usize) -> Self {
        self.max_block_depth = depth;
        self
    }

    pub fn with_component_id_mode(mut self, mode: ComponentIdMode) -> Self {
        self.component_id_mode = mode;
        self
    }

    /// Enable or disable internal path encoding
    pub fn with_internal_path_encoding(mut self, enabled: bool) -> Self {
        self.encode_internal_paths = enabled;
        self
    }

    /// Choose whether internal paths are encoded before or after resolution
    pub fn with_encode_template_text(mut self, on: bool) -> Self {
        self.encode_template_text = on;
        self
    }
}
