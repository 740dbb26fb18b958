//! Message bundles for localized strings and macro blocks
//!
//! A bundle is a TOML file with a `[messages]` table. Values are template text
//! themselves when used as macro blocks through `${block:key}`.
//!
//! ```toml
//! [metadata]
//! locale = "en"
//!
//! [messages]
//! greeting = "Hello"
//! form-field = '<div class="control-group">${{1}-info}</div>'
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::component::Localizer;
use crate::config::ConfigError;

/// Messages keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageBundle {
    /// Optional locale tag
    pub locale: Option<String>,
    pub messages: HashMap<String, String>,
}

/// TOML structure for deserializing bundles
#[derive(Deserialize)]
struct TomlBundle {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    messages: HashMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    locale: Option<String>,
}

impl MessageBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a bundle from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a bundle from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlBundle = toml::from_str(content)?;

        Ok(MessageBundle {
            locale: parsed.metadata.and_then(|m| m.locale),
            messages: parsed.messages,
        })
    }

    /// Add or replace a message
    pub fn with_message(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.messages.insert(key.into(), value.into());
        self
    }
}

impl Localizer for MessageBundle {
    fn translate(&self, key: &str) -> Option<String> {
        self.messages.get(key).cloned()
    }
}
