//! Registry settings, loadable from TOML

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Settings loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Behaviour switches for a [`BeanRegistry`](crate::BeanRegistry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Whether registering a name twice replaces the earlier definition
    pub allow_definition_overriding: bool,
    pub placeholder_prefix: String,
    pub placeholder_suffix: String,
    /// Separates a placeholder key from its default value
    pub value_separator: String,
    /// Leave unknown placeholders in place instead of failing
    pub ignore_unresolvable_placeholders: bool,
    /// Values substituted for placeholders
    pub properties: BTreeMap<String, String>,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            allow_definition_overriding: true,
            placeholder_prefix: "${".to_string(),
            placeholder_suffix: "}".to_string(),
            value_separator: ":".to_string(),
            ignore_unresolvable_placeholders: false,
            properties: BTreeMap::new(),
        }
    }
}

impl ContainerSettings {
    /// Parse and validate settings from TOML text
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let settings: ContainerSettings =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serialize the settings as TOML
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Add a placeholder property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Check that the placeholder delimiters are usable
    pub fn validate(&self) -> ConfigResult<()> {
        if self.placeholder_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "Placeholder prefix must not be empty".to_string(),
            ));
        }
        if self.placeholder_suffix.is_empty() {
            return Err(ConfigError::Validation(
                "Placeholder suffix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
