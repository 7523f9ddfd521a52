//! Editor settings loaded from TOML.
//!
//! ```toml
//! [history]
//! max_undo = 200
//!
//! [naming]
//! default_base = "Node"
//! ```
//!
//! Every key is optional.

use hax_core::abstract_editor::DEFAULT_MAX_UNDO;
use serde::Deserialize;

use crate::naming::DEFAULT_BASE_NAME;

/// Errors raised while reading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse editor settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("history.max_undo must be 0 or more, got {0}")]
    NegativeUndoCapacity(i64),
    #[error("naming.default_base must not be empty")]
    EmptyDefaultBase,
}

/// Top-level editor settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub naming: NamingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Undo steps kept; `0` disables undo.
    pub max_undo: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Name prefix used when a definition has no declaration name.
    pub default_base: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            default_base: DEFAULT_BASE_NAME.into(),
        }
    }
}

impl EditorConfig {
    /// Parses and validates settings.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.max_undo < 0 {
            return Err(ConfigError::NegativeUndoCapacity(self.history.max_undo));
        }
        if self.naming.default_base.is_empty() {
            return Err(ConfigError::EmptyDefaultBase);
        }
        Ok(())
    }
}
