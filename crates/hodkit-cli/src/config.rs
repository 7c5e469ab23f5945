//! Tool configuration
//!
//! Settings come from an optional JSON file and are then overridden by flags.

use std::path::Path;

use anyhow::{Context, Result};
use hodkit_format::DecodeConfig;
use hodkit_geometry::RestartCapability;
use serde::{Deserialize, Serialize};

/// Settings for a `hodkit` run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Decoder settings
    pub decode: DecodeConfig,
    /// Restart support of the target renderer
    pub restart: RestartCapability,
}

impl ToolConfig {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
