//! Tool configuration, read from a TOML file.
//!
//! ```toml
//! [explorer]
//! sample_size = 3
//! include_variations = false
//!
//! [writer]
//! line_width = 0
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use game_tree::{AggregateConfig, WriterOptions};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "pgn_tool.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub explorer: AggregateConfig,
    pub writer: WriterOptions,
}

impl ToolConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Aggregation settings, with a command-line sample size taking
    /// precedence over the file.
    pub fn explorer_config(&self, sample: Option<usize>) -> AggregateConfig {
        AggregateConfig {
            sample_size: sample.unwrap_or(self.explorer.sample_size),
            ..self.explorer.clone()
        }
    }

    /// An explicit path must exist; otherwise the default file is used if
    /// present, and built-in defaults if not.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
