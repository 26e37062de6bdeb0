//! Configuration file loading

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cai2hcl_core::ConvertOptions;
use serde::{Deserialize, Serialize};

/// Contents of a `cai2hcl.toml` file
///
/// ```toml
/// schemas = "extra-schemas.yaml"
///
/// [convert]
/// strict = true
/// max_workers = 4
/// iam_style = "member"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Conversion options
    pub convert: ConvertOptions,
    /// Extra schema document overriding built-in kinds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<PathBuf>,
}

impl CliConfig {
    /// Loads configuration from a file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parses configuration text
    ///
    /// # Errors
    ///
    /// Fails on invalid TOML or unknown option values.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
