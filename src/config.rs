use crate::error::HedError;
use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

/// Switches for a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Report warnings as well as errors.
    pub check_for_warnings: bool,
    /// Accept `#` placeholders in values, as sidecar templates use them.
    pub allow_placeholders: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            check_for_warnings: true,
            allow_placeholders: false,
        }
    }
}

impl ValidatorConfig {
    pub fn with_placeholders(mut self) -> Self {
        self.allow_placeholders = true;
        self
    }

    pub fn errors_only(mut self) -> Self {
        self.check_for_warnings = false;
        self
    }
}

/// Prefix prepended to every tag of one column when validating tabular rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPrefix {
    /// Zero-based column index.
    pub column: usize,
    pub prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HedConfig {
    pub schema: Option<PathBuf>,
    pub validation: ValidatorConfig,
    pub column_prefixes: Vec<ColumnPrefix>,
}

pub trait ConfigProvider: Send + Sync {
    fn load(&self) -> Result<HedConfig, HedError>;
    fn save(&self, config: &HedConfig) -> Result<(), HedError>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        TomlConfigProvider { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn load(&self) -> Result<HedConfig, HedError> {
        tracing::debug!("Attempting to read config from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(HedConfig::default());
        }
        let content = get_content(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn save(&self, config: &HedConfig) -> Result<(), HedError> {
        tracing::debug!("Attempting to write config to: {:?}", &self.path);
        let toml_string = toml::to_string(config)?;
        write(&self.path, toml_string)?;
        Ok(())
    }
}

pub fn get_content<P: AsRef<Path>>(path: P) -> Result<String, HedError> {
    tracing::debug!("Reading {:?}", path.as_ref());
    Ok(read_to_string(path)?)
}
