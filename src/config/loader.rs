//! Config file loader (TOML).

use crate::error::ConfigError;
use crate::models::SdkSelection;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk overrides. Every key is optional; relative paths are resolved
/// against the base directory when applied.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub source_dir: Option<PathBuf>,
    pub eigen_include_dir: Option<PathBuf>,
    pub build_dir: Option<PathBuf>,
    pub install_dir: Option<PathBuf>,
    pub toolchain_file: Option<PathBuf>,
    pub archs: Option<Vec<String>>,
    pub min_os_version: Option<String>,
    pub sdk_platform: Option<String>,
    pub sdk_selection: Option<SdkSelection>,
    pub install: Option<bool>,
    pub inject_toolchain_env: Option<bool>,
    /// Sorted by key, so the rendered define order is stable across runs
    pub compiler_defines: Option<BTreeMap<String, toml::Value>>,
}

/// Parse config content from a string.
pub fn parse_config_str(content: &str) -> Result<ConfigFile, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load config from a TOML file.
pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    validate_config_path(path)?;

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(format!(
                "Configuration file not found at: {}",
                path.display()
            ))
        } else {
            ConfigError::IoError(e)
        }
    })?;

    log::debug!("[Config] Loaded overrides from {}", path.display());
    parse_config_str(&content)
}

/// Validate config path (.toml extension required).
pub fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "Configuration path cannot be empty".to_string(),
        ));
    }

    match path.extension() {
        Some(ext) if ext == "toml" => Ok(()),
        Some(ext) => Err(ConfigError::ValidationFailed(format!(
            "Configuration file must have .toml extension, got .{}",
            ext.to_string_lossy()
        ))),
        None => Err(ConfigError::ValidationFailed(
            "Configuration file must have .toml extension".to_string(),
        )),
    }
}

/// Scalar define values are rendered verbatim; tables and arrays are rejected.
pub(crate) fn define_value_to_string(key: &str, value: &toml::Value) -> Result<String, ConfigError> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(if *b { "ON" } else { "OFF" }.to_string()),
        other => Err(ConfigError::ValidationFailed(format!(
            "Define '{}' must be a string, number or boolean, got {}",
            key,
            other.type_str()
        ))),
    }
}
