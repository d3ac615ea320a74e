//! Configuration file support for restore-graph.
//!
//! Provides YAML-based configuration through `restore-graph.config.yml` files,
//! including data structures, file loading, and validation.

use anyhow::{bail, Context};
use msbuild_restore_graph::application::dto::RunMode;
use msbuild_restore_graph::shared::Result;
use serde::Deserialize;
use serde_yaml_ng::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

use crate::cli::LogFormat;

pub const CONFIG_FILENAME: &str = "restore-graph.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub mode: Option<String>,
    pub log_format: Option<String>,
    pub max_parallelism: Option<usize>,
    /// Scalar values; booleans and numbers are taken as written
    pub global_properties: Option<BTreeMap<String, Value>>,
    pub options: Option<BTreeMap<String, Value>>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, Value>,
}

impl ConfigFile {
    pub fn run_mode(&self) -> Option<RunMode> {
        self.mode.as_deref().and_then(|mode| RunMode::from_str(mode).ok())
    }

    pub fn log_format(&self) -> Option<LogFormat> {
        self.log_format
            .as_deref()
            .and_then(|format| LogFormat::from_str(format).ok())
    }

    pub fn global_properties(&self) -> BTreeMap<String, String> {
        scalar_map(self.global_properties.as_ref())
    }

    pub fn options(&self) -> BTreeMap<String, String> {
        scalar_map(self.options.as_ref())
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

fn scalar_map(values: Option<&BTreeMap<String, Value>>) -> BTreeMap<String, String> {
    values
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| scalar_to_string(value).map(|value| (key.clone(), value)))
        .collect()
}

/// Options bag read from stdin when `--options-from-stdin` is given.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StdinOptions {
    #[serde(default)]
    pub global_properties: BTreeMap<String, String>,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// Parses the stdin options document.
pub fn parse_stdin_options(content: &str) -> Result<StdinOptions> {
    if content.trim().is_empty() {
        return Ok(StdinOptions::default());
    }
    serde_json::from_str(content).context(
        "Failed to parse options from stdin\n\n💡 Hint: Expected {\"globalProperties\": {..}, \"options\": {..}} with string values.",
    )
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(mode) = config.mode.as_deref() {
        if let Err(message) = RunMode::from_str(mode) {
            bail!("Invalid config: {}\n\n💡 Hint: Use 'mode: restore' or 'mode: generate-graph'.", message);
        }
    }
    if let Some(format) = config.log_format.as_deref() {
        if let Err(message) = LogFormat::from_str(format) {
            bail!("Invalid config: {}\n\n💡 Hint: Use 'log_format: json' or 'log_format: text'.", message);
        }
    }
    if config.max_parallelism == Some(0) {
        bail!("Invalid config: max_parallelism must be at least 1.\n\n💡 Hint: Remove the field to use the number of logical CPUs.");
    }
    for (section, values) in [
        ("global_properties", &config.global_properties),
        ("options", &config.options),
    ] {
        for (key, value) in values.iter().flatten() {
            if scalar_to_string(value).is_none() {
                bail!(
                    "Invalid config: {}.{} must be a string, number or boolean.\n\n\
                     💡 Hint: Join list values with ';' as MSBuild does (e.g., \"a;b\").",
                    section,
                    key
                );
            }
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
///
/// Called once logging is initialized, since the log format itself may come
/// from the config file.
pub fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        warn!(field = %key, "Unknown config field '{}' will be ignored", key);
    }
}
