use super::types::*;
use crate::error_handling::types::ConfigError;
use clap::Parser;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Command-line arguments of the `igd-primitives` flow runner.
///
/// # Fields Overview
///
/// - `flow_file`: TOML file describing the initial variables and the steps to run
/// - `config`: optional configuration file, see [`Config`]
/// - `simulate`: run against an in-memory gateway instead of the network
/// - `log_level`: overrides the configured level
#[derive(Parser, Debug, Clone)]
#[command(name = "igd-primitives")]
#[command(version)]
#[command(about = "Runs UPnP IGD port-control primitives from a flow file")]
pub struct Args {
    /// Flow file to execute
    pub flow_file: PathBuf,

    /// Configuration file
    ///
    /// # Command Line
    /// Use `--config <PATH>` or the `IGD_PRIMITIVES_CONFIG` environment variable
    #[arg(long, env = "IGD_PRIMITIVES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use a simulated gateway
    ///
    /// # Command Line
    /// Use `--simulate`. This is a boolean flag that doesn't take a value
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub simulate: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Application configuration loaded from a TOML file.
///
/// Every section is optional; an empty file yields [`Config::default`].
///
/// ```toml
/// log_level = "debug"
///
/// [discovery]
/// delay_ms = 500
///
/// [mapping]
/// description = "lab mapping"
/// ```
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub discovery: DiscoveryConfig,
    pub mapping: MappingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            discovery: DiscoveryConfig::default(),
            mapping: MappingConfig::default(),
        }
    }
}

impl Config {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    /// - `ConfigError::IoError` if the file cannot be read
    /// - `ConfigError::TomlError` if it is not valid TOML for this structure
    /// - `ConfigError::NotInRange` if a value fails validation
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=60_000).contains(&self.discovery.delay_ms) {
            return Err(ConfigError::NotInRange(format!(
                "discovery.delay_ms must be between 1 and 60000, got {}",
                self.discovery.delay_ms
            )));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::NotInRange(format!("unknown log level `{}`", self.log_level)))
    }
}
