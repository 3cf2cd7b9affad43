//! CLI configuration
//!
//! Settings live in a TOML file under the user config directory. Command
//! line flags take precedence over anything set here.

use std::path::{Path, PathBuf};

use anyhow::Context;
use docwarden_core::limits::{DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};
use serde::{Deserialize, Serialize};

/// Overrides the config file location
pub const CONFIG_ENV: &str = "DOCWARDEN_CONFIG";

const KEYS: &[&str] = &[
    "data_dir",
    "default_collection",
    "error_log",
    "min_length",
    "max_length",
];

/// Path of the config file
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docwarden")
        .join("config.toml")
}

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docwarden")
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub default_collection: String,
    /// Maintenance failures are appended here; defaults to a file in the data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_log: Option<PathBuf>,
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_collection: docwarden_mcp::server::DEFAULT_COLLECTION.to_string(),
            error_log: None,
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults when it is missing or broken
    pub fn load() -> Self {
        let path = config_file_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config file {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn keys() -> &'static [&'static str] {
        KEYS
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "data_dir" => self
                .data_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "default_collection" => self.default_collection.clone(),
            "error_log" => self
                .error_log
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "min_length" => self.min_length.to_string(),
            "max_length" => self.max_length.to_string(),
            _ => return None,
        };
        Some(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "data_dir" => self.data_dir = non_empty_path(value),
            "default_collection" => {
                docwarden_core::limits::validate_collection_name(value)?;
                self.default_collection = value.to_string();
            }
            "error_log" => self.error_log = non_empty_path(value),
            "min_length" => self.min_length = parse_length(key, value)?,
            "max_length" => self.max_length = parse_length(key, value)?,
            _ => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                key,
                KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Data directory, honoring an explicit override
    pub fn resolve_data_dir(&self, flag: Option<&str>) -> PathBuf {
        flag.map(PathBuf::from)
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(default_data_dir)
    }

    pub fn resolve_error_log(&self, data_dir: &Path) -> PathBuf {
        self.error_log
            .clone()
            .unwrap_or_else(|| data_dir.join("maintenance_errors.log"))
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

fn parse_length(key: &str, value: &str) -> anyhow::Result<usize> {
    value
        .parse()
        .with_context(|| format!("{} must be a non-negative integer, got '{}'", key, value))
}
