//! Configuration management for the iotgraph CLI
//!
//! Loaded from `<config_dir>/iotgraph/config.toml`. A `--database` flag or
//! `IOTGRAPH_DATABASE` takes precedence over the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use topology::AnalysisConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// SQLite file; falls back to the shared asset directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Every key accepted by [`Config::get`] and [`Config::set`]
    pub const KEYS: &'static [&'static str] = &[
        "database.path",
        "analysis.low_centrality_threshold",
        "analysis.high_centrality_threshold",
        "analysis.stale_after_hours",
        "analysis.recent_reports_limit",
    ];

    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("iotgraph")
            .join("config.toml")
    }

    /// Load configuration from `path`, or return defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        config
            .analysis
            .validate()
            .with_context(|| format!("checking {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the database file: explicit override, then config, then asset dir
    pub fn database_path(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = override_path {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        utils::assets::database_path().context("resolving default database location")
    }

    /// Get a configuration value by key path (e.g., "analysis.stale_after_hours")
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["database", "path"] => self.database.path.as_ref().map(|p| p.display().to_string()),
            ["analysis", "low_centrality_threshold"] => {
                Some(self.analysis.low_centrality_threshold.to_string())
            }
            ["analysis", "high_centrality_threshold"] => {
                Some(self.analysis.high_centrality_threshold.to_string())
            }
            ["analysis", "stale_after_hours"] => Some(self.analysis.stale_after_hours.to_string()),
            ["analysis", "recent_reports_limit"] => {
                Some(self.analysis.recent_reports_limit.to_string())
            }
            _ => None,
        }
    }

    /// Set a configuration value by key path
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        let invalid = || format!("invalid value for {}: {}", key, value);
        let previous = self.clone();

        match parts.as_slice() {
            ["database", "path"] => self.database.path = Some(PathBuf::from(value)),
            ["analysis", "low_centrality_threshold"] => {
                self.analysis.low_centrality_threshold = value.parse().with_context(invalid)?
            }
            ["analysis", "high_centrality_threshold"] => {
                self.analysis.high_centrality_threshold = value.parse().with_context(invalid)?
            }
            ["analysis", "stale_after_hours"] => {
                self.analysis.stale_after_hours = value.parse().with_context(invalid)?
            }
            ["analysis", "recent_reports_limit"] => {
                self.analysis.recent_reports_limit = value.parse().with_context(invalid)?
            }
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }

        if let Err(e) = self.analysis.validate() {
            *self = previous;
            return Err(e.into());
        }
        Ok(())
    }
}
