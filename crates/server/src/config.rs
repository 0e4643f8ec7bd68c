use std::path::PathBuf;

use thiserror::Error;
use topology::{AnalysisConfig, AnalysisConfigError};
use utils::assets::database_path;

const HOST_ENV: &str = "IOTGRAPH_HOST";
const PORT_ENV: &str = "IOTGRAPH_PORT";
const DATABASE_ENV: &str = "IOTGRAPH_DATABASE";
const LOW_CENTRALITY_ENV: &str = "IOTGRAPH_LOW_CENTRALITY";
const HIGH_CENTRALITY_ENV: &str = "IOTGRAPH_HIGH_CENTRALITY";
const STALE_HOURS_ENV: &str = "IOTGRAPH_STALE_HOURS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error(transparent)]
    Analysis(#[from] AnalysisConfigError),
    #[error("cannot resolve database path: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database: PathBuf,
    pub analysis: AnalysisConfig,
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut analysis = AnalysisConfig::default();
        if let Some(v) = parse(&lookup, LOW_CENTRALITY_ENV)? {
            analysis.low_centrality_threshold = v;
        }
        if let Some(v) = parse(&lookup, HIGH_CENTRALITY_ENV)? {
            analysis.high_centrality_threshold = v;
        }
        if let Some(v) = parse(&lookup, STALE_HOURS_ENV)? {
            analysis.stale_after_hours = v;
        }
        analysis.validate()?;

        let database = match lookup(DATABASE_ENV) {
            Some(path) => PathBuf::from(path),
            None => database_path()?,
        };

        Ok(Self {
            host: lookup(HOST_ENV).unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse(&lookup, PORT_ENV)?.unwrap_or(3030),
            database,
            analysis,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}
