//! Analysis configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisConfigError {
    #[error(
        "low_centrality_threshold ({low}) must not exceed high_centrality_threshold ({high})"
    )]
    InvertedThresholds { low: f64, high: f64 },
}

/// Thresholds driving recommendations and data-source staleness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Below this centrality the network is considered too sparse
    #[serde(default = "default_low_centrality")]
    pub low_centrality_threshold: f64,

    /// Above this centrality the network is considered a potential bottleneck
    #[serde(default = "default_high_centrality")]
    pub high_centrality_threshold: f64,

    #[serde(default = "default_stale_after_hours")]
    pub stale_after_hours: i64,

    /// How many past reports an overview shows
    #[serde(default = "default_recent_reports_limit")]
    pub recent_reports_limit: i64,
}

fn default_low_centrality() -> f64 {
    0.3
}

fn default_high_centrality() -> f64 {
    0.7
}

fn default_stale_after_hours() -> i64 {
    24
}

fn default_recent_reports_limit() -> i64 {
    5
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            low_centrality_threshold: default_low_centrality(),
            high_centrality_threshold: default_high_centrality(),
            stale_after_hours: default_stale_after_hours(),
            recent_reports_limit: default_recent_reports_limit(),
        }
    }
}

impl AnalysisConfig {
    /// Reject a low threshold above the high one
    pub fn validate(&self) -> Result<(), AnalysisConfigError> {
        if self.low_centrality_threshold > self.high_centrality_threshold {
            return Err(AnalysisConfigError::InvertedThresholds {
                low: self.low_centrality_threshold,
                high: self.high_centrality_threshold,
            });
        }
        Ok(())
    }
}
