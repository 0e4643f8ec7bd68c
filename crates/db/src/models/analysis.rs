use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use topology::AnalysisReport;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Corrupt analysis payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Stored report; list columns are JSON text
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub network_id: Uuid,
    pub centrality_score: f64,
    pub isolated_nodes: String,
    pub redundant_links: String,
    pub recommendations: String,
    pub analyzed_at: DateTime<Utc>,
}

impl TryFrom<AnalysisRow> for AnalysisReport {
    type Error = AnalysisError;

    fn try_from(row: AnalysisRow) -> Result<Self, Self::Error> {
        Ok(AnalysisReport {
            id: row.id,
            network_id: row.network_id,
            centrality_score: row.centrality_score,
            analyzed_at: row.analyzed_at,
            isolated_nodes: serde_json::from_str(&row.isolated_nodes)?,
            redundant_links: serde_json::from_str(&row.redundant_links)?,
            recommendations: serde_json::from_str(&row.recommendations)?,
        })
    }
}
