// Analysis history database repository
use sqlx::{SqliteExecutor, SqlitePool};
use topology::AnalysisReport;
use uuid::Uuid;

use crate::models::analysis::{AnalysisError, AnalysisRow};

pub struct AnalysisRepository;

impl AnalysisRepository {
    pub async fn insert(pool: &SqlitePool, report: &AnalysisReport) -> Result<Uuid, AnalysisError> {
        sqlx::query(
            r#"
            INSERT INTO analyses (
                id, network_id, centrality_score,
                isolated_nodes, redundant_links, recommendations, analyzed_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(report.id)
        .bind(report.network_id)
        .bind(report.centrality_score)
        .bind(serde_json::to_string(&report.isolated_nodes)?)
        .bind(serde_json::to_string(&report.redundant_links)?)
        .bind(serde_json::to_string(&report.recommendations)?)
        .bind(report.analyzed_at)
        .execute(pool)
        .await?;
        Ok(report.id)
    }

    /// Newest first; ties broken by insertion order
    pub async fn list_recent<'e, E>(
        executor: E,
        network_id: Uuid,
        limit: i64,
    ) -> Result<Vec<AnalysisReport>, AnalysisError>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, AnalysisRow>(
            r#"
            SELECT * FROM analyses
            WHERE network_id = ?1
            ORDER BY analyzed_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(network_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;

        rows.into_iter().map(AnalysisReport::try_from).collect()
    }
}
