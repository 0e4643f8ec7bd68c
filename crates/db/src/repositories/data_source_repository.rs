// Data source database repository
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use topology::DataSource;
use uuid::Uuid;

use crate::models::data_source::DataSourceRow;

pub struct DataSourceRepository;

impl DataSourceRepository {
    pub async fn list_by_network<'e, E>(
        executor: E,
        network_id: Uuid,
    ) -> Result<Vec<DataSourceRow>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, DataSourceRow>(
            "SELECT * FROM data_sources WHERE network_id = ?1 ORDER BY position",
        )
        .bind(network_id)
        .fetch_all(executor)
        .await
    }

    /// Append one data source after the network's last position
    pub async fn insert_one(
        pool: &SqlitePool,
        network_id: Uuid,
        source: &DataSource,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO data_sources (id, network_id, name, source_type, last_update, position)
            VALUES (
                ?1, ?2, ?3, ?4, ?5,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM data_sources WHERE network_id = ?2)
            )
            "#,
        )
        .bind(source.id)
        .bind(network_id)
        .bind(&source.name)
        .bind(source.source_type.to_string())
        .bind(source.last_update)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<DataSourceRow>, sqlx::Error> {
        sqlx::query_as::<_, DataSourceRow>("SELECT * FROM data_sources WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM data_sources WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_many(
        conn: &mut SqliteConnection,
        network_id: Uuid,
        sources: &[DataSource],
    ) -> Result<usize, sqlx::Error> {
        for (position, source) in sources.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO data_sources (id, network_id, name, source_type, last_update, position)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(source.id)
            .bind(network_id)
            .bind(&source.name)
            .bind(source.source_type.to_string())
            .bind(source.last_update)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
        }
        Ok(sources.len())
    }

    pub async fn delete_by_network(
        conn: &mut SqliteConnection,
        network_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM data_sources WHERE network_id = ?1")
            .bind(network_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Stamp a data source as refreshed at `at`
    pub async fn touch(
        pool: &SqlitePool,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<DataSourceRow>, sqlx::Error> {
        sqlx::query_as::<_, DataSourceRow>(
            "UPDATE data_sources SET last_update = ?1 WHERE id = ?2 RETURNING *",
        )
        .bind(at)
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
