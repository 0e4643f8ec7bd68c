// Network database repository
use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::models::network::{CreateNetwork, NetworkRow};

pub struct NetworkRepository;

impl NetworkRepository {
    pub async fn create(pool: &SqlitePool, data: &CreateNetwork) -> Result<NetworkRow, sqlx::Error> {
        sqlx::query_as::<_, NetworkRow>(
            r#"
            INSERT INTO networks (id, name, description, owner, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(data.description.as_deref().unwrap_or_default())
        .bind(&data.owner)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<NetworkRow>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, NetworkRow>("SELECT * FROM networks WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Newest first, optionally restricted to one owner
    pub async fn list(pool: &SqlitePool, owner: Option<&str>) -> Result<Vec<NetworkRow>, sqlx::Error> {
        match owner {
            Some(owner) => {
                sqlx::query_as::<_, NetworkRow>(
                    "SELECT * FROM networks WHERE owner = ?1 ORDER BY created_at DESC",
                )
                .bind(owner)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, NetworkRow>("SELECT * FROM networks ORDER BY created_at DESC")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Deletes the network and, through cascades, everything it owns
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM networks WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_utils::setup_test_pool;

    #[tokio::test]
    async fn list_filters_by_owner() {
        let pool = setup_test_pool().await;
        for (name, owner) in [("Home", Some("alice")), ("Plant", Some("bob")), ("Lab", None)] {
            NetworkRepository::create(
                &pool,
                &CreateNetwork {
                    name: name.into(),
                    description: None,
                    owner: owner.map(String::from),
                },
            )
            .await
            .unwrap();
        }

        assert_eq!(NetworkRepository::list(&pool, None).await.unwrap().len(), 3);
        let owned = NetworkRepository::list(&pool, Some("alice")).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].name, "Home");
        assert_eq!(owned[0].description, "");
    }

    #[tokio::test]
    async fn delete_reports_affected_rows() {
        let pool = setup_test_pool().await;
        let network = NetworkRepository::create(
            &pool,
            &CreateNetwork {
                name: "Temp".into(),
                description: Some("scratch".into()),
                owner: None,
            },
        )
        .await
        .unwrap();

        assert!(NetworkRepository::find_by_id(&pool, network.id).await.unwrap().is_some());
        assert_eq!(NetworkRepository::delete(&pool, network.id).await.unwrap(), 1);
        assert!(NetworkRepository::find_by_id(&pool, network.id).await.unwrap().is_none());
    }
}
