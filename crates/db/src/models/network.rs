use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use topology::Network;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Network not found")]
    NotFound,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct NetworkRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateNetwork {
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<String>,
}

impl From<NetworkRow> for Network {
    fn from(row: NetworkRow) -> Self {
        Network {
            id: row.id,
            name: row.name,
            description: row.description,
            owner: row.owner,
            created_at: row.created_at,
        }
    }
}
