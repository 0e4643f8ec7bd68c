use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use topology::{DataSource, DataSourceType};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Data source not found")]
    NotFound,
    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DataSourceRow {
    pub id: Uuid,
    pub network_id: Uuid,
    pub name: String,
    pub source_type: String,
    pub last_update: DateTime<Utc>,
    pub position: i64,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateDataSource {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: DataSourceType,
    /// Defaults to the time of the add
    pub last_update: Option<DateTime<Utc>>,
}

impl CreateDataSource {
    pub fn into_data_source(self, now: DateTime<Utc>) -> DataSource {
        DataSource {
            id: Uuid::new_v4(),
            name: self.name,
            source_type: self.source_type,
            last_update: self.last_update.unwrap_or(now),
        }
    }
}

impl TryFrom<DataSourceRow> for DataSource {
    type Error = DataSourceError;

    fn try_from(row: DataSourceRow) -> Result<Self, Self::Error> {
        Ok(DataSource {
            id: row.id,
            name: row.name,
            source_type: row.source_type.parse().map_err(DataSourceError::InvalidValue)?,
            last_update: row.last_update,
        })
    }
}
