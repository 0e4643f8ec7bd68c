use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One directed adjacency entry
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct DeviceConnectionRow {
    pub id: i64,
    pub network_id: Uuid,
    pub from_device_id: Uuid,
    pub to_device_id: Uuid,
}
