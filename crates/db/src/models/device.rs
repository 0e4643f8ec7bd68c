use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use topology::{Device, DeviceStatus, DeviceType};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Device not found")]
    NotFound,
    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

/// A device row; adjacency lives in `device_connections`
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DeviceRow {
    pub id: Uuid,
    pub network_id: Uuid,
    pub name: String,
    pub status: String,
    pub device_type: String,
    pub position: i64,
}

/// A single device added outside a batch; it starts with no connections
#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateDevice {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    #[serde(default)]
    pub status: DeviceStatus,
}

impl CreateDevice {
    pub fn into_device(self) -> Device {
        Device::new(Uuid::new_v4(), self.name, self.device_type).with_status(self.status)
    }
}

impl DeviceRow {
    /// Domain device with the given adjacency
    pub fn into_device(self, connections: Vec<Uuid>) -> Result<Device, DeviceError> {
        let device_type = self.device_type.parse().map_err(DeviceError::InvalidValue)?;
        let status = self.status.parse().map_err(DeviceError::InvalidValue)?;
        Ok(Device::new(self.id, self.name, device_type)
            .with_status(status)
            .with_connections(connections))
    }
}
