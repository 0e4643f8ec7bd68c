//! Domain model for IoT networks, devices and data sources

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Operational status of a device
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Active,
    Inactive,
    Maintenance,
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeviceStatus::Active => "active",
            DeviceStatus::Inactive => "inactive",
            DeviceStatus::Maintenance => "maintenance",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for DeviceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(DeviceStatus::Active),
            "inactive" => Ok(DeviceStatus::Inactive),
            "maintenance" => Ok(DeviceStatus::Maintenance),
            _ => Err(format!("Unknown device status: {}", s)),
        }
    }
}

/// Role a device plays in the network
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Sensor,
    Actuator,
    Gateway,
    Controller,
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeviceType::Sensor => "sensor",
            DeviceType::Actuator => "actuator",
            DeviceType::Gateway => "gateway",
            DeviceType::Controller => "controller",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sensor" => Ok(DeviceType::Sensor),
            "actuator" => Ok(DeviceType::Actuator),
            "gateway" => Ok(DeviceType::Gateway),
            "controller" => Ok(DeviceType::Controller),
            _ => Err(format!("Unknown device type: {}", s)),
        }
    }
}

/// Kind of upstream feed attached to a network
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceType {
    Api,
    Database,
    File,
    Stream,
}

impl std::fmt::Display for DataSourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DataSourceType::Api => "api",
            DataSourceType::Database => "database",
            DataSourceType::File => "file",
            DataSourceType::Stream => "stream",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for DataSourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "api" => Ok(DataSourceType::Api),
            "database" => Ok(DataSourceType::Database),
            "file" => Ok(DataSourceType::File),
            "stream" => Ok(DataSourceType::Stream),
            _ => Err(format!("Unknown data source type: {}", s)),
        }
    }
}

/// A device and the identifiers of the devices it connects to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    pub status: DeviceStatus,
    pub device_type: DeviceType,
    pub connections: Vec<Uuid>,
}

impl Device {
    pub fn new(id: Uuid, name: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            id,
            name: name.into(),
            status: DeviceStatus::default(),
            device_type,
            connections: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: DeviceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_connections(mut self, connections: Vec<Uuid>) -> Self {
        self.connections = connections;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == DeviceStatus::Active
    }
}

/// A tenant-owned IoT network
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct Network {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An upstream data feed; only its freshness matters to the analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct DataSource {
    pub id: Uuid,
    pub name: String,
    pub source_type: DataSourceType,
    pub last_update: DateTime<Utc>,
}

impl DataSource {
    /// True when the last update is older than `threshold_hours`
    pub fn needs_update(&self, now: DateTime<Utc>, threshold_hours: i64) -> bool {
        now.signed_duration_since(self.last_update) > Duration::hours(threshold_hours)
    }
}
