//! Built-in sample datasets

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ingestion::{ConnectionRecord, DataSourceRecord, DeviceRecord, IngestionBatch};
use crate::model::{DataSourceType, DeviceStatus, DeviceType};
use crate::{Result, TopologyError};

/// Catalog entry shown to callers choosing a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DatasetInfo {
    pub name: String,
    pub description: String,
    pub devices: usize,
    pub connections: usize,
    pub data_sources: usize,
}

struct SampleDataset {
    name: &'static str,
    description: &'static str,
    build: fn() -> IngestionBatch,
}

const CATALOG: &[SampleDataset] = &[
    SampleDataset {
        name: "smart_home",
        description: "Home automation around a single gateway",
        build: smart_home,
    },
    SampleDataset {
        name: "industrial_plant",
        description: "Zigbee plant floor with a spare sensor and a duplicated link",
        build: industrial_plant,
    },
    SampleDataset {
        name: "office_building",
        description: "Two floors joined by a controller, with a device under maintenance",
        build: office_building,
    },
];

/// Names and sizes of every built-in dataset
pub fn catalog() -> Vec<DatasetInfo> {
    CATALOG
        .iter()
        .map(|entry| {
            let batch = (entry.build)();
            DatasetInfo {
                name: entry.name.to_string(),
                description: entry.description.to_string(),
                devices: batch.devices.len(),
                connections: batch.connections.len(),
                data_sources: batch.data_sources.len(),
            }
        })
        .collect()
}

pub fn load_dataset(name: &str) -> Result<IngestionBatch> {
    CATALOG
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| (entry.build)())
        .ok_or_else(|| TopologyError::DatasetNotFound(name.to_string()))
}

fn device(id: i64, name: &str, device_type: DeviceType) -> DeviceRecord {
    DeviceRecord {
        id: id.into(),
        name: name.to_string(),
        device_type,
        status: DeviceStatus::Active,
    }
}

fn links(pairs: &[(i64, i64)]) -> Vec<ConnectionRecord> {
    pairs
        .iter()
        .map(|(from, to)| ConnectionRecord {
            from: (*from).into(),
            to: (*to).into(),
        })
        .collect()
}

fn source(name: &str, source_type: DataSourceType, hours_ago: i64) -> DataSourceRecord {
    DataSourceRecord {
        name: name.to_string(),
        source_type,
        last_update: Some(Utc::now() - Duration::hours(hours_ago)),
    }
}

fn smart_home() -> IngestionBatch {
    IngestionBatch {
        devices: vec![
            device(1, "Temperature Sensor", DeviceType::Sensor),
            device(2, "Humidity Sensor", DeviceType::Sensor),
            device(3, "Smart Lamp", DeviceType::Actuator),
            device(4, "Air Conditioner", DeviceType::Actuator),
            device(5, "Gateway", DeviceType::Gateway),
        ],
        connections: links(&[(1, 5), (2, 5), (5, 3), (5, 4), (1, 4)]),
        data_sources: vec![source("Home Assistant API", DataSourceType::Api, 2)],
    }
}

fn industrial_plant() -> IngestionBatch {
    let mut spare = device(106, "Backup Sensor", DeviceType::Sensor);
    spare.status = DeviceStatus::Inactive;

    IngestionBatch {
        devices: vec![
            device(101, "Temperature Sensor", DeviceType::Sensor),
            device(102, "Humidity Sensor", DeviceType::Sensor),
            device(103, "Smart Lamp", DeviceType::Actuator),
            device(104, "Air Conditioner", DeviceType::Actuator),
            device(105, "Zigbee Gateway", DeviceType::Gateway),
            spare,
        ],
        connections: links(&[
            (101, 105),
            (102, 105),
            (105, 103),
            (105, 104),
            (101, 104),
            (101, 104),
            (103, 104),
        ]),
        data_sources: vec![
            source("Home Assistant API", DataSourceType::Api, 2),
            source("Local MQTT Broker", DataSourceType::Stream, 0),
        ],
    }
}

fn office_building() -> IngestionBatch {
    let mut badge_reader = device(8, "Badge Reader", DeviceType::Sensor);
    badge_reader.status = DeviceStatus::Maintenance;

    IngestionBatch {
        devices: vec![
            device(1, "Floor 1 Gateway", DeviceType::Gateway),
            device(2, "Floor 2 Gateway", DeviceType::Gateway),
            device(3, "Building Controller", DeviceType::Controller),
            device(4, "Lobby Motion Sensor", DeviceType::Sensor),
            device(5, "Meeting Room CO2 Sensor", DeviceType::Sensor),
            device(6, "Lobby Lights", DeviceType::Actuator),
            device(7, "HVAC Damper", DeviceType::Actuator),
            badge_reader,
        ],
        connections: links(&[
            (4, 1),
            (6, 1),
            (5, 2),
            (7, 2),
            (1, 3),
            (2, 3),
            (3, 7),
        ]),
        data_sources: vec![
            source("BMS Export", DataSourceType::File, 30),
            source("Facilities Database", DataSourceType::Database, 1),
        ],
    }
}
