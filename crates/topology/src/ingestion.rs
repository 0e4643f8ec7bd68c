//! Bulk loading of externally identified devices into a network
//!
//! Callers describe devices with their own identifiers (strings or integers).
//! [`IngestionPlan::build`] maps those onto fresh internal ids, drops
//! connections it cannot resolve and folds repeated pairs, all without touching
//! storage. [`IngestionPipeline`] then hands the plan to the store as a single
//! atomic replace.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::model::{DataSource, DataSourceType, Device, DeviceStatus, DeviceType};
use crate::report::DevicePair;
use crate::store::{NetworkContent, NetworkStore, StoreError};
use crate::topology::NetworkGraph;
use crate::{Result, TopologyError};

/// A caller-side device identifier; JSON strings and integers are both accepted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawExternalId", into = "String")]
pub struct ExternalId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExternalId {
    Text(String),
    Number(i64),
}

impl From<RawExternalId> for ExternalId {
    fn from(raw: RawExternalId) -> Self {
        match raw {
            RawExternalId::Text(s) => Self(s),
            RawExternalId::Number(n) => Self(n.to_string()),
        }
    }
}

impl From<ExternalId> for String {
    fn from(id: ExternalId) -> Self {
        id.0
    }
}

impl From<&str> for ExternalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<i64> for ExternalId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DeviceRecord {
    #[serde(alias = "original_id")]
    #[ts(type = "string | number")]
    pub id: ExternalId,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    #[serde(default)]
    pub status: DeviceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ConnectionRecord {
    #[ts(type = "string | number")]
    pub from: ExternalId,
    #[ts(type = "string | number")]
    pub to: ExternalId,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DataSourceRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: DataSourceType,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

/// Raw input for one network
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IngestionBatch {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
    #[serde(default)]
    pub data_sources: Vec<DataSourceRecord>,
}

/// Storage-ready content derived from a batch
#[derive(Debug, Clone)]
pub struct IngestionPlan {
    pub content: NetworkContent,
    pub id_map: IndexMap<ExternalId, Uuid>,
    /// Connections dropped because an end was unknown or both ends were the same device
    pub skipped_connections: usize,
}

impl IngestionPlan {
    pub fn build(batch: IngestionBatch, now: DateTime<Utc>) -> Result<Self> {
        let mut id_map: IndexMap<ExternalId, Uuid> = IndexMap::with_capacity(batch.devices.len());
        let mut devices = Vec::with_capacity(batch.devices.len());

        for record in batch.devices {
            if id_map.contains_key(&record.id) {
                return Err(TopologyError::InvalidBatch(format!(
                    "device id {} appears more than once",
                    record.id
                )));
            }
            let id = Uuid::new_v4();
            id_map.insert(record.id, id);
            devices.push(Device::new(id, record.name, record.device_type).with_status(record.status));
        }

        let mut seen: HashSet<DevicePair> = HashSet::new();
        let mut connections = Vec::new();
        let mut skipped_connections = 0;

        for record in batch.connections {
            let (Some(from), Some(to)) = (id_map.get(&record.from), id_map.get(&record.to)) else {
                skipped_connections += 1;
                continue;
            };
            if from == to {
                skipped_connections += 1;
                continue;
            }
            if seen.insert(DevicePair::canonical(*from, *to)) {
                connections.push((*from, *to));
            }
        }

        let data_sources = batch
            .data_sources
            .into_iter()
            .map(|record| DataSource {
                id: Uuid::new_v4(),
                name: record.name,
                source_type: record.source_type,
                last_update: record.last_update.unwrap_or(now),
            })
            .collect();

        Ok(Self {
            content: NetworkContent {
                devices,
                connections,
                data_sources,
            },
            id_map,
            skipped_connections,
        })
    }

    /// The graph this plan would produce once stored
    pub fn graph(&self) -> NetworkGraph {
        let mut graph = NetworkGraph::new();
        for device in &self.content.devices {
            graph.add_device(device.clone());
        }
        for (from, to) in &self.content.connections {
            graph.add_connection(*from, *to);
        }
        graph
    }
}

/// Outcome of a successful load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IngestionSummary {
    pub devices_loaded: usize,
    pub connections_loaded: usize,
    pub data_sources_loaded: usize,
    pub message: String,
}

impl IngestionSummary {
    fn new(devices: usize, connections: usize, data_sources: usize) -> Self {
        Self {
            devices_loaded: devices,
            connections_loaded: connections,
            data_sources_loaded: data_sources,
            message: format!(
                "Loaded {} devices, {} connections and {} data sources",
                devices, connections, data_sources
            ),
        }
    }
}

pub struct IngestionPipeline<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> IngestionPipeline<'a, S>
where
    S: NetworkStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Replace a network's devices, connections and data sources with `batch`
    pub async fn ingest(&self, network_id: Uuid, batch: IngestionBatch) -> Result<IngestionSummary> {
        if self.store.find_network(network_id).await?.is_none() {
            return Err(TopologyError::NetworkNotFound(network_id));
        }

        let plan = match IngestionPlan::build(batch, Utc::now()) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!(%network_id, error = %e, "rejected ingestion batch");
                return Err(e);
            }
        };

        let graph = plan.graph();
        if !graph.is_empty() && !graph.validate() {
            return Err(TopologyError::InvalidBatch(
                "batch does not form a valid topology".to_string(),
            ));
        }
        if plan.skipped_connections > 0 {
            tracing::debug!(
                %network_id,
                skipped = plan.skipped_connections,
                "dropped unresolved or self connections"
            );
        }

        let counts = self
            .store
            .replace_network_content(network_id, plan.content)
            .await
            .map_err(|e| match e {
                StoreError::NetworkMissing(id) => TopologyError::NetworkNotFound(id),
                other => TopologyError::IngestionFailure(other.to_string()),
            })?;

        tracing::info!(
            %network_id,
            devices = counts.devices,
            connections = counts.connections,
            data_sources = counts.data_sources,
            "network content replaced"
        );

        Ok(IngestionSummary::new(
            counts.devices,
            counts.connections,
            counts.data_sources,
        ))
    }
}
