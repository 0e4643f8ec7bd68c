use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use chrono::{DateTime, Utc};
use topology::{
    AnalysisReport, ContentCounts, DataSource, Device, Network, NetworkContent, NetworkStore,
    StoreError,
};
use uuid::Uuid;

use crate::{
    models::{data_source::CreateDataSource, device::CreateDevice},
    repositories::{AnalysisRepository, DataSourceRepository, DeviceRepository, NetworkRepository},
};

/// One async mutex per network, created on first use
#[derive(Default)]
pub struct NetworkLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl NetworkLocks {
    pub fn for_network(&self, network_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .entry(network_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub fn forget(&self, network_id: Uuid) {
        self.locks.remove(&network_id);
    }
}

/// [`NetworkStore`] backed by the SQLite repositories
#[derive(Clone)]
pub struct SqliteNetworkStore {
    pool: SqlitePool,
    locks: Arc<NetworkLocks>,
}

impl SqliteNetworkStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: Arc::new(NetworkLocks::default()),
        }
    }

    /// Delete a network and everything it owns. Waits for an in-flight replace.
    pub async fn delete_network(&self, network_id: Uuid) -> Result<bool, sqlx::Error> {
        let lock = self.locks.for_network(network_id);
        let _guard = lock.lock().await;
        let deleted = NetworkRepository::delete(&self.pool, network_id).await?;
        self.locks.forget(network_id);
        Ok(deleted > 0)
    }

    /// Remove one device and the connections touching it
    pub async fn remove_device(&self, network_id: Uuid, device_id: Uuid) -> Result<bool, sqlx::Error> {
        let lock = self.locks.for_network(network_id);
        let _guard = lock.lock().await;
        let deleted = DeviceRepository::delete(&self.pool, network_id, device_id).await?;
        Ok(deleted > 0)
    }

    /// Append one unconnected device. `None` when the network does not exist.
    pub async fn add_device(
        &self,
        network_id: Uuid,
        data: CreateDevice,
    ) -> Result<Option<Device>, sqlx::Error> {
        let lock = self.locks.for_network(network_id);
        let _guard = lock.lock().await;
        if NetworkRepository::find_by_id(&self.pool, network_id).await?.is_none() {
            return Ok(None);
        }
        let device = data.into_device();
        DeviceRepository::insert_one(&self.pool, network_id, &device).await?;
        tracing::debug!(%network_id, device_id = %device.id, "device added");
        Ok(Some(device))
    }

    /// Append one data source. `None` when the network does not exist.
    pub async fn add_data_source(
        &self,
        network_id: Uuid,
        data: CreateDataSource,
        now: DateTime<Utc>,
    ) -> Result<Option<DataSource>, sqlx::Error> {
        let lock = self.locks.for_network(network_id);
        let _guard = lock.lock().await;
        if NetworkRepository::find_by_id(&self.pool, network_id).await?.is_none() {
            return Ok(None);
        }
        let source = data.into_data_source(now);
        DataSourceRepository::insert_one(&self.pool, network_id, &source).await?;
        tracing::debug!(%network_id, data_source_id = %source.id, "data source added");
        Ok(Some(source))
    }

    /// Remove one data source wherever it lives
    pub async fn remove_data_source(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let Some(row) = DataSourceRepository::find_by_id(&self.pool, id).await? else {
            return Ok(false);
        };
        let lock = self.locks.for_network(row.network_id);
        let _guard = lock.lock().await;
        let deleted = DataSourceRepository::delete(&self.pool, id).await?;
        Ok(deleted > 0)
    }

    async fn replace_locked(
        &self,
        network_id: Uuid,
        content: &NetworkContent,
    ) -> Result<ContentCounts, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        DeviceRepository::delete_by_network(&mut *tx, network_id).await?;
        DataSourceRepository::delete_by_network(&mut *tx, network_id).await?;

        let devices = DeviceRepository::insert_many(&mut *tx, network_id, &content.devices).await?;
        let connections =
            DeviceRepository::insert_connections(&mut *tx, network_id, &content.connections).await?;
        let data_sources =
            DataSourceRepository::insert_many(&mut *tx, network_id, &content.data_sources).await?;

        tx.commit().await?;

        Ok(ContentCounts {
            devices,
            connections,
            data_sources,
        })
    }
}

#[async_trait]
impl NetworkStore for SqliteNetworkStore {
    async fn find_network(&self, network_id: Uuid) -> Result<Option<Network>, StoreError> {
        let row = NetworkRepository::find_by_id(&self.pool, network_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.map(Network::from))
    }

    async fn list_devices_with_adjacency(&self, network_id: Uuid) -> Result<Vec<Device>, StoreError> {
        // Devices and edges from one snapshot so a concurrent replace is never half-seen
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;
        let rows = DeviceRepository::list_by_network(&mut *tx, network_id)
            .await
            .map_err(StoreError::backend)?;
        let edges = DeviceRepository::list_connections(&mut *tx, network_id)
            .await
            .map_err(StoreError::backend)?;
        tx.commit().await.map_err(StoreError::backend)?;

        let mut adjacency: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for edge in edges {
            adjacency
                .entry(edge.from_device_id)
                .or_default()
                .push(edge.to_device_id);
        }

        rows.into_iter()
            .map(|row| {
                let connections = adjacency.remove(&row.id).unwrap_or_default();
                row.into_device(connections).map_err(StoreError::backend)
            })
            .collect()
    }

    async fn replace_network_content(
        &self,
        network_id: Uuid,
        content: NetworkContent,
    ) -> Result<ContentCounts, StoreError> {
        let lock = self.locks.for_network(network_id);
        let _guard = lock.lock().await;

        if NetworkRepository::find_by_id(&self.pool, network_id)
            .await
            .map_err(StoreError::backend)?
            .is_none()
        {
            return Err(StoreError::NetworkMissing(network_id));
        }

        // Dropping an uncommitted transaction rolls it back
        self.replace_locked(network_id, &content)
            .await
            .map_err(|e| {
                tracing::error!(%network_id, error = %e, "network content replace rolled back");
                StoreError::backend(e)
            })
    }

    async fn append_analysis_report(
        &self,
        _network_id: Uuid,
        report: &AnalysisReport,
    ) -> Result<Uuid, StoreError> {
        AnalysisRepository::insert(&self.pool, report)
            .await
            .map_err(StoreError::backend)
    }

    async fn list_recent_reports(
        &self,
        network_id: Uuid,
        limit: i64,
    ) -> Result<Vec<AnalysisReport>, StoreError> {
        AnalysisRepository::list_recent(&self.pool, network_id, limit)
            .await
            .map_err(StoreError::backend)
    }
}
