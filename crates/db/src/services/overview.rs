//! Read-side summary of a network: devices, data sources, recent analyses

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use topology::{AnalysisConfig, AnalysisReport, DataSource, Device, Network};
use ts_rs::TS;
use uuid::Uuid;

use crate::models::{analysis::AnalysisError, data_source::DataSourceError, device::DeviceError};
use crate::repositories::{
    AnalysisRepository, DataSourceRepository, DeviceRepository, NetworkRepository,
};

#[derive(Debug, Error)]
pub enum OverviewError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Network not found")]
    NotFound,
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct DeviceOverview {
    #[serde(flatten)]
    pub device: Device,
    pub is_active: bool,
    /// Stored entries touching this device in either direction
    pub connection_count: usize,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct DataSourceOverview {
    #[serde(flatten)]
    pub data_source: DataSource,
    pub needs_update: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
pub struct NetworkStats {
    pub total_devices: usize,
    pub active_devices: usize,
    pub total_connections: usize,
    pub total_data_sources: usize,
    pub stale_data_sources: usize,
    pub total_analyses: usize,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct NetworkOverview {
    pub network: Network,
    pub devices: Vec<DeviceOverview>,
    pub data_sources: Vec<DataSourceOverview>,
    pub analyses: Vec<AnalysisReport>,
    pub stats: NetworkStats,
}

pub struct NetworkOverviewService;

impl NetworkOverviewService {
    pub async fn load(
        pool: &SqlitePool,
        network_id: Uuid,
        config: &AnalysisConfig,
        now: DateTime<Utc>,
    ) -> Result<NetworkOverview, OverviewError> {
        // Every read sees the same snapshot, even mid-replace
        let mut tx = pool.begin().await?;

        let network: Network = NetworkRepository::find_by_id(&mut *tx, network_id)
            .await?
            .ok_or(OverviewError::NotFound)?
            .into();

        let edges = DeviceRepository::list_connections(&mut *tx, network_id).await?;
        let devices = DeviceRepository::list_by_network(&mut *tx, network_id)
            .await?
            .into_iter()
            .map(|row| {
                let id = row.id;
                let outgoing: Vec<Uuid> = edges
                    .iter()
                    .filter(|e| e.from_device_id == id)
                    .map(|e| e.to_device_id)
                    .collect();
                let incoming = edges.iter().filter(|e| e.to_device_id == id).count();
                let connection_count = outgoing.len() + incoming;
                let device = row.into_device(outgoing)?;
                Ok(DeviceOverview {
                    is_active: device.is_active(),
                    device,
                    connection_count,
                })
            })
            .collect::<Result<Vec<_>, DeviceError>>()?;

        let data_sources = DataSourceRepository::list_by_network(&mut *tx, network_id)
            .await?
            .into_iter()
            .map(|row| {
                let data_source = DataSource::try_from(row)?;
                Ok(DataSourceOverview {
                    needs_update: data_source.needs_update(now, config.stale_after_hours),
                    data_source,
                })
            })
            .collect::<Result<Vec<_>, DataSourceError>>()?;

        let analyses =
            AnalysisRepository::list_recent(&mut *tx, network_id, config.recent_reports_limit)
                .await?;
        tx.commit().await?;

        let stats = NetworkStats {
            total_devices: devices.len(),
            active_devices: devices.iter().filter(|d| d.is_active).count(),
            total_connections: edges.len(),
            total_data_sources: data_sources.len(),
            stale_data_sources: data_sources.iter().filter(|s| s.needs_update).count(),
            total_analyses: analyses.len(),
        };

        Ok(NetworkOverview {
            network,
            devices,
            data_sources,
            analyses,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use topology::{DataSourceType, DeviceStatus, DeviceType, NetworkContent, NetworkStore};

    use super::*;
    use crate::models::test_utils::{create_test_network, setup_test_pool};
    use crate::store::SqliteNetworkStore;

    #[tokio::test]
    async fn overview_counts_connections_and_stale_sources() {
        let pool = setup_test_pool().await;
        let network_id = create_test_network(&pool).await;
        let store = SqliteNetworkStore::new(pool.clone());

        let now = Utc::now();
        let gw = Uuid::new_v4();
        let s1 = Uuid::new_v4();
        let s2 = Uuid::new_v4();
        store
            .replace_network_content(
                network_id,
                NetworkContent {
                    devices: vec![
                        Device::new(gw, "Gateway", DeviceType::Gateway),
                        Device::new(s1, "S1", DeviceType::Sensor),
                        Device::new(s2, "S2", DeviceType::Sensor).with_status(DeviceStatus::Inactive),
                    ],
                    connections: vec![(s1, gw), (s2, gw)],
                    data_sources: vec![
                        DataSource {
                            id: Uuid::new_v4(),
                            name: "Old export".into(),
                            source_type: DataSourceType::File,
                            last_update: now - Duration::hours(30),
                        },
                        DataSource {
                            id: Uuid::new_v4(),
                            name: "Broker".into(),
                            source_type: DataSourceType::Stream,
                            last_update: now,
                        },
                    ],
                },
            )
            .await
            .unwrap();

        let overview = NetworkOverviewService::load(&pool, network_id, &AnalysisConfig::default(), now)
            .await
            .unwrap();

        assert_eq!(overview.devices[0].connection_count, 2);
        assert_eq!(overview.devices[1].connection_count, 1);
        assert_eq!(
            overview.stats,
            NetworkStats {
                total_devices: 3,
                active_devices: 2,
                total_connections: 2,
                total_data_sources: 2,
                stale_data_sources: 1,
                total_analyses: 0,
            }
        );
        assert!(overview.data_sources[0].needs_update);
    }

    #[tokio::test]
    async fn missing_network_is_not_found() {
        let pool = setup_test_pool().await;
        let err = NetworkOverviewService::load(&pool, Uuid::new_v4(), &AnalysisConfig::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, OverviewError::NotFound));
    }
}
