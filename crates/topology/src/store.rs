//! Storage contract the core relies on

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{DataSource, Device, Network};
use crate::report::AnalysisReport;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),
    #[error("network {0} not found")]
    NetworkMissing(Uuid),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Everything a network owns apart from its analysis history
#[derive(Debug, Clone, Default)]
pub struct NetworkContent {
    /// Devices with empty adjacency; edges travel in `connections`
    pub devices: Vec<Device>,
    /// Directed `(from, to)` pairs, already deduplicated
    pub connections: Vec<(Uuid, Uuid)>,
    pub data_sources: Vec<DataSource>,
}

/// What a replace actually wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentCounts {
    pub devices: usize,
    pub connections: usize,
    pub data_sources: usize,
}

#[async_trait]
pub trait NetworkStore: Send + Sync {
    async fn find_network(&self, network_id: Uuid) -> Result<Option<Network>, StoreError>;

    /// Devices of a network in stored order, adjacency filled from the edge table
    async fn list_devices_with_adjacency(&self, network_id: Uuid)
        -> Result<Vec<Device>, StoreError>;

    /// Delete the network's devices, edges and data sources and insert `content`,
    /// all or nothing. Analysis history is kept.
    async fn replace_network_content(
        &self,
        network_id: Uuid,
        content: NetworkContent,
    ) -> Result<ContentCounts, StoreError>;

    async fn append_analysis_report(
        &self,
        network_id: Uuid,
        report: &AnalysisReport,
    ) -> Result<Uuid, StoreError>;

    /// Newest first
    async fn list_recent_reports(
        &self,
        network_id: Uuid,
        limit: i64,
    ) -> Result<Vec<AnalysisReport>, StoreError>;
}
