//! IoT network topology ingestion and structural health analysis
//!
//! A network is a set of devices with directed adjacency. This crate loads
//! externally identified devices into a network, rebuilds graph snapshots from
//! storage and reports on them:
//!
//! - **Isolated devices**: no connection in either direction
//! - **Redundant links**: repeated or reciprocal adjacency entries
//! - **Centrality**: average normalized undirected degree
//!
//! Storage is abstracted behind [`store::NetworkStore`]; the `db` crate provides
//! the SQLite implementation.

pub mod config;
pub mod datasets;
pub mod ingestion;
pub mod model;
pub mod recommendations;
pub mod report;
pub mod service;
pub mod store;
pub mod topology;

pub use config::{AnalysisConfig, AnalysisConfigError};
pub use ingestion::{IngestionBatch, IngestionPipeline, IngestionPlan, IngestionSummary};
pub use model::{DataSource, DataSourceType, Device, DeviceStatus, DeviceType, Network};
pub use recommendations::RecommendationEngine;
pub use report::{AnalysisReport, DevicePair};
pub use service::{AnalysisView, TopologyService};
pub use store::{ContentCounts, NetworkContent, NetworkStore, StoreError};
pub use topology::{NetworkGraph, TopologyAnalyzer};

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("Network not found: {0}")]
    NetworkNotFound(Uuid),
    #[error("Network has no devices")]
    EmptyNetwork,
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),
    #[error("Ingestion failed: {0}")]
    IngestionFailure(String),
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, TopologyError>;
