use std::sync::Arc;

use db::{DBService, SqliteNetworkStore};
use topology::{AnalysisConfig, TopologyService};

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    topology: Arc<TopologyService<SqliteNetworkStore>>,
}

impl AppState {
    pub fn new(db: DBService, analysis: AnalysisConfig) -> Self {
        let topology = Arc::new(TopologyService::new(db.network_store(), analysis));
        Self { db, topology }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn topology(&self) -> &TopologyService<SqliteNetworkStore> {
        &self.topology
    }

    /// Store sharing the service's per-network locks
    pub fn store(&self) -> &SqliteNetworkStore {
        self.topology.store()
    }

    pub fn analysis_config(&self) -> &AnalysisConfig {
        self.topology.config()
    }
}
