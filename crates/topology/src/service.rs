//! Service facade tying ingestion, analysis and recommendations to a store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::datasets;
use crate::ingestion::{IngestionBatch, IngestionPipeline, IngestionSummary};
use crate::model::{DeviceStatus, DeviceType, Network};
use crate::recommendations::RecommendationEngine;
use crate::report::AnalysisReport;
use crate::store::NetworkStore;
use crate::topology::{NetworkGraph, TopologyAnalyzer};
use crate::{Result, TopologyError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct DeviceSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub status: DeviceStatus,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct LinkSummary {
    pub device1_id: Uuid,
    pub device2_id: Uuid,
    pub device1_name: String,
    pub device2_name: String,
}

/// Analysis result with device names resolved, as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnalysisView {
    pub analysis_id: Uuid,
    pub network_name: String,
    pub analysis_date: DateTime<Utc>,
    pub centrality_score: f64,
    pub isolated_nodes_count: usize,
    pub isolated_nodes: Vec<DeviceSummary>,
    pub redundant_links_count: usize,
    pub redundant_links: Vec<LinkSummary>,
    pub has_issues: bool,
    pub total_issues: usize,
    pub recommendations: Vec<String>,
}

impl AnalysisView {
    fn new(network: &Network, graph: &NetworkGraph, report: &AnalysisReport) -> Self {
        let name_of = |id: Uuid| {
            graph
                .device(id)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| id.to_string())
        };

        let isolated_nodes: Vec<DeviceSummary> = report
            .isolated_nodes
            .iter()
            .filter_map(|id| graph.device(*id))
            .map(|d| DeviceSummary {
                id: d.id,
                name: d.name.clone(),
                device_type: d.device_type,
                status: d.status,
                is_active: d.is_active(),
            })
            .collect();

        let redundant_links: Vec<LinkSummary> = report
            .redundant_links
            .iter()
            .map(|pair| LinkSummary {
                device1_id: pair.0,
                device2_id: pair.1,
                device1_name: name_of(pair.0),
                device2_name: name_of(pair.1),
            })
            .collect();

        Self {
            analysis_id: report.id,
            network_name: network.name.clone(),
            analysis_date: report.analyzed_at,
            centrality_score: round4(report.centrality_score),
            isolated_nodes_count: isolated_nodes.len(),
            isolated_nodes,
            redundant_links_count: redundant_links.len(),
            redundant_links,
            has_issues: report.has_issues(),
            total_issues: report.issue_count(),
            recommendations: report.recommendations.clone(),
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

pub struct TopologyService<S> {
    store: S,
    config: AnalysisConfig,
    recommendations: RecommendationEngine,
}

impl<S: NetworkStore> TopologyService<S> {
    pub fn new(store: S, config: AnalysisConfig) -> Self {
        let recommendations = RecommendationEngine::new(config.clone());
        Self {
            store,
            config,
            recommendations,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub async fn ingest(&self, network_id: Uuid, batch: IngestionBatch) -> Result<IngestionSummary> {
        IngestionPipeline::new(&self.store)
            .ingest(network_id, batch)
            .await
    }

    /// Replace a network's content with a named built-in dataset
    pub async fn load_dataset(&self, network_id: Uuid, name: &str) -> Result<IngestionSummary> {
        let batch = datasets::load_dataset(name)?;
        self.ingest(network_id, batch).await
    }

    /// Current graph of a network, rebuilt from storage
    pub async fn snapshot(&self, network_id: Uuid) -> Result<(Network, NetworkGraph)> {
        let network = self
            .store
            .find_network(network_id)
            .await?
            .ok_or(TopologyError::NetworkNotFound(network_id))?;
        let devices = self.store.list_devices_with_adjacency(network_id).await?;
        Ok((network, NetworkGraph::from_devices(devices)))
    }

    /// Analyze the stored graph, attach recommendations and persist the report
    pub async fn analyze(&self, network_id: Uuid) -> Result<AnalysisView> {
        let (network, graph) = self.snapshot(network_id).await?;

        let report = TopologyAnalyzer::analyze(network_id, &graph)?;
        let lines = self.recommendations.recommend(&report);
        let report = report.with_recommendations(lines);

        self.store.append_analysis_report(network_id, &report).await?;

        tracing::info!(
            %network_id,
            devices = graph.len(),
            isolated = report.isolated_nodes.len(),
            redundant = report.redundant_links.len(),
            centrality = report.centrality_score,
            "topology analyzed"
        );

        Ok(AnalysisView::new(&network, &graph, &report))
    }

    /// Newest reports first
    pub async fn recent_reports(&self, network_id: Uuid, limit: i64) -> Result<Vec<AnalysisReport>> {
        if self.store.find_network(network_id).await?.is_none() {
            return Err(TopologyError::NetworkNotFound(network_id));
        }
        Ok(self.store.list_recent_reports(network_id, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::ingestion::{ConnectionRecord, DeviceRecord};
    use crate::model::Device;
    use crate::store::{ContentCounts, NetworkContent, StoreError};

    #[derive(Debug)]
    struct Broken;

    impl std::fmt::Display for Broken {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "disk full")
        }
    }

    impl std::error::Error for Broken {}

    #[derive(Default)]
    struct MemoryStore {
        networks: Mutex<HashMap<Uuid, Network>>,
        content: Mutex<HashMap<Uuid, NetworkContent>>,
        reports: Mutex<Vec<AnalysisReport>>,
        fail_writes: Mutex<bool>,
    }

    impl MemoryStore {
        fn with_network(name: &str) -> (Self, Uuid) {
            let store = Self::default();
            let id = Uuid::new_v4();
            store.networks.lock().unwrap().insert(
                id,
                Network {
                    id,
                    name: name.to_string(),
                    description: String::new(),
                    owner: None,
                    created_at: Utc::now(),
                },
            );
            (store, id)
        }
    }

    #[async_trait]
    impl NetworkStore for MemoryStore {
        async fn find_network(&self, network_id: Uuid) -> std::result::Result<Option<Network>, StoreError> {
            Ok(self.networks.lock().unwrap().get(&network_id).cloned())
        }

        async fn list_devices_with_adjacency(
            &self,
            network_id: Uuid,
        ) -> std::result::Result<Vec<Device>, StoreError> {
            let content = self.content.lock().unwrap();
            let Some(content) = content.get(&network_id) else {
                return Ok(Vec::new());
            };
            Ok(content
                .devices
                .iter()
                .map(|d| {
                    let connections = content
                        .connections
                        .iter()
                        .filter(|(from, _)| *from == d.id)
                        .map(|(_, to)| *to)
                        .collect();
                    d.clone().with_connections(connections)
                })
                .collect())
        }

        async fn replace_network_content(
            &self,
            network_id: Uuid,
            content: NetworkContent,
        ) -> std::result::Result<ContentCounts, StoreError> {
            if *self.fail_writes.lock().unwrap() {
                return Err(StoreError::backend(Broken));
            }
            let counts = ContentCounts {
                devices: content.devices.len(),
                connections: content.connections.len(),
                data_sources: content.data_sources.len(),
            };
            self.content.lock().unwrap().insert(network_id, content);
            Ok(counts)
        }

        async fn append_analysis_report(
            &self,
            _network_id: Uuid,
            report: &AnalysisReport,
        ) -> std::result::Result<Uuid, StoreError> {
            self.reports.lock().unwrap().push(report.clone());
            Ok(report.id)
        }

        async fn list_recent_reports(
            &self,
            network_id: Uuid,
            limit: i64,
        ) -> std::result::Result<Vec<AnalysisReport>, StoreError> {
            Ok(self
                .reports
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|r| r.network_id == network_id)
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }

    fn service(store: MemoryStore) -> TopologyService<MemoryStore> {
        TopologyService::new(store, AnalysisConfig::default())
    }

    #[tokio::test]
    async fn smart_home_loads_and_analyzes() {
        let (store, id) = MemoryStore::with_network("Home");
        let service = service(store);

        let summary = service.load_dataset(id, "smart_home").await.unwrap();
        assert_eq!(summary.devices_loaded, 5);
        assert_eq!(summary.connections_loaded, 5);
        assert_eq!(summary.data_sources_loaded, 1);

        let view = service.analyze(id).await.unwrap();
        assert_eq!(view.network_name, "Home");
        assert_eq!(view.isolated_nodes_count, 0);
        assert_eq!(view.redundant_links_count, 0);
        assert_eq!(view.centrality_score, 0.5);
        assert!(!view.has_issues);
        assert_eq!(view.recommendations.len(), 1);

        let reports = service.recent_reports(id, 5).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, view.analysis_id);
    }

    #[tokio::test]
    async fn isolated_devices_are_named_in_the_view() {
        let (store, id) = MemoryStore::with_network("Plant");
        let service = service(store);

        service.load_dataset(id, "industrial_plant").await.unwrap();
        let view = service.analyze(id).await.unwrap();

        assert_eq!(view.isolated_nodes_count, 1);
        assert_eq!(view.isolated_nodes[0].name, "Backup Sensor");
        assert!(!view.isolated_nodes[0].is_active);
        assert_eq!(view.total_issues, 1);
    }

    #[tokio::test]
    async fn empty_network_cannot_be_analyzed() {
        let (store, id) = MemoryStore::with_network("Empty");
        let service = service(store);

        let err = service.analyze(id).await.unwrap_err();
        assert!(matches!(err, TopologyError::EmptyNetwork));
        assert!(service.recent_reports(id, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_network_is_reported() {
        let service = service(MemoryStore::default());
        let missing = Uuid::new_v4();

        assert!(matches!(
            service.analyze(missing).await.unwrap_err(),
            TopologyError::NetworkNotFound(id) if id == missing
        ));
        assert!(matches!(
            service.load_dataset(missing, "smart_home").await.unwrap_err(),
            TopologyError::NetworkNotFound(_)
        ));
    }

    #[tokio::test]
    async fn reingesting_gives_the_same_counts() {
        let (store, id) = MemoryStore::with_network("Home");
        let service = service(store);

        let first = service.load_dataset(id, "industrial_plant").await.unwrap();
        let second = service.load_dataset(id, "industrial_plant").await.unwrap();
        assert_eq!(first, second);

        let (_, graph) = service.snapshot(id).await.unwrap();
        assert_eq!(graph.len(), 6);
        assert_eq!(graph.edge_count(), 6);
    }

    #[tokio::test]
    async fn failed_replace_keeps_previous_content() {
        let (store, id) = MemoryStore::with_network("Home");
        let service = service(store);
        service.load_dataset(id, "smart_home").await.unwrap();

        *service.store().fail_writes.lock().unwrap() = true;
        let err = service.load_dataset(id, "office_building").await.unwrap_err();
        assert!(matches!(err, TopologyError::IngestionFailure(msg) if msg.contains("disk full")));

        let (_, graph) = service.snapshot(id).await.unwrap();
        assert_eq!(graph.len(), 5);
    }

    #[tokio::test]
    async fn dangling_connection_is_not_counted() {
        let (store, id) = MemoryStore::with_network("Lab");
        let service = service(store);

        let batch = IngestionBatch {
            devices: vec![
                DeviceRecord {
                    id: "a".into(),
                    name: "A".into(),
                    device_type: DeviceType::Sensor,
                    status: DeviceStatus::Active,
                },
                DeviceRecord {
                    id: "b".into(),
                    name: "B".into(),
                    device_type: DeviceType::Gateway,
                    status: DeviceStatus::Active,
                },
            ],
            connections: vec![
                ConnectionRecord {
                    from: "a".into(),
                    to: "b".into(),
                },
                ConnectionRecord {
                    from: "a".into(),
                    to: "ghost".into(),
                },
            ],
            data_sources: Vec::new(),
        };

        let summary = service.ingest(id, batch).await.unwrap();
        assert_eq!(summary.devices_loaded, 2);
        assert_eq!(summary.connections_loaded, 1);
    }

    #[test]
    fn centrality_is_rounded_to_four_places() {
        assert_eq!(round4(2.0 / 3.0), 0.6667);
        assert_eq!(round4(0.0), 0.0);
    }
}
