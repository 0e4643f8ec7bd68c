//! Topology analyzer - isolated devices, redundant links and centrality

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::graph::NetworkGraph;
use super::invariants::InvariantChecker;
use crate::report::{AnalysisReport, DevicePair};
use crate::{Result, TopologyError};

/// Why a link was flagged; both kinds end up in the same report list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redundancy {
    /// The same directed entry was stored more than once
    Duplicate,
    /// The reverse direction was already counted
    Reciprocal,
}

/// Stateless analysis over a graph snapshot
pub struct TopologyAnalyzer;

impl TopologyAnalyzer {
    /// Analyze a snapshot and produce a report without recommendations.
    ///
    /// Fails with `EmptyNetwork` when there are no devices and with
    /// `InvalidTopology` when an adjacency entry points at a missing device.
    pub fn analyze(network_id: Uuid, graph: &NetworkGraph) -> Result<AnalysisReport> {
        if graph.is_empty() {
            return Err(TopologyError::EmptyNetwork);
        }

        let errors = InvariantChecker::new().errors(graph);
        if !errors.is_empty() {
            let messages: Vec<String> = errors.into_iter().map(|v| v.message).collect();
            return Err(TopologyError::InvalidTopology(messages.join("; ")));
        }

        Ok(AnalysisReport {
            id: Uuid::new_v4(),
            network_id,
            centrality_score: Self::centrality(graph),
            analyzed_at: Utc::now(),
            isolated_nodes: Self::find_isolated(graph),
            redundant_links: Self::find_redundant_links(graph)
                .into_iter()
                .map(|(pair, _)| pair)
                .collect(),
            recommendations: Vec::new(),
        })
    }

    /// Devices with no outgoing and no incoming connection, in device order
    pub fn find_isolated(graph: &NetworkGraph) -> Vec<Uuid> {
        let neighbors = graph.neighbor_sets();
        graph
            .ids()
            .filter(|id| neighbors.get(id).map_or(true, |set| set.is_empty()))
            .collect()
    }

    /// Walk every directed entry and flag each one whose undirected pair was
    /// already seen earlier in the walk.
    pub fn find_redundant_links(graph: &NetworkGraph) -> Vec<(DevicePair, Redundancy)> {
        // canonical pair -> direction of its first occurrence
        let mut seen: HashMap<DevicePair, (Uuid, Uuid)> = HashMap::new();
        let mut redundant = Vec::new();

        for (from, to) in graph.directed_edges() {
            if from == to {
                continue;
            }
            let key = DevicePair::canonical(from, to);
            match seen.get(&key) {
                Some(first) => {
                    let kind = if *first == (from, to) {
                        Redundancy::Duplicate
                    } else {
                        Redundancy::Reciprocal
                    };
                    tracing::debug!(%from, %to, ?kind, "redundant link");
                    redundant.push((key, kind));
                }
                None => {
                    seen.insert(key, (from, to));
                }
            }
        }

        redundant
    }

    /// Average undirected degree normalized by `device_count - 1`
    pub fn centrality(graph: &NetworkGraph) -> f64 {
        let count = graph.len();
        if count < 2 {
            return 0.0;
        }

        let max_degree = (count - 1) as f64;
        let neighbors = graph.neighbor_sets();
        let total: f64 = graph
            .ids()
            .map(|id| neighbors.get(&id).map_or(0, |set| set.len()) as f64 / max_degree)
            .sum();

        total / count as f64
    }
}
