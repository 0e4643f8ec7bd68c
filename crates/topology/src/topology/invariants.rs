//! Structural invariants of a network graph
//!
//! The graph primitives silently ignore invalid operations; this module is
//! where callers find out what is actually wrong with a snapshot before
//! handing it to the analyzer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::graph::NetworkGraph;

/// A violation of a structural invariant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvariantViolation {
    pub kind: ViolationKind,
    pub severity: ViolationSeverity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ViolationKind {
    /// The graph has no devices at all
    EmptyGraph,
    /// An adjacency entry references a device that does not exist
    DanglingReference { device: Uuid, missing: Uuid },
    /// A device lists itself
    SelfLoop { device: Uuid },
}

/// Severity levels for invariant violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Worth noting, the analyzer tolerates it
    Warning,
    /// The snapshot must not be analyzed
    Error,
}

/// Invariant checker for graph validation
#[derive(Debug, Default)]
pub struct InvariantChecker;

impl InvariantChecker {
    pub fn new() -> Self {
        Self
    }

    /// Check all invariants against a graph
    pub fn check_all(&self, graph: &NetworkGraph) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        if graph.is_empty() {
            violations.push(InvariantViolation {
                kind: ViolationKind::EmptyGraph,
                severity: ViolationSeverity::Error,
                message: "Network has no devices".to_string(),
            });
        }
        violations.extend(self.check_no_dangling_references(graph));
        violations.extend(self.check_no_self_loops(graph));
        violations
    }

    /// Only error-level violations, the ones that block analysis
    pub fn errors(&self, graph: &NetworkGraph) -> Vec<InvariantViolation> {
        self.check_all(graph)
            .into_iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
            .collect()
    }

    pub fn is_valid(&self, graph: &NetworkGraph) -> bool {
        self.errors(graph).is_empty()
    }

    fn check_no_dangling_references(&self, graph: &NetworkGraph) -> Vec<InvariantViolation> {
        graph
            .directed_edges()
            .filter(|(_, to)| !graph.contains(*to))
            .map(|(device, missing)| InvariantViolation {
                kind: ViolationKind::DanglingReference { device, missing },
                severity: ViolationSeverity::Error,
                message: format!(
                    "Device {} is connected to non-existent device {}",
                    device, missing
                ),
            })
            .collect()
    }

    fn check_no_self_loops(&self, graph: &NetworkGraph) -> Vec<InvariantViolation> {
        graph
            .directed_edges()
            .filter(|(from, to)| from == to)
            .map(|(device, _)| InvariantViolation {
                kind: ViolationKind::SelfLoop { device },
                severity: ViolationSeverity::Warning,
                message: format!("Device {} is connected to itself", device),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Device, DeviceType};

    #[test]
    fn empty_graph_is_an_error() {
        let violations = InvariantChecker::new().check_all(&NetworkGraph::new());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::EmptyGraph);
        assert_eq!(violations[0].severity, ViolationSeverity::Error);
    }

    #[test]
    fn dangling_reference_names_both_ends() {
        let a = Uuid::new_v4();
        let ghost = Uuid::new_v4();
        let graph = NetworkGraph::from_devices(vec![
            Device::new(a, "A", DeviceType::Sensor).with_connections(vec![ghost]),
        ]);

        let errors = InvariantChecker::new().errors(&graph);
        assert_eq!(
            errors[0].kind,
            ViolationKind::DanglingReference { device: a, missing: ghost }
        );
    }

    #[test]
    fn self_loop_is_only_a_warning() {
        let a = Uuid::new_v4();
        let graph = NetworkGraph::from_devices(vec![
            Device::new(a, "A", DeviceType::Sensor).with_connections(vec![a]),
        ]);

        let violations = InvariantChecker::new().check_all(&graph);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::SelfLoop { device: a });
        assert_eq!(violations[0].severity, ViolationSeverity::Warning);
        assert!(InvariantChecker::new().is_valid(&graph));
    }
}
