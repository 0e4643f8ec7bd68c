//! Network graph, its invariants and the structural analyzer

pub mod engine;
pub mod graph;
pub mod invariants;

pub use engine::{Redundancy, TopologyAnalyzer};
pub use graph::NetworkGraph;
pub use invariants::{InvariantChecker, InvariantViolation, ViolationKind, ViolationSeverity};
