//! Analysis reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// An unordered device pair, stored with the smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
pub struct DevicePair(pub Uuid, pub Uuid);

impl DevicePair {
    /// Canonical key for the undirected pair `{a, b}`
    pub fn canonical(a: Uuid, b: Uuid) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.0 == id || self.1 == id
    }
}

/// Structural findings for one network at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct AnalysisReport {
    pub id: Uuid,
    pub network_id: Uuid,
    pub centrality_score: f64,
    pub analyzed_at: DateTime<Utc>,
    pub isolated_nodes: Vec<Uuid>,
    pub redundant_links: Vec<DevicePair>,
    pub recommendations: Vec<String>,
}

impl AnalysisReport {
    pub fn has_issues(&self) -> bool {
        !self.isolated_nodes.is_empty() || !self.redundant_links.is_empty()
    }

    pub fn issue_count(&self) -> usize {
        self.isolated_nodes.len() + self.redundant_links.len()
    }

    /// Attach recommendation text, consuming the report
    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_ignores_direction() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(DevicePair::canonical(a, b), DevicePair::canonical(b, a));
        let pair = DevicePair::canonical(a, b);
        assert!(pair.0 <= pair.1);
        assert!(pair.contains(a) && pair.contains(b));
    }

    #[test]
    fn issue_count_sums_both_findings() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let report = AnalysisReport {
            id: Uuid::new_v4(),
            network_id: Uuid::new_v4(),
            centrality_score: 0.5,
            analyzed_at: Utc::now(),
            isolated_nodes: vec![a],
            redundant_links: vec![DevicePair::canonical(a, b), DevicePair::canonical(a, b)],
            recommendations: Vec::new(),
        };
        assert!(report.has_issues());
        assert_eq!(report.issue_count(), 3);

        let clean = AnalysisReport {
            isolated_nodes: Vec::new(),
            redundant_links: Vec::new(),
            ..report
        };
        assert!(!clean.has_issues());
        assert_eq!(clean.issue_count(), 0);
    }
}
