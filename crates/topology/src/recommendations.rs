//! Human-readable guidance derived from an analysis report

use crate::config::AnalysisConfig;
use crate::report::AnalysisReport;

pub const HEALTHY_MESSAGE: &str = "The network is in good shape. No serious issues were found.";

/// Threshold-based recommendation rules
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: AnalysisConfig,
}

impl RecommendationEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Every applicable rule contributes one line, in a fixed order.
    /// A report that triggers nothing gets a single healthy message.
    /// The centrality rules are independent, so an inverted threshold pair
    /// can produce both lines.
    pub fn recommend(&self, report: &AnalysisReport) -> Vec<String> {
        let mut lines = Vec::new();

        if !report.isolated_nodes.is_empty() {
            lines.push(format!(
                "Found {} isolated device(s). Check their network connection or remove them if they are no longer used.",
                report.isolated_nodes.len()
            ));
        }

        if !report.redundant_links.is_empty() {
            lines.push(format!(
                "Found {} redundant link(s). Remove duplicate connections to simplify the network.",
                report.redundant_links.len()
            ));
        }

        let score = report.centrality_score;
        if score < self.config.low_centrality_threshold {
            lines.push(format!(
                "Low network centrality ({:.2}). Add more links between key devices.",
                score
            ));
        }
        if score > self.config.high_centrality_threshold {
            lines.push(format!(
                "High network centrality ({:.2}). The network may become a bottleneck; consider distributing the load.",
                score
            ));
        }

        if lines.is_empty() {
            lines.push(HEALTHY_MESSAGE.to_string());
        }

        lines
    }
}
