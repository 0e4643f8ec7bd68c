//! Output formatting and terminal rendering

use colored::{ColoredString, Colorize};
use db::models::network::NetworkRow;
use db::services::NetworkOverview;
use topology::datasets::DatasetInfo;
use topology::{AnalysisReport, AnalysisView, DeviceStatus, IngestionSummary};

/// Shorten `text` to `width` characters, marking the cut with "..."
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// First eight characters of an id, enough to tell rows apart
fn short_id(id: &str) -> &str {
    &id[..8.min(id.len())]
}

fn status_colored(status: DeviceStatus) -> ColoredString {
    let text = status.to_string();
    match status {
        DeviceStatus::Active => text.bright_green(),
        DeviceStatus::Inactive => text.dimmed(),
        DeviceStatus::Maintenance => text.bright_yellow(),
    }
}

#[derive(Default)]
pub struct OutputHandler;

impl OutputHandler {
    pub fn new() -> Self {
        Self
    }

    /// Print a section header
    pub fn print_header(&self, text: &str) {
        println!();
        println!("{}", format!("▶ {}", text).bright_yellow().bold());
        println!("{}", "─".repeat(60).dimmed());
    }

    pub fn print_success(&self, text: &str) {
        println!("{} {}", "✓".bright_green(), text.bright_white());
    }

    pub fn print_warning(&self, text: &str) {
        println!("{} {}", "⚠".bright_yellow(), text.yellow());
    }

    pub fn print_info(&self, text: &str) {
        println!("{} {}", "ℹ".bright_blue(), text);
    }

    pub fn print_networks_table(&self, networks: &[NetworkRow]) {
        println!();
        println!(
            "{}",
            format!("{:<36} {:<30} {:<16} {:>12}", "ID", "Name", "Owner", "Created")
                .bright_white()
                .bold()
        );
        println!("{}", "─".repeat(98).dimmed());

        for network in networks {
            println!(
                "{:<36} {:<30} {:<16} {:>12}",
                network.id.to_string().dimmed(),
                truncate(&network.name, 30).bright_white(),
                network.owner.as_deref().unwrap_or("-"),
                network.created_at.format("%Y-%m-%d").to_string().dimmed()
            );
        }
        println!();
    }

    pub fn print_datasets_table(&self, datasets: &[DatasetInfo]) {
        println!();
        println!(
            "{}",
            format!(
                "{:<20} {:>8} {:>12} {:>8}  {}",
                "Name", "Devices", "Connections", "Sources", "Description"
            )
            .bright_white()
            .bold()
        );
        println!("{}", "─".repeat(100).dimmed());

        for dataset in datasets {
            println!(
                "{:<20} {:>8} {:>12} {:>8}  {}",
                dataset.name.bright_cyan(),
                dataset.devices,
                dataset.connections,
                dataset.data_sources,
                dataset.description.dimmed()
            );
        }
        println!();
    }

    pub fn print_overview(&self, overview: &NetworkOverview) {
        let network = &overview.network;
        self.print_header(&network.name);
        println!("  {} {}", "ID:".dimmed(), network.id);
        if !network.description.is_empty() {
            println!("  {} {}", "Description:".dimmed(), network.description);
        }
        if let Some(owner) = &network.owner {
            println!("  {} {}", "Owner:".dimmed(), owner);
        }

        let stats = &overview.stats;
        println!(
            "  {} {} devices ({} active), {} connections, {} data sources ({} stale)",
            "Stats:".dimmed(),
            stats.total_devices,
            stats.active_devices,
            stats.total_connections,
            stats.total_data_sources,
            stats.stale_data_sources
        );

        if !overview.devices.is_empty() {
            println!();
            println!(
                "{}",
                format!(
                    "{:<10} {:<30} {:<12} {:<12} {:>6}",
                    "ID", "Device", "Type", "Status", "Links"
                )
                .bright_white()
                .bold()
            );
            println!("{}", "─".repeat(74).dimmed());
            for entry in &overview.devices {
                let device = &entry.device;
                let id = device.id.to_string();
                println!(
                    "{:<10} {:<30} {:<12} {:<12} {:>6}",
                    short_id(&id).dimmed(),
                    truncate(&device.name, 30).bright_white(),
                    device.device_type.to_string(),
                    status_colored(device.status),
                    entry.connection_count
                );
            }
        }

        if !overview.data_sources.is_empty() {
            println!();
            for entry in &overview.data_sources {
                let source = &entry.data_source;
                let freshness = if entry.needs_update {
                    "needs update".bright_yellow()
                } else {
                    "fresh".bright_green()
                };
                println!(
                    "  {} {} ({}) last update {} {}",
                    "•".bright_cyan(),
                    source.name.bright_white(),
                    source.source_type,
                    source.last_update.format("%Y-%m-%d %H:%M"),
                    freshness
                );
            }
        }

        if let Some(latest) = overview.analyses.first() {
            println!();
            println!(
                "  {} {} (centrality {:.4}, {} issues)",
                "Last analysis:".dimmed(),
                latest.analyzed_at.format("%Y-%m-%d %H:%M"),
                latest.centrality_score,
                latest.issue_count()
            );
        }
        println!();
    }

    pub fn print_ingestion(&self, summary: &IngestionSummary) {
        self.print_success(&summary.message);
    }

    pub fn print_analysis(&self, view: &AnalysisView) {
        self.print_header(&format!("Analysis of {}", view.network_name));
        println!(
            "  {} {}",
            "Date:".dimmed(),
            view.analysis_date.format("%Y-%m-%d %H:%M:%S")
        );
        println!(
            "  {} {}",
            "Centrality:".dimmed(),
            format!("{:.4}", view.centrality_score).bright_cyan()
        );

        if view.has_issues {
            self.print_warning(&format!("{} issue(s) found", view.total_issues));
        } else {
            self.print_success("No structural issues");
        }

        if !view.isolated_nodes.is_empty() {
            println!();
            println!("  {}", "Isolated devices".bright_white().bold());
            for device in &view.isolated_nodes {
                println!(
                    "    {} {} ({}, {})",
                    "✗".bright_red(),
                    device.name,
                    device.device_type,
                    status_colored(device.status)
                );
            }
        }

        if !view.redundant_links.is_empty() {
            println!();
            println!("  {}", "Redundant links".bright_white().bold());
            for link in &view.redundant_links {
                println!(
                    "    {} {} ↔ {}",
                    "⚠".bright_yellow(),
                    link.device1_name,
                    link.device2_name
                );
            }
        }

        println!();
        println!("  {}", "Recommendations".bright_white().bold());
        for recommendation in &view.recommendations {
            println!("    {} {}", "→".bright_blue(), recommendation);
        }
        println!();
    }

    pub fn print_history_table(&self, reports: &[AnalysisReport]) {
        println!();
        println!(
            "{}",
            format!(
                "{:<10} {:<20} {:>10} {:>9} {:>10}",
                "ID", "Date", "Centrality", "Isolated", "Redundant"
            )
            .bright_white()
            .bold()
        );
        println!("{}", "─".repeat(63).dimmed());

        for report in reports {
            let id = report.id.to_string();
            let isolated = report.isolated_nodes.len().to_string();
            let redundant = report.redundant_links.len().to_string();
            println!(
                "{:<10} {:<20} {:>10} {:>9} {:>10}",
                short_id(&id).dimmed(),
                report.analyzed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                format!("{:.4}", report.centrality_score).bright_cyan(),
                if report.isolated_nodes.is_empty() {
                    isolated.normal()
                } else {
                    isolated.bright_red()
                },
                if report.redundant_links.is_empty() {
                    redundant.normal()
                } else {
                    redundant.bright_yellow()
                }
            );
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_marks_long_text() {
        assert_eq!(truncate("Gateway", 30), "Gateway");
        assert_eq!(truncate("Temperature Sensor Floor 2", 12), "Temperatu...");
        assert_eq!(truncate("Capteur de tempéra", 10), "Capteur...");
    }

    #[test]
    fn short_id_handles_short_input() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }
}
