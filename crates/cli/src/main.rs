//! iotgraph CLI - load IoT network topologies and analyze their structure
//!
//! Works directly against a local SQLite database, the same one the HTTP
//! server uses by default.

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use topology::{DataSourceType, DeviceStatus, DeviceType};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::{commands::Workspace, config::Config};

/// iotgraph - IoT topology analysis
#[derive(Parser)]
#[command(name = "iotgraph")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Load IoT network topologies and report on their structural health")]
#[command(long_about = r#"
Load device graphs into named networks and analyze them for isolated devices,
redundant links and overall connectivity.

Examples:
  iotgraph network create "Plant A" --owner ops
  iotgraph load "Plant A" --dataset industrial_plant
  iotgraph analyze "Plant A"
  iotgraph history "Plant A" --limit 3
"#)]
struct Cli {
    /// SQLite database file (overrides the config file)
    #[arg(long, global = true, env = "IOTGRAPH_DATABASE")]
    database: Option<PathBuf>,

    /// Config file location
    #[arg(long, global = true, env = "IOTGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage networks
    Network {
        #[command(subcommand)]
        action: NetworkAction,
    },

    /// List built-in sample datasets
    Datasets,

    /// Replace a network's devices, connections and data sources
    #[command(group(ArgGroup::new("source").required(true).args(["dataset", "file"])))]
    Load {
        /// Network name or ID
        network: String,

        /// Name of a built-in dataset
        #[arg(long)]
        dataset: Option<String>,

        /// JSON batch with devices, connections and data_sources
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Analyze a network and store the report
    Analyze {
        /// Network name or ID
        network: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent analysis reports, newest first
    History {
        /// Network name or ID
        network: String,

        /// Number of reports to show
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Manage devices
    Device {
        #[command(subcommand)]
        action: DeviceAction,
    },

    /// Manage data sources
    Source {
        #[command(subcommand)]
        action: SourceAction,
    },

    /// Configuration management
    Config {
        /// Set a configuration value (key=value)
        #[arg(long)]
        set: Option<String>,
    },
}

#[derive(Subcommand)]
enum NetworkAction {
    /// Create an empty network
    Create {
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        owner: Option<String>,
    },

    /// List networks
    List {
        /// Only networks with this owner
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Show devices, data sources and the latest analysis
    Show { network: String },

    /// Delete a network and everything it owns
    Delete { network: String },
}

#[derive(Subcommand)]
enum DeviceAction {
    /// Add one device with no connections
    Add {
        network: String,
        name: String,

        /// sensor, actuator, gateway or controller
        #[arg(long = "type")]
        device_type: DeviceType,

        #[arg(long, default_value = "active")]
        status: DeviceStatus,
    },

    /// Remove a device together with its connections
    Remove { network: String, device: Uuid },
}

#[derive(Subcommand)]
enum SourceAction {
    /// Attach a data source, last updated now
    Add {
        network: String,
        name: String,

        /// api, database, file or stream
        #[arg(long = "type")]
        source_type: DataSourceType,
    },

    /// Delete a data source
    Remove { id: Uuid },

    /// Mark a data source as updated now
    Refresh { id: Uuid },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("iotgraph_cli={0},topology={0},db={0},warn", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path)?;

    match &cli.command {
        Commands::Datasets => {
            commands::list_datasets();
            return Ok(());
        }
        Commands::Config { set: Some(kv) } => return commands::set_config(&config_path, kv),
        Commands::Config { set: None } => {
            commands::show_config(&config, &config_path);
            return Ok(());
        }
        _ => {}
    }

    let database = config.database_path(cli.database.as_deref())?;
    let ws = Workspace::open(config, &database).await?;

    match cli.command {
        Commands::Network { action } => match action {
            NetworkAction::Create {
                name,
                description,
                owner,
            } => {
                commands::create_network(&ws, &name, description, owner).await?;
            }
            NetworkAction::List { owner } => {
                commands::list_networks(&ws, owner.as_deref()).await?;
            }
            NetworkAction::Show { network } => commands::show_network(&ws, &network).await?,
            NetworkAction::Delete { network } => commands::delete_network(&ws, &network).await?,
        },
        Commands::Load {
            network,
            dataset,
            file,
        } => {
            commands::load(&ws, &network, dataset.as_deref(), file.as_deref()).await?;
        }
        Commands::Analyze { network, json } => commands::analyze(&ws, &network, json).await?,
        Commands::History { network, limit } => commands::history(&ws, &network, limit).await?,
        Commands::Device { action } => match action {
            DeviceAction::Add {
                network,
                name,
                device_type,
                status,
            } => {
                commands::add_device(&ws, &network, &name, device_type, status).await?;
            }
            DeviceAction::Remove { network, device } => {
                commands::remove_device(&ws, &network, device).await?
            }
        },
        Commands::Source { action } => match action {
            SourceAction::Add {
                network,
                name,
                source_type,
            } => {
                commands::add_data_source(&ws, &network, &name, source_type).await?;
            }
            SourceAction::Remove { id } => commands::remove_data_source(&ws, id).await?,
            SourceAction::Refresh { id } => {
                commands::refresh_data_source(&ws, id).await?;
            }
        },
        Commands::Datasets | Commands::Config { .. } => {}
    }

    Ok(())
}
