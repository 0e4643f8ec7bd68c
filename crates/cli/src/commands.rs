//! CLI subcommand handlers
//!
//! Each handler works against a local database through the same
//! [`TopologyService`] the HTTP server uses.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use db::{
    DBService, SqliteNetworkStore,
    models::{
        data_source::{CreateDataSource, DataSourceError},
        device::CreateDevice,
        network::CreateNetwork,
    },
    repositories::{DataSourceRepository, NetworkRepository},
    services::NetworkOverviewService,
};
use topology::{
    DataSource, DataSourceType, DeviceStatus, DeviceType, IngestionBatch, TopologyService,
    datasets,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{config::Config, output::OutputHandler};

/// Open database plus the service driving it
pub struct Workspace {
    db: DBService,
    service: TopologyService<SqliteNetworkStore>,
    config: Config,
    output: OutputHandler,
}

impl Workspace {
    pub async fn open(config: Config, database: &Path) -> Result<Self> {
        let db = DBService::open(database)
            .await
            .with_context(|| format!("opening database {}", database.display()))?;
        Ok(Self::with_db(db, config))
    }

    fn with_db(db: DBService, config: Config) -> Self {
        let service = TopologyService::new(db.network_store(), config.analysis.clone());
        Self {
            db,
            service,
            config,
            output: OutputHandler::new(),
        }
    }

    /// Accept either a network id or an exact network name
    pub async fn resolve_network(&self, reference: &str) -> Result<Uuid> {
        if let Ok(id) = Uuid::parse_str(reference) {
            return match NetworkRepository::find_by_id(&self.db.pool, id).await? {
                Some(_) => Ok(id),
                None => bail!("Network not found: {}", reference),
            };
        }

        let matches: Vec<Uuid> = NetworkRepository::list(&self.db.pool, None)
            .await?
            .into_iter()
            .filter(|n| n.name == reference)
            .map(|n| n.id)
            .collect();

        match matches.as_slice() {
            [id] => Ok(*id),
            [] => bail!("Network not found: {}", reference),
            _ => bail!(
                "{} networks are named {:?}; refer to one by id",
                matches.len(),
                reference
            ),
        }
    }
}

/// Read an ingestion batch from a JSON file
pub fn read_batch(path: &Path) -> Result<IngestionBatch> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing batch {}", path.display()))
}

pub async fn create_network(
    ws: &Workspace,
    name: &str,
    description: Option<String>,
    owner: Option<String>,
) -> Result<Uuid> {
    if name.trim().is_empty() {
        bail!("Network name must not be empty");
    }
    let data = CreateNetwork {
        name: name.trim().to_string(),
        description,
        owner,
    };
    let network = NetworkRepository::create(&ws.db.pool, &data).await?;
    tracing::info!(network_id = %network.id, "network created");
    ws.output
        .print_success(&format!("Created network {} ({})", network.name, network.id));
    Ok(network.id)
}

pub async fn list_networks(ws: &Workspace, owner: Option<&str>) -> Result<()> {
    ws.output.print_header("Networks");
    let networks = NetworkRepository::list(&ws.db.pool, owner).await?;
    if networks.is_empty() {
        ws.output.print_info("No networks found.");
        return Ok(());
    }
    ws.output.print_networks_table(&networks);
    Ok(())
}

pub async fn show_network(ws: &Workspace, reference: &str) -> Result<()> {
    let network_id = ws.resolve_network(reference).await?;
    let overview =
        NetworkOverviewService::load(&ws.db.pool, network_id, &ws.config.analysis, Utc::now())
            .await?;
    ws.output.print_overview(&overview);
    Ok(())
}

pub async fn delete_network(ws: &Workspace, reference: &str) -> Result<()> {
    let network_id = ws.resolve_network(reference).await?;
    if ws.service.store().delete_network(network_id).await? {
        ws.output.print_success(&format!("Deleted network {}", network_id));
    } else {
        ws.output.print_warning("Network was already gone");
    }
    Ok(())
}

/// List the built-in datasets; needs no database
pub fn list_datasets() {
    let output = OutputHandler::new();
    output.print_header("Sample datasets");
    output.print_datasets_table(&datasets::catalog());
}

pub async fn load(
    ws: &Workspace,
    reference: &str,
    dataset: Option<&str>,
    file: Option<&Path>,
) -> Result<()> {
    let network_id = ws.resolve_network(reference).await?;
    let summary = match (dataset, file) {
        (Some(name), None) => ws.service.load_dataset(network_id, name).await?,
        (None, Some(path)) => ws.service.ingest(network_id, read_batch(path)?).await?,
        _ => bail!("Specify exactly one of --dataset or --file"),
    };
    ws.output.print_ingestion(&summary);
    Ok(())
}

pub async fn analyze(ws: &Workspace, reference: &str, json: bool) -> Result<()> {
    let network_id = ws.resolve_network(reference).await?;
    let result = ws.service.analyze(network_id).await;
    if !json {
        ws.output.print_analysis(&result?);
        return Ok(());
    }

    // Same envelope the HTTP API returns, failures included
    let envelope = ApiResponse::from_result(result);
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    if !envelope.is_success() {
        bail!("analysis failed");
    }
    Ok(())
}

pub async fn history(ws: &Workspace, reference: &str, limit: Option<i64>) -> Result<()> {
    let limit = limit.unwrap_or(ws.config.analysis.recent_reports_limit);
    if limit <= 0 {
        bail!("--limit must be positive");
    }
    let network_id = ws.resolve_network(reference).await?;
    let reports = ws.service.recent_reports(network_id, limit).await?;

    ws.output.print_header("Analysis history");
    if reports.is_empty() {
        ws.output.print_info("No analyses yet.");
        return Ok(());
    }
    ws.output.print_history_table(&reports);
    Ok(())
}

pub async fn remove_device(ws: &Workspace, reference: &str, device_id: Uuid) -> Result<()> {
    let network_id = ws.resolve_network(reference).await?;
    if !ws.service.store().remove_device(network_id, device_id).await? {
        bail!("Device not found: {}", device_id);
    }
    ws.output
        .print_success(&format!("Removed device {} and its connections", device_id));
    Ok(())
}

pub async fn add_device(
    ws: &Workspace,
    reference: &str,
    name: &str,
    device_type: DeviceType,
    status: DeviceStatus,
) -> Result<Uuid> {
    if name.trim().is_empty() {
        bail!("Device name must not be empty");
    }
    let network_id = ws.resolve_network(reference).await?;
    let data = CreateDevice {
        name: name.trim().to_string(),
        device_type,
        status,
    };
    let Some(device) = ws.service.store().add_device(network_id, data).await? else {
        bail!("Network not found: {}", reference);
    };
    ws.output
        .print_success(&format!("Added {} {} ({})", device.device_type, device.name, device.id));
    Ok(device.id)
}

pub async fn add_data_source(
    ws: &Workspace,
    reference: &str,
    name: &str,
    source_type: DataSourceType,
) -> Result<Uuid> {
    if name.trim().is_empty() {
        bail!("Data source name must not be empty");
    }
    let network_id = ws.resolve_network(reference).await?;
    let data = CreateDataSource {
        name: name.trim().to_string(),
        source_type,
        last_update: None,
    };
    let Some(source) = ws
        .service
        .store()
        .add_data_source(network_id, data, Utc::now())
        .await?
    else {
        bail!("Network not found: {}", reference);
    };
    ws.output
        .print_success(&format!("Added {} source {} ({})", source.source_type, source.name, source.id));
    Ok(source.id)
}

pub async fn remove_data_source(ws: &Workspace, id: Uuid) -> Result<()> {
    if !ws.service.store().remove_data_source(id).await? {
        bail!("Data source not found: {}", id);
    }
    ws.output.print_success(&format!("Removed data source {}", id));
    Ok(())
}

/// Mark a data source as updated now
pub async fn refresh_data_source(ws: &Workspace, id: Uuid) -> Result<DataSource> {
    let now = Utc::now();
    let row = DataSourceRepository::touch(&ws.db.pool, id, now)
        .await?
        .ok_or(DataSourceError::NotFound)?;
    let source = DataSource::try_from(row)?;
    ws.output.print_success(&format!("Refreshed {} ({})", source.name, source.id));
    if source.needs_update(now, ws.config.analysis.stale_after_hours) {
        ws.output.print_warning("Still stale under the configured threshold");
    }
    Ok(source)
}

/// Show current configuration
pub fn show_config(config: &Config, path: &Path) {
    let output = OutputHandler::new();
    output.print_header("Configuration");

    let mut section = "";
    for &key in Config::KEYS {
        let (table, name) = key.split_once('.').unwrap_or(("", key));
        if table != section {
            println!();
            println!("  [{}]", table);
            section = table;
        }
        let value = config.get(key).unwrap_or_else(|| "not set".to_string());
        println!("    {} = {}", name, value);
    }

    println!();
    println!("  Config file: {}", path.display());
}

/// Set a configuration value given as `key=value`
pub fn set_config(path: &Path, kv: &str) -> Result<()> {
    let Some((key, value)) = kv.split_once('=') else {
        bail!("Invalid format. Use: key=value");
    };
    let key = key.trim();
    let value = value.trim().trim_matches('"');

    let mut config = Config::load_from(path)?;
    config.set(key, value)?;
    config.save_to(path)?;
    OutputHandler::new().print_success(&format!("Set {} = \"{}\"", key, value));
    Ok(())
}
