use anyhow::Context;
use db::DBService;
use server::{AppState, config::ServerConfig, routes};
use tracing_subscriber::{EnvFilter, prelude::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,server={level},topology={level},db={level},utils={level},tower_http={level}",
        level = log_level
    );
    let env_filter = EnvFilter::try_new(filter_string).context("invalid tracing filter")?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let config = ServerConfig::from_env()?;
    let db = DBService::open(&config.database)
        .await
        .with_context(|| format!("opening database {}", config.database.display()))?;

    let app_router = routes::router(AppState::new(db, config.analysis.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    let address = listener.local_addr()?;
    tracing::info!("Server running on http://{address}");

    axum::serve(listener, app_router).await?;
    Ok(())
}
