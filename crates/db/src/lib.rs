use std::{path::Path, str::FromStr};

use sqlx::{
    Error, Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use utils::assets::database_path;

pub mod models;
pub mod repositories;
pub mod services;
pub mod store;

pub use store::SqliteNetworkStore;

#[derive(Clone)]
pub struct DBService {
    pub pool: Pool<Sqlite>,
}

impl DBService {
    /// Open the database in the asset directory
    pub async fn new() -> Result<DBService, Error> {
        let path = database_path().map_err(Error::Io)?;
        Self::open(&path).await
    }

    /// Open (creating if needed) the database at `path` and apply migrations
    pub async fn open(path: &Path) -> Result<DBService, Error> {
        let database_url = format!("sqlite://{}", path.to_string_lossy());
        let options = SqliteConnectOptions::from_str(&database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database ready at {}", path.display());
        Ok(DBService { pool })
    }

    /// Private in-memory database, used by tests and dry runs
    pub async fn in_memory() -> Result<DBService, Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(DBService { pool })
    }

    pub fn network_store(&self) -> SqliteNetworkStore {
        SqliteNetworkStore::new(self.pool.clone())
    }
}
