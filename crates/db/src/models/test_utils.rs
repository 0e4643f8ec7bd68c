use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use uuid::Uuid;

use super::network::CreateNetwork;
use crate::repositories::NetworkRepository;

pub(crate) async fn setup_test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("invalid sqlite config")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("failed to open sqlite memory db");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

pub(crate) async fn create_test_network(pool: &SqlitePool) -> Uuid {
    let data = CreateNetwork {
        name: format!("Test Network {}", Uuid::new_v4()),
        description: None,
        owner: Some("tester".into()),
    };

    NetworkRepository::create(pool, &data)
        .await
        .expect("failed to create test network")
        .id
}
