// Device and adjacency database repository
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use topology::Device;
use uuid::Uuid;

use crate::models::{device::DeviceRow, device_connection::DeviceConnectionRow};

pub struct DeviceRepository;

impl DeviceRepository {
    /// Devices in the order they were loaded
    pub async fn list_by_network<'e, E>(
        executor: E,
        network_id: Uuid,
    ) -> Result<Vec<DeviceRow>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, DeviceRow>(
            "SELECT * FROM devices WHERE network_id = ?1 ORDER BY position",
        )
        .bind(network_id)
        .fetch_all(executor)
        .await
    }

    /// Directed adjacency entries in write order
    pub async fn list_connections<'e, E>(
        executor: E,
        network_id: Uuid,
    ) -> Result<Vec<DeviceConnectionRow>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, DeviceConnectionRow>(
            "SELECT * FROM device_connections WHERE network_id = ?1 ORDER BY id",
        )
        .bind(network_id)
        .fetch_all(executor)
        .await
    }

    /// Append one unconnected device after the network's last position
    pub async fn insert_one(
        pool: &SqlitePool,
        network_id: Uuid,
        device: &Device,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO devices (id, network_id, name, status, device_type, position)
            VALUES (
                ?1, ?2, ?3, ?4, ?5,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM devices WHERE network_id = ?2)
            )
            "#,
        )
        .bind(device.id)
        .bind(network_id)
        .bind(&device.name)
        .bind(device.status.to_string())
        .bind(device.device_type.to_string())
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn insert_many(
        conn: &mut SqliteConnection,
        network_id: Uuid,
        devices: &[Device],
    ) -> Result<usize, sqlx::Error> {
        for (position, device) in devices.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO devices (id, network_id, name, status, device_type, position)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(device.id)
            .bind(network_id)
            .bind(&device.name)
            .bind(device.status.to_string())
            .bind(device.device_type.to_string())
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
        }
        Ok(devices.len())
    }

    pub async fn insert_connections(
        conn: &mut SqliteConnection,
        network_id: Uuid,
        connections: &[(Uuid, Uuid)],
    ) -> Result<usize, sqlx::Error> {
        for (from, to) in connections {
            sqlx::query(
                r#"
                INSERT INTO device_connections (network_id, from_device_id, to_device_id)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(network_id)
            .bind(from)
            .bind(to)
            .execute(&mut *conn)
            .await?;
        }
        Ok(connections.len())
    }

    /// Removes every device of a network; connections go with them
    pub async fn delete_by_network(
        conn: &mut SqliteConnection,
        network_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM devices WHERE network_id = ?1")
            .bind(network_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Removes one device and every connection touching it
    pub async fn delete(
        pool: &SqlitePool,
        network_id: Uuid,
        device_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM devices WHERE network_id = ?1 AND id = ?2")
            .bind(network_id)
            .bind(device_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
