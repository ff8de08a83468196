use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use tracing::{debug, info};

use crate::errors::Result;
use crate::model::{NewReading, Reading};

/// Row count returned by [`Store::query_latest`] when the caller does not ask for one.
pub const DEFAULT_LATEST_LIMIT: u32 = 50;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub busy_timeout: Duration,
}

/// Append-only log of readings backed by a SQLite table.
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens the database, creating the file if it does not exist.
    ///
    /// WAL lets readers run against a committed snapshot while a write is in
    /// progress; `synchronous = FULL` makes every acknowledged append durable.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        info!("Connecting to database...");
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;

        info!("Database connection established");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the schema if absent. Safe to run on every startup.
    pub async fn init(&self) -> Result<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Migrations completed");
        Ok(())
    }

    /// Inserts one reading and returns its id.
    pub async fn append(&self, reading: &NewReading) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO sensor_data (timestamp, temperature, humidity, pressure, lux)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&reading.timestamp)
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(reading.pressure)
        .bind(reading.lux)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, timestamp = %reading.timestamp, "Reading appended");
        Ok(id)
    }

    /// Readings with `start <= timestamp <= end`, oldest first.
    ///
    /// Bounds must already be canonical; see [`crate::time::normalize`].
    pub async fn query_range(&self, start: &str, end: &str) -> Result<Vec<Reading>> {
        let rows = sqlx::query_as::<_, Reading>(
            r#"
            SELECT id, timestamp, temperature, humidity, pressure, lux
            FROM sensor_data
            WHERE timestamp BETWEEN ? AND ?
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// The `limit` most recently appended readings, oldest first.
    pub async fn query_latest(&self, limit: u32) -> Result<Vec<Reading>> {
        let mut rows = sqlx::query_as::<_, Reading>(
            r#"
            SELECT id, timestamp, temperature, humidity, pressure, lux
            FROM sensor_data
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.reverse();
        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sensor_data")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection closed");
    }
}
