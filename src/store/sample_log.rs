//! Append-only sample history backed by SQLite.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

use super::StoreError;

const CREATE_SAMPLES: &str = r#"
CREATE TABLE IF NOT EXISTS samples (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    temperature REAL NOT NULL,
    humidity REAL NOT NULL,
    time TEXT NOT NULL,
    warning_level TEXT NOT NULL
)
"#;

const SELECT_COLUMNS: &str = "SELECT id, temperature, humidity, time, warning_level FROM samples";

/// One persisted sample row.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct SampleRecord {
    pub id: i64,
    pub temperature: f64,
    pub humidity: f64,
    /// Formatted local time of the observation
    pub time: String,
    /// Tier label at the time of the observation
    pub warning_level: String,
}

/// Append-only sample log. Rows are never updated or deleted; each append
/// commits independently, so an earlier failure never loses later rows.
/// Clones share the underlying connection pool.
#[derive(Clone)]
pub struct SampleLog {
    pool: SqlitePool,
}

impl SampleLog {
    /// Open (creating if needed) the sample database at `path`.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// In-memory database for tests.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        // A single long-lived connection: every pooled connection to
        // ":memory:" would otherwise get its own empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(CREATE_SAMPLES).execute(pool).await?;
        Ok(())
    }

    /// Append one sample and return its assigned id.
    pub async fn append(
        &self,
        temperature: f64,
        humidity: f64,
        time: &str,
        warning_level: &str,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO samples (temperature, humidity, time, warning_level) VALUES (?, ?, ?, ?)",
        )
        .bind(temperature)
        .bind(humidity)
        .bind(time)
        .bind(warning_level)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// All samples, most recent first.
    pub async fn list_all(&self) -> Result<Vec<SampleRecord>, StoreError> {
        let rows = sqlx::query_as::<_, SampleRecord>(&format!("{SELECT_COLUMNS} ORDER BY id DESC"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// The `n` most recent samples in chronological order, for trend display.
    pub async fn last_n(&self, n: u32) -> Result<Vec<SampleRecord>, StoreError> {
        let mut rows =
            sqlx::query_as::<_, SampleRecord>(&format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT ?"))
                .bind(n)
                .fetch_all(&self.pool)
                .await?;
        rows.reverse();
        Ok(rows)
    }

    /// Most recent sample, if any.
    pub async fn latest(&self) -> Result<Option<SampleRecord>, StoreError> {
        let row =
            sqlx::query_as::<_, SampleRecord>(&format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT 1"))
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }
}
