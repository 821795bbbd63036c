// Shared SQLite handle for every store.
//
// The pool is created on first use and reused afterwards. When a query fails
// with a connection-level error the pool is closed and dropped, so the next
// call reconnects from scratch instead of reusing a broken pool.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use tokio::sync::Mutex;

pub struct Database {
    url: String,
    pool: Mutex<Option<Pool<Sqlite>>>,
}

impl Database {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool: Mutex::new(None),
        }
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }

    /// The current pool, connecting first if there is none.
    pub async fn pool(&self) -> Result<Pool<Sqlite>, sqlx::Error> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            if !pool.is_closed() {
                return Ok(pool.clone());
            }
        }

        let options = SqliteConnectOptions::from_str(&self.url)?.create_if_missing(true);

        // Make sure the folder for the database file exists.
        if !self.is_in_memory() {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() && !Path::new(parent).exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        // An in-memory database only lives as long as its one connection.
        let pool_options = if self.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        tracing::info!("Connected to database");
        *guard = Some(pool.clone());
        Ok(pool)
    }

    /// Pass a query result through, tearing the pool down if the error means
    /// the connection itself is unusable.
    pub async fn observe<T>(&self, result: Result<T, sqlx::Error>) -> Result<T, sqlx::Error> {
        if let Err(err) = &result {
            if is_fatal(err) {
                tracing::warn!("Database connection failed, resetting pool: {}", err);
                self.teardown().await;
            }
        }
        result
    }

    /// Close and forget the current pool. The next `pool()` call reconnects.
    pub async fn teardown(&self) {
        let pool = self.pool.lock().await.take();
        if let Some(pool) = pool {
            pool.close().await;
        }
    }
}

fn is_fatal(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

/// Timestamps are stored as fixed-width RFC 3339 text so that string order
/// matches time order inside SQL comparisons.
pub fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn decode_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{}': {}", value, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_pool_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("nested/app.db").display());
        let db = Database::new(url);

        let first = db.pool().await.unwrap();
        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(&first)
            .await
            .unwrap();

        let second = db.pool().await.unwrap();
        sqlx::query("INSERT INTO t (x) VALUES (1)")
            .execute(&second)
            .await
            .unwrap();
        assert!(dir.path().join("nested/app.db").exists());
    }

    #[tokio::test]
    async fn test_teardown_forces_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(format!("sqlite://{}", dir.path().join("app.db").display()));

        let first = db.pool().await.unwrap();
        db.teardown().await;
        assert!(first.is_closed());

        let second = db.pool().await.unwrap();
        assert!(!second.is_closed());
    }

    #[tokio::test]
    async fn test_fatal_error_resets_pool() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(format!("sqlite://{}", dir.path().join("app.db").display()));
        let pool = db.pool().await.unwrap();

        let result: Result<(), sqlx::Error> = Err(sqlx::Error::PoolTimedOut);
        assert!(db.observe(result).await.is_err());
        assert!(pool.is_closed());

        // Query errors keep the pool.
        let pool = db.pool().await.unwrap();
        let result: Result<(), sqlx::Error> = Err(sqlx::Error::RowNotFound);
        assert!(db.observe(result).await.is_err());
        assert!(!pool.is_closed());
    }

    #[test]
    fn test_timestamps_sort_as_text() {
        let earlier = Utc::now();
        let later = earlier + Duration::milliseconds(1500);
        assert!(encode_timestamp(earlier) < encode_timestamp(later));

        let decoded = decode_timestamp(&encode_timestamp(earlier)).unwrap();
        assert_eq!(decoded.timestamp_millis(), earlier.timestamp_millis());
        assert!(decode_timestamp("yesterday").is_err());
    }
}
