// SQLite-backed store for saved startups.

use crate::core::saved_startups::{SavedStartup, SavedStartupError, SavedStartupStore};
use crate::infra::database::{decode_timestamp, encode_timestamp, Database};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use std::sync::Arc;

pub struct SqliteSavedStartupStore {
    db: Arc<Database>,
}

fn storage_error(e: impl ToString) -> SavedStartupError {
    SavedStartupError::StorageError(e.to_string())
}

impl SqliteSavedStartupStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn pool(&self) -> Result<Pool<Sqlite>, SavedStartupError> {
        self.db.pool().await.map_err(storage_error)
    }

    pub async fn migrate(&self) -> Result<(), SavedStartupError> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS saved_startups (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                startup_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, startup_id)
            );
            "#,
        )
        .execute(&pool)
        .await;
        self.db.observe(result).await.map_err(storage_error)?;
        Ok(())
    }

    fn row_to_saved(row: &SqliteRow) -> Result<SavedStartup, SavedStartupError> {
        let created_at: String = row.get("created_at");
        Ok(SavedStartup {
            id: row.get("id"),
            user_id: row.get("user_id"),
            startup_id: row.get("startup_id"),
            created_at: decode_timestamp(&created_at).map_err(storage_error)?,
        })
    }
}

#[async_trait]
impl SavedStartupStore for SqliteSavedStartupStore {
    async fn find(
        &self,
        user_id: i64,
        startup_id: i64,
    ) -> Result<Option<SavedStartup>, SavedStartupError> {
        let pool = self.pool().await?;
        let result =
            sqlx::query("SELECT * FROM saved_startups WHERE user_id = ? AND startup_id = ?")
                .bind(user_id)
                .bind(startup_id)
                .fetch_optional(&pool)
                .await;
        let row = self.db.observe(result).await.map_err(storage_error)?;
        row.as_ref().map(Self::row_to_saved).transpose()
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<SavedStartup>, SavedStartupError> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            "SELECT * FROM saved_startups WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&pool)
        .await;
        let rows = self.db.observe(result).await.map_err(storage_error)?;
        rows.iter().map(Self::row_to_saved).collect()
    }

    async fn insert(
        &self,
        user_id: i64,
        startup_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<SavedStartup, SavedStartupError> {
        let pool = self.pool().await?;

        // A double click may race two inserts; the unique pair keeps one row.
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO saved_startups (user_id, startup_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(startup_id)
        .bind(encode_timestamp(created_at))
        .execute(&pool)
        .await;
        self.db.observe(result).await.map_err(storage_error)?;

        self.find(user_id, startup_id)
            .await?
            .ok_or_else(|| storage_error("saved startup vanished after insert"))
    }

    async fn delete(&self, id: i64) -> Result<(), SavedStartupError> {
        let pool = self.pool().await?;
        let result = sqlx::query("DELETE FROM saved_startups WHERE id = ?")
            .bind(id)
            .execute(&pool)
            .await;
        self.db.observe(result).await.map_err(storage_error)?;
        Ok(())
    }
}
