// SQLite-backed startup store.
//
// Tables:
// - startups: listings with their moderation outcome flattened into columns.
//   `moderation_score` is NULL for legacy listings created before moderation.

use crate::core::approval::{ApprovalError, NewStartup, Startup, StartupStatus, StartupStore};
use crate::core::moderation::ModerationResult;
use crate::infra::database::{decode_timestamp, encode_timestamp, Database};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use std::sync::Arc;

pub struct SqliteStartupStore {
    db: Arc<Database>,
}

fn storage_error(e: impl ToString) -> ApprovalError {
    ApprovalError::StorageError(e.to_string())
}

impl SqliteStartupStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn pool(&self) -> Result<Pool<Sqlite>, ApprovalError> {
        self.db.pool().await.map_err(storage_error)
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), ApprovalError> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS startups (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                tagline TEXT NOT NULL,
                logo TEXT NOT NULL DEFAULT '',
                industry TEXT,
                problem TEXT,
                solution TEXT,
                value_proposition TEXT,
                business_model TEXT,
                funding_goal INTEGER NOT NULL DEFAULT 0,
                funding_raised INTEGER NOT NULL DEFAULT 0,
                investor_count INTEGER NOT NULL DEFAULT 0,
                minimum_investment INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'pending',
                moderation_score INTEGER,
                moderation_approved BOOLEAN,
                moderation_reason TEXT,
                moderation_flags TEXT,
                created_at TEXT NOT NULL,
                approved_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_startups_status_created
                ON startups(status, created_at);
            "#,
        )
        .execute(&pool)
        .await;
        self.db.observe(result).await.map_err(storage_error)?;
        Ok(())
    }

    fn row_to_startup(row: &SqliteRow) -> Result<Startup, ApprovalError> {
        let status: String = row.get("status");
        let created_at: String = row.get("created_at");
        let approved_at: Option<String> = row.get("approved_at");

        let moderation = match row.get::<Option<i64>, _>("moderation_score") {
            Some(score) => {
                let flags: Option<String> = row.get("moderation_flags");
                let flags: Vec<String> = flags
                    .as_deref()
                    .map(|f| serde_json::from_str::<Vec<String>>(f))
                    .transpose()
                    .map_err(storage_error)?
                    .unwrap_or_default();
                let reason: Option<String> = row.get("moderation_reason");
                Some(ModerationResult::from_score(
                    score.clamp(0, 100) as u8,
                    reason.unwrap_or_default(),
                    flags,
                ))
            }
            None => None,
        };

        Ok(Startup {
            id: row.get("id"),
            owner_id: row.get("owner_id"),
            name: row.get("name"),
            tagline: row.get("tagline"),
            logo: row.get("logo"),
            industry: row.get("industry"),
            problem: row.get("problem"),
            solution: row.get("solution"),
            value_proposition: row.get("value_proposition"),
            business_model: row.get("business_model"),
            funding_goal: row.get("funding_goal"),
            funding_raised: row.get("funding_raised"),
            investor_count: row.get("investor_count"),
            minimum_investment: row.get("minimum_investment"),
            status: status.parse::<StartupStatus>().map_err(storage_error)?,
            moderation,
            created_at: decode_timestamp(&created_at).map_err(storage_error)?,
            approved_at: approved_at
                .as_deref()
                .map(decode_timestamp)
                .transpose()
                .map_err(storage_error)?,
        })
    }
}

#[async_trait]
impl StartupStore for SqliteStartupStore {
    async fn insert(&self, new: NewStartup) -> Result<Startup, ApprovalError> {
        let pool = self.pool().await?;
        let flags = serde_json::to_string(&new.moderation.flags).map_err(storage_error)?;

        let result = sqlx::query(
            r#"
            INSERT INTO startups (
                owner_id, name, tagline, logo, industry, problem, solution,
                value_proposition, business_model, funding_goal, minimum_investment,
                status, moderation_score, moderation_approved, moderation_reason,
                moderation_flags, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.owner_id)
        .bind(&new.content.name)
        .bind(&new.content.tagline)
        .bind(&new.logo)
        .bind(&new.content.industry)
        .bind(&new.content.problem)
        .bind(&new.content.solution)
        .bind(&new.content.value_proposition)
        .bind(&new.content.business_model)
        .bind(new.funding_goal)
        .bind(new.minimum_investment)
        .bind(StartupStatus::Pending.as_str())
        .bind(new.moderation.score as i64)
        .bind(new.moderation.approved)
        .bind(&new.moderation.reason)
        .bind(&flags)
        .bind(encode_timestamp(new.created_at))
        .execute(&pool)
        .await;
        let id = self
            .db
            .observe(result)
            .await
            .map_err(storage_error)?
            .last_insert_rowid();

        self.get(id)
            .await?
            .ok_or_else(|| storage_error(format!("startup {} vanished after insert", id)))
    }

    async fn get(&self, id: i64) -> Result<Option<Startup>, ApprovalError> {
        let pool = self.pool().await?;
        let result = sqlx::query("SELECT * FROM startups WHERE id = ?")
            .bind(id)
            .fetch_optional(&pool)
            .await;
        let row = self.db.observe(result).await.map_err(storage_error)?;

        row.as_ref().map(Self::row_to_startup).transpose()
    }

    async fn approve_eligible(
        &self,
        created_before: DateTime<Utc>,
        min_score: u8,
        approved_at: DateTime<Utc>,
    ) -> Result<u64, ApprovalError> {
        let pool = self.pool().await?;

        // One statement: SQLite applies it atomically, and the status check
        // keeps concurrent sweeps from touching the same row twice.
        let result = sqlx::query(
            r#"
            UPDATE startups
            SET status = 'approved', approved_at = ?
            WHERE status = 'pending'
              AND created_at <= ?
              AND (moderation_score IS NULL OR moderation_score >= ?)
            "#,
        )
        .bind(encode_timestamp(approved_at))
        .bind(encode_timestamp(created_before))
        .bind(min_score as i64)
        .execute(&pool)
        .await;

        let done = self.db.observe(result).await.map_err(storage_error)?;
        Ok(done.rows_affected())
    }
}
