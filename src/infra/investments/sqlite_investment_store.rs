// SQLite-backed investment store.
//
// Tables:
// - investments: one row per commitment. The listing's running totals live on
//   the startups table and are bumped in the same transaction.

use crate::core::approval::StartupStatus;
use crate::core::investments::{FundingState, Investment, InvestmentError, InvestmentStore};
use crate::infra::database::{decode_timestamp, encode_timestamp, Database};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};
use std::sync::Arc;

pub struct SqliteInvestmentStore {
    db: Arc<Database>,
}

fn storage_error(e: impl ToString) -> InvestmentError {
    InvestmentError::StorageError(e.to_string())
}

impl SqliteInvestmentStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn pool(&self) -> Result<Pool<Sqlite>, InvestmentError> {
        self.db.pool().await.map_err(storage_error)
    }

    pub async fn migrate(&self) -> Result<(), InvestmentError> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS investments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                investor_id INTEGER NOT NULL,
                startup_id INTEGER NOT NULL,
                amount INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_investments_startup
                ON investments(startup_id);
            "#,
        )
        .execute(&pool)
        .await;
        self.db.observe(result).await.map_err(storage_error)?;
        Ok(())
    }
}

#[async_trait]
impl InvestmentStore for SqliteInvestmentStore {
    async fn funding_state(
        &self,
        startup_id: i64,
    ) -> Result<Option<FundingState>, InvestmentError> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            r#"
            SELECT status, minimum_investment, funding_goal, funding_raised
            FROM startups WHERE id = ?
            "#,
        )
        .bind(startup_id)
        .fetch_optional(&pool)
        .await;
        let row = match self.db.observe(result).await.map_err(storage_error)? {
            Some(row) => row,
            None => return Ok(None),
        };

        let status: String = row.get("status");
        Ok(Some(FundingState {
            status: status.parse::<StartupStatus>().map_err(storage_error)?,
            minimum_investment: row.get("minimum_investment"),
            funding_goal: row.get("funding_goal"),
            funding_raised: row.get("funding_raised"),
        }))
    }

    async fn record(
        &self,
        investor_id: i64,
        startup_id: i64,
        amount: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Option<Investment>, InvestmentError> {
        let pool = self.pool().await?;
        let result = pool.begin().await;
        let mut tx = self.db.observe(result).await.map_err(storage_error)?;

        // The conditions repeat the service checks so that a listing filled
        // up by a concurrent investor is not overshot. SQLite turns an
        // overflowing integer sum into REAL, so the total is bounded too.
        let result = sqlx::query(
            r#"
            UPDATE startups
            SET funding_raised = funding_raised + ?,
                investor_count = investor_count + 1
            WHERE id = ?
              AND status = 'approved'
              AND (funding_raised >= funding_goal OR funding_raised + ? <= funding_goal)
              AND funding_raised <= ?
            "#,
        )
        .bind(amount)
        .bind(startup_id)
        .bind(amount)
        .bind(i64::MAX.saturating_sub(amount))
        .execute(&mut *tx)
        .await;
        let done = self.db.observe(result).await.map_err(storage_error)?;

        if done.rows_affected() == 0 {
            let result = tx.rollback().await;
            self.db.observe(result).await.map_err(storage_error)?;
            return Ok(None);
        }

        let created = encode_timestamp(created_at);
        let result = sqlx::query(
            r#"
            INSERT INTO investments (investor_id, startup_id, amount, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(investor_id)
        .bind(startup_id)
        .bind(amount)
        .bind(&created)
        .execute(&mut *tx)
        .await;
        let id = self
            .db
            .observe(result)
            .await
            .map_err(storage_error)?
            .last_insert_rowid();

        let result = tx.commit().await;
        self.db.observe(result).await.map_err(storage_error)?;

        Ok(Some(Investment {
            id,
            investor_id,
            startup_id,
            amount,
            created_at: decode_timestamp(&created).map_err(storage_error)?,
        }))
    }
}
