// Investments - committing money to an approved startup.
//
// Rules:
// - Only approved listings accept investments
// - Amount must be positive and at least the listing's minimum
// - While the listing still has room below its goal, the amount may not
//   exceed what is left; once the goal is met, any amount is accepted
// - The raised total must stay within i64

use crate::core::approval::StartupStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: i64,
    pub investor_id: i64,
    pub startup_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// The funding state of a listing, as far as investing is concerned.
#[derive(Debug, Clone)]
pub struct FundingState {
    pub status: StartupStatus,
    pub minimum_investment: i64,
    pub funding_goal: i64,
    pub funding_raised: i64,
}

impl FundingState {
    /// Amount left before the goal is reached, `None` once it is.
    pub fn remaining(&self) -> Option<i64> {
        let remaining = self.funding_goal - self.funding_raised;
        (remaining > 0).then_some(remaining)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum InvestmentError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Startup not found")]
    StartupNotFound,

    #[error("This startup is not accepting investments")]
    NotOpen,

    #[error("Investment amount must be positive")]
    InvalidAmount,

    #[error("Minimum investment is {0}")]
    BelowMinimum(Usd),

    #[error("Maximum remaining amount is {0}")]
    ExceedsRemaining(Usd),

    #[error("Investment amount is too large")]
    TotalOverflow,
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait InvestmentStore: Send + Sync {
    async fn funding_state(&self, startup_id: i64) -> Result<Option<FundingState>, InvestmentError>;

    /// Record the investment and bump the listing's raised amount and
    /// investor count in one transaction. The bump is conditional on the
    /// listing still being approved, still having room for `amount` and the
    /// new total fitting in an `i64`; returns `None` if that no longer holds.
    async fn record(
        &self,
        investor_id: i64,
        startup_id: i64,
        amount: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Option<Investment>, InvestmentError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct InvestmentService<S: InvestmentStore> {
    store: S,
}

impl<S: InvestmentStore> InvestmentService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn invest(
        &self,
        investor_id: i64,
        startup_id: i64,
        amount: i64,
    ) -> Result<Investment, InvestmentError> {
        let state = self
            .store
            .funding_state(startup_id)
            .await?
            .ok_or(InvestmentError::StartupNotFound)?;
        check_amount(&state, amount)?;

        match self
            .store
            .record(investor_id, startup_id, amount, Utc::now())
            .await?
        {
            Some(investment) => {
                tracing::info!(
                    investor_id,
                    startup_id,
                    "Recorded investment of {}",
                    Usd(amount)
                );
                Ok(investment)
            }
            None => {
                // Someone else got in between; re-read to report why.
                let state = self
                    .store
                    .funding_state(startup_id)
                    .await?
                    .ok_or(InvestmentError::StartupNotFound)?;
                check_amount(&state, amount)?;
                Err(InvestmentError::NotOpen)
            }
        }
    }
}

fn check_amount(state: &FundingState, amount: i64) -> Result<(), InvestmentError> {
    if state.status != StartupStatus::Approved {
        return Err(InvestmentError::NotOpen);
    }
    if amount <= 0 {
        return Err(InvestmentError::InvalidAmount);
    }
    if amount < state.minimum_investment {
        return Err(InvestmentError::BelowMinimum(Usd(state.minimum_investment)));
    }
    if let Some(remaining) = state.remaining() {
        if amount > remaining {
            return Err(InvestmentError::ExceedsRemaining(Usd(remaining)));
        }
    }
    if state.funding_raised.checked_add(amount).is_none() {
        return Err(InvestmentError::TotalOverflow);
    }
    Ok(())
}

/// A whole-dollar amount, displayed compactly: `$1.5M`, `$250K`, `$900`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usd(pub i64);

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.0;
        if amount >= 1_000_000 {
            write!(f, "${:.1}M", amount as f64 / 1_000_000.0)
        } else if amount >= 1_000 {
            write!(f, "${:.0}K", amount as f64 / 1_000.0)
        } else {
            write!(f, "${}", amount)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
