// Approval service - submission and the automatic approval sweep.
//
// This service handles:
// - Submitting a startup (moderated, stored as pending)
// - Looking a startup up
// - The sweep: pending listings that are old enough and passed moderation
//   (or were never moderated) become approved
//
// The sweep itself is a single conditional bulk update in the store, so
// running it twice, or twice at once, approves each record at most once.

use super::approval_models::{NewStartup, Startup, SweepPolicy};
use crate::core::moderation::{
    ContentClassifier, ModerationResult, ModerationService, StartupContent, APPROVAL_THRESHOLD,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid submission: {0}")]
    InvalidInput(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait StartupStore: Send + Sync {
    /// Persist a new listing in the pending state.
    async fn insert(&self, startup: NewStartup) -> Result<Startup, ApprovalError>;

    /// Fetch a listing by id.
    async fn get(&self, id: i64) -> Result<Option<Startup>, ApprovalError>;

    /// Approve every pending listing created at or before `created_before`
    /// whose moderation score is at least `min_score` or absent. Must be a
    /// single atomic conditional update. Returns how many were approved.
    async fn approve_eligible(
        &self,
        created_before: DateTime<Utc>,
        min_score: u8,
        approved_at: DateTime<Utc>,
    ) -> Result<u64, ApprovalError>;
}

// ============================================================================
// INPUT
// ============================================================================

/// A startup as submitted by its owner.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub content: StartupContent,
    pub logo: String,
    pub funding_goal: i64,
    pub minimum_investment: i64,
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct ApprovalService<S: StartupStore, C: ContentClassifier> {
    store: S,
    moderation: ModerationService<C>,
    policy: SweepPolicy,
}

impl<S: StartupStore, C: ContentClassifier> ApprovalService<S, C> {
    pub fn new(store: S, moderation: ModerationService<C>, policy: SweepPolicy) -> Self {
        Self {
            store,
            moderation,
            policy,
        }
    }

    /// Moderate and store a new listing. Moderation problems never fail the
    /// submission; they only keep it from being auto-approved.
    pub async fn submit(
        &self,
        owner_id: i64,
        submission: Submission,
    ) -> Result<(Startup, ModerationResult), ApprovalError> {
        validate_submission(&submission)?;

        let moderation = self.moderation.moderate(&submission.content).await;
        if SweepPolicy::score_allows_approval(Some(moderation.score)) {
            tracing::info!(
                owner_id,
                score = moderation.score,
                "Submission passed moderation, will be auto-approved after {} minutes",
                self.policy.delay.num_minutes()
            );
        } else {
            tracing::info!(
                owner_id,
                score = moderation.score,
                flags = ?moderation.flags,
                "Submission held for manual review"
            );
        }

        let startup = self
            .store
            .insert(NewStartup {
                owner_id,
                content: submission.content,
                logo: submission.logo,
                funding_goal: submission.funding_goal,
                minimum_investment: submission.minimum_investment,
                moderation: moderation.clone(),
                created_at: Utc::now(),
            })
            .await?;

        Ok((startup, moderation))
    }

    pub async fn get(&self, id: i64) -> Result<Option<Startup>, ApprovalError> {
        self.store.get(id).await
    }

    /// Run the approval sweep as if it were `now`.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<u64, ApprovalError> {
        let cutoff = self.policy.cutoff(now);
        let approved = self
            .store
            .approve_eligible(cutoff, APPROVAL_THRESHOLD, now)
            .await?;

        tracing::info!("Auto-approved {} pending startups", approved);
        Ok(approved)
    }
}

fn validate_submission(submission: &Submission) -> Result<(), ApprovalError> {
    if submission.content.name.trim().is_empty() {
        return Err(ApprovalError::InvalidInput("name is required".to_string()));
    }
    if submission.content.tagline.trim().is_empty() {
        return Err(ApprovalError::InvalidInput("tagline is required".to_string()));
    }
    if submission.funding_goal < 0 || submission.minimum_investment < 0 {
        return Err(ApprovalError::InvalidInput(
            "funding amounts cannot be negative".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
