// Saved startups - a per-user bookmark list with toggle semantics.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedStartup {
    pub id: i64,
    pub user_id: i64,
    pub startup_id: i64,
    pub created_at: DateTime<Utc>,
}

/// What a toggle did.
#[derive(Debug, Clone)]
pub enum ToggleOutcome {
    Saved(SavedStartup),
    Removed,
}

#[derive(Debug, Error)]
pub enum SavedStartupError {
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[async_trait]
pub trait SavedStartupStore: Send + Sync {
    async fn find(
        &self,
        user_id: i64,
        startup_id: i64,
    ) -> Result<Option<SavedStartup>, SavedStartupError>;

    /// All bookmarks of `user_id`, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<SavedStartup>, SavedStartupError>;

    /// Insert a bookmark, or return the existing one for the same pair.
    async fn insert(
        &self,
        user_id: i64,
        startup_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<SavedStartup, SavedStartupError>;

    async fn delete(&self, id: i64) -> Result<(), SavedStartupError>;
}

pub struct SavedStartupService<S: SavedStartupStore> {
    store: S,
}

impl<S: SavedStartupStore> SavedStartupService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn is_saved(&self, user_id: i64, startup_id: i64) -> Result<bool, SavedStartupError> {
        Ok(self.store.find(user_id, startup_id).await?.is_some())
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<SavedStartup>, SavedStartupError> {
        self.store.list_for_user(user_id).await
    }

    /// Save the startup if it isn't saved yet, otherwise unsave it.
    pub async fn toggle(
        &self,
        user_id: i64,
        startup_id: i64,
    ) -> Result<ToggleOutcome, SavedStartupError> {
        match self.store.find(user_id, startup_id).await? {
            Some(existing) => {
                self.store.delete(existing.id).await?;
                Ok(ToggleOutcome::Removed)
            }
            None => {
                let saved = self.store.insert(user_id, startup_id, Utc::now()).await?;
                Ok(ToggleOutcome::Saved(saved))
            }
        }
    }
}
