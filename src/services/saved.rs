use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised by a saved-profile store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// Per-user bookmarks of candidate profiles
#[async_trait]
pub trait SavedProfileStore: Send + Sync {
    /// Saved profile ids, oldest first
    async fn list(&self, user_id: &str) -> Result<Vec<String>, StoreError>;

    /// Save the profile if it is not saved, otherwise remove it.
    /// Returns whether the profile is saved afterwards.
    async fn toggle(&self, user_id: &str, profile_id: &str) -> Result<bool, StoreError>;

    async fn is_saved(&self, user_id: &str, profile_id: &str) -> Result<bool, StoreError> {
        Ok(self.list(user_id).await?.iter().any(|id| id == profile_id))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

/// Process-local bookmark store
#[derive(Debug, Default)]
pub struct InMemorySavedStore {
    saved: RwLock<HashMap<String, Vec<String>>>,
}

impl InMemorySavedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SavedProfileStore for InMemorySavedStore {
    async fn list(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.saved.read().await.get(user_id).cloned().unwrap_or_default())
    }

    async fn toggle(&self, user_id: &str, profile_id: &str) -> Result<bool, StoreError> {
        let mut saved = self.saved.write().await;
        let ids = saved.entry(user_id.to_string()).or_default();

        if let Some(pos) = ids.iter().position(|id| id == profile_id) {
            ids.remove(pos);
            Ok(false)
        } else {
            ids.push(profile_id.to_string());
            Ok(true)
        }
    }
}
