//! Session manager: get-or-create and closure-based updates over a store.

use super::state::SessionData;
use super::store::SessionStore;
use crate::error::StorageResult;
use std::sync::Arc;
use tracing::debug;

/// Manager wrapping a [`SessionStore`] with the two operations the router
/// needs: idempotent get-or-create and single-shot mutation.
///
/// Updates are load-mutate-save with no lock held across the three steps;
/// rapid-fire updates for the same key are last-write-wins.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a new session manager with the given storage backend.
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Return the existing session for `key`, or a freshly initialized one.
    ///
    /// The fresh session is persisted before being returned, so repeated
    /// calls observe the same record.
    pub async fn get_or_create(&self, key: &str) -> StorageResult<SessionData> {
        if let Some(session) = self.store.load(key).await? {
            return Ok(session);
        }

        debug!(key = %key, "created new session");
        let session = SessionData::new(key);
        self.store.save(&session).await?;
        Ok(session)
    }

    /// Apply `mutator` to the session for `key` (creating it if absent),
    /// persist, and return the updated snapshot.
    pub async fn update<F>(&self, key: &str, mutator: F) -> StorageResult<SessionData>
    where
        F: FnOnce(&mut SessionData),
    {
        let mut session = match self.store.load(key).await? {
            Some(session) => session,
            None => SessionData::new(key),
        };
        mutator(&mut session);
        self.store.save(&session).await?;
        Ok(session)
    }

    /// Reset the session for `key` back to defaults and return it.
    pub async fn reset(&self, key: &str) -> StorageResult<SessionData> {
        self.update(key, SessionData::reset).await
    }

    /// List all known session keys.
    pub async fn list(&self) -> StorageResult<Vec<String>> {
        self.store.list_keys().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryStore, Module, Mood};

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let manager = SessionManager::new(MemoryStore::new());

        let first = manager.get_or_create("telegram:1").await.unwrap();
        assert_eq!(first.key, "telegram:1");

        manager
            .update("telegram:1", |s| s.record_mood(Mood::Sad, 4))
            .await
            .unwrap();

        let second = manager.get_or_create("telegram:1").await.unwrap();
        assert_eq!(second.mood_history.len(), 1);
    }

    #[tokio::test]
    async fn test_update_creates_when_absent() {
        let manager = SessionManager::new(MemoryStore::new());

        let updated = manager
            .update("telegram:2", |s| s.set_module(Some(Module::Mitra)))
            .await
            .unwrap();
        assert_eq!(updated.active_module, Some(Module::Mitra));

        let reloaded = manager.get_or_create("telegram:2").await.unwrap();
        assert_eq!(reloaded.active_module, Some(Module::Mitra));
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let manager = SessionManager::new(MemoryStore::new());

        manager
            .update("telegram:3", |s| {
                s.set_module(Some(Module::Sakhi));
                s.complete_activity();
            })
            .await
            .unwrap();

        let reset = manager.reset("telegram:3").await.unwrap();
        assert_eq!(reset.active_module, None);
        assert_eq!(reset.wellness_streak, 0);
        assert_eq!(reset.key, "telegram:3");
    }
}
