//! Session storage backends.
//!
//! The store trait keeps the router decoupled from where sessions live, so
//! a persistent backend can replace the in-memory map without touching
//! router logic.

use super::state::SessionData;
use crate::error::StorageResult;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Trait for session storage backends.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session by key.
    async fn load(&self, key: &str) -> StorageResult<Option<SessionData>>;

    /// Save a session.
    async fn save(&self, session: &SessionData) -> StorageResult<()>;

    /// Delete a session.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// List all session keys.
    async fn list_keys(&self) -> StorageResult<Vec<String>>;

    /// Check if a session exists.
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.load(key).await?.is_some())
    }
}

/// In-memory session store.
///
/// Sessions are lost on process restart; there is no eviction and no size
/// bound.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, SessionData>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, key: &str) -> StorageResult<Option<SessionData>> {
        Ok(self.sessions.read().await.get(key).cloned())
    }

    async fn save(&self, session: &SessionData) -> StorageResult<()> {
        self.sessions
            .write()
            .await
            .insert(session.key.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.sessions.write().await.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.sessions.read().await.keys().cloned().collect())
    }
}
