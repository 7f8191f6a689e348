//! Best-effort view of the message store.
//!
//! The orchestrator must keep answering when the database is locked, missing
//! or corrupt, so every store failure is logged here and turned into a
//! neutral value instead of being propagated.

use neura_core::memory::MessageStore;
use neura_core::message::{Message, Role};
use std::sync::Arc;
use tracing::warn;

/// Wraps a [`MessageStore`] and never fails.
#[derive(Clone)]
pub struct History {
    store: Arc<dyn MessageStore>,
}

impl History {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Store one turn. Returns `false` if it could not be persisted.
    pub async fn append(&self, role: Role, content: &str) -> bool {
        match self.store.append(role, content).await {
            Ok(_) => true,
            Err(e) => {
                warn!(store = self.store.name(), %role, "Failed to persist message: {e}");
                false
            }
        }
    }

    /// The last `limit` turns, oldest first. Empty on failure.
    pub async fn recent(&self, limit: usize) -> Vec<Message> {
        self.store.recent(limit).await.unwrap_or_else(|e| {
            warn!(store = self.store.name(), "Failed to load history: {e}");
            Vec::new()
        })
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(store = self.store.name(), "Failed to clear history: {e}");
        }
    }

    /// Number of stored turns. Zero on failure.
    pub async fn count(&self) -> usize {
        self.store.count().await.unwrap_or_else(|e| {
            warn!(store = self.store.name(), "Failed to count history: {e}");
            0
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use neura_core::error::MemoryError;
    use neura_memory::InMemoryStore;

    /// A store whose every operation fails, like a locked database file.
    pub(crate) struct BrokenStore;

    #[async_trait]
    impl MessageStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }

        async fn append(&self, _role: Role, _content: &str) -> Result<i64, MemoryError> {
            Err(MemoryError::Storage("database is locked".into()))
        }

        async fn recent(&self, _limit: usize) -> Result<Vec<Message>, MemoryError> {
            Err(MemoryError::QueryFailed("database is locked".into()))
        }

        async fn clear(&self) -> Result<(), MemoryError> {
            Err(MemoryError::Storage("database is locked".into()))
        }

        async fn count(&self) -> Result<usize, MemoryError> {
            Err(MemoryError::QueryFailed("database is locked".into()))
        }
    }

    /// Accepts writes but cannot read them back, like a half-migrated schema.
    pub(crate) struct WriteOnlyStore;

    #[async_trait]
    impl MessageStore for WriteOnlyStore {
        fn name(&self) -> &str {
            "write-only"
        }

        async fn append(&self, _role: Role, _content: &str) -> Result<i64, MemoryError> {
            Ok(1)
        }

        async fn recent(&self, _limit: usize) -> Result<Vec<Message>, MemoryError> {
            Err(MemoryError::QueryFailed("no such column: content".into()))
        }

        async fn clear(&self) -> Result<(), MemoryError> {
            Ok(())
        }

        async fn count(&self) -> Result<usize, MemoryError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn passes_through_a_working_store() {
        let history = History::new(Arc::new(InMemoryStore::new()));
        assert!(history.append(Role::User, "oi").await);
        assert!(history.append(Role::Assistant, "olá").await);

        assert_eq!(history.count().await, 2);
        assert_eq!(history.recent(1).await[0].content, "olá");

        history.clear().await;
        assert_eq!(history.count().await, 0);
    }

    #[tokio::test]
    async fn failures_become_neutral_values() {
        let history = History::new(Arc::new(BrokenStore));
        assert!(!history.append(Role::User, "oi").await);
        assert!(history.recent(3).await.is_empty());
        assert_eq!(history.count().await, 0);
        history.clear().await;
    }
}
