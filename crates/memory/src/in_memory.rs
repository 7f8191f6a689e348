//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use neura_core::error::MemoryError;
use neura_core::memory::MessageStore;
use neura_core::message::{Message, Role};
use tokio::sync::RwLock;

#[derive(Default)]
struct Log {
    messages: Vec<Message>,
    last_id: i64,
}

/// A message store that keeps turns in a Vec.
///
/// Identifiers keep increasing across [`clear`](MessageStore::clear), the
/// same way an AUTOINCREMENT column does.
#[derive(Default)]
pub struct InMemoryStore {
    log: RwLock<Log>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, role: Role, content: &str) -> Result<i64, MemoryError> {
        let mut log = self.log.write().await;
        log.last_id += 1;
        let id = log.last_id;
        log.messages.push(Message {
            id,
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        });
        Ok(id)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Message>, MemoryError> {
        let log = self.log.read().await;
        let start = log.messages.len().saturating_sub(limit);
        Ok(log.messages[start..].to_vec())
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        self.log.write().await.messages.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.log.read().await.messages.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recent_is_chronological_tail() {
        let mem = InMemoryStore::new();
        for i in 0..5 {
            mem.append(Role::User, &format!("m{i}")).await.unwrap();
        }

        let recent = mem.recent(2).await.unwrap();
        let contents: Vec<_> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m3", "m4"]);

        assert_eq!(mem.recent(50).await.unwrap().len(), 5);
        assert!(mem.recent(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_keeps_ids_increasing() {
        let mem = InMemoryStore::new();
        let first = mem.append(Role::User, "a").await.unwrap();
        mem.clear().await.unwrap();
        assert_eq!(mem.count().await.unwrap(), 0);

        let second = mem.append(Role::Assistant, "b").await.unwrap();
        assert!(second > first);
        assert_eq!(mem.recent(1).await.unwrap()[0].role, Role::Assistant);
    }
}
