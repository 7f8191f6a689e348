//! Message store trait — the durable, append-only turn log.
//!
//! Implementations: SQLite (file-backed) and in-memory (tests, ephemeral
//! sessions). Both live in `neura-memory`.

use async_trait::async_trait;
use crate::error::MemoryError;
use crate::message::{Message, Role};

/// The core MessageStore trait.
///
/// Identifiers are assigned by the store and strictly increase per insertion.
/// Records are never mutated; the only deletion is [`clear`](Self::clear).
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Append one record and return its identifier.
    async fn append(&self, role: Role, content: &str) -> std::result::Result<i64, MemoryError>;

    /// Up to `limit` most recent records, oldest first.
    async fn recent(&self, limit: usize) -> std::result::Result<Vec<Message>, MemoryError>;

    /// Delete every record. Idempotent.
    async fn clear(&self) -> std::result::Result<(), MemoryError>;

    /// Total number of stored records.
    async fn count(&self) -> std::result::Result<usize, MemoryError>;
}
