//! SQLite message store.
//!
//! A single database file with one flat table:
//!
//! ```sql
//! memory(id INTEGER PRIMARY KEY AUTOINCREMENT, role TEXT, content TEXT,
//!        timestamp DATETIME DEFAULT CURRENT_TIMESTAMP)
//! ```
//!
//! The pool holds exactly one connection, so every operation on a store is
//! serialized against the file.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use neura_core::error::MemoryError;
use neura_core::memory::MessageStore;
use neura_core::message::{Message, Role};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// A durable, file-backed message store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the store at a SQLite URL.
    ///
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database (useful for tests).
    pub async fn new(url: &str) -> Result<Self, MemoryError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| MemoryError::Storage(format!("Invalid SQLite URL: {e}")))?;
        let store = Self::connect(options).await?;
        info!("SQLite message store initialized at {url}");
        Ok(store)
    }

    /// Open (or create) the store in a database file, creating parent directories.
    pub async fn open(path: &Path) -> Result<Self, MemoryError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                MemoryError::Storage(format!("Cannot create {}: {e}", parent.display()))
            })?;
        }

        let options = SqliteConnectOptions::new().filename(path);
        let store = Self::connect(options).await?;
        info!("SQLite message store initialized at {}", path.display());
        Ok(store)
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self, MemoryError> {
        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create the `memory` table if it does not exist.
    async fn run_migrations(&self) -> Result<(), MemoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS memory (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                role      TEXT,
                content   TEXT,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| MemoryError::MigrationFailed(format!("memory table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    /// Parse a `Message` from a row. `None` for rows whose role is not recognised.
    fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<Option<Message>, MemoryError> {
        let id: i64 = row
            .try_get("id")
            .map_err(|e| MemoryError::QueryFailed(format!("id column: {e}")))?;
        let role_str: Option<String> = row
            .try_get("role")
            .map_err(|e| MemoryError::QueryFailed(format!("role column: {e}")))?;
        let content: Option<String> = row
            .try_get("content")
            .map_err(|e| MemoryError::QueryFailed(format!("content column: {e}")))?;
        let timestamp_str: Option<String> = row
            .try_get("timestamp")
            .map_err(|e| MemoryError::QueryFailed(format!("timestamp column: {e}")))?;

        let role = match role_str.as_deref().unwrap_or_default().parse::<Role>() {
            Ok(role) => role,
            Err(e) => {
                warn!(id, "Skipping stored message: {e}");
                return Ok(None);
            }
        };

        let timestamp = timestamp_str
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);

        Ok(Some(Message {
            id,
            role,
            content: content.unwrap_or_default(),
            timestamp,
        }))
    }
}

/// SQLite's `CURRENT_TIMESTAMP` is `YYYY-MM-DD HH:MM:SS` in UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        })
}

#[async_trait]
impl MessageStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, role: Role, content: &str) -> Result<i64, MemoryError> {
        let result = sqlx::query("INSERT INTO memory (role, content) VALUES (?1, ?2)")
            .bind(role.as_str())
            .bind(content)
            .execute(&self.pool)
            .await
            .map_err(|e| MemoryError::Storage(format!("INSERT failed: {e}")))?;

        let id = result.last_insert_rowid();
        debug!(id, %role, "Stored message");
        Ok(id)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Message>, MemoryError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, role, content, CAST(timestamp AS TEXT) AS timestamp
            FROM memory
            WHERE lower(trim(role)) IN ('system', 'user', 'assistant')
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MemoryError::QueryFailed(format!("recent: {e}")))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in rows.iter().rev() {
            if let Some(message) = Self::row_to_message(row)? {
                messages.push(message);
            }
        }
        Ok(messages)
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        sqlx::query("DELETE FROM memory")
            .execute(&self.pool)
            .await
            .map_err(|e| MemoryError::Storage(format!("CLEAR failed: {e}")))?;

        Ok(())
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM memory")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MemoryError::QueryFailed(format!("COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| MemoryError::QueryFailed(format!("cnt column: {e}")))?;

        Ok(cnt as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteStore {
        SqliteStore::new("sqlite::memory:").await.unwrap()
    }

    fn contents(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.content.as_str()).collect()
    }

    #[tokio::test]
    async fn append_then_recent_round_trip() {
        let db = test_store().await;
        db.append(Role::User, "x").await.unwrap();

        let recent = db.recent(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].role, Role::User);
        assert_eq!(recent[0].content, "x");
    }

    #[tokio::test]
    async fn ids_strictly_increase() {
        let db = test_store().await;
        let a = db.append(Role::User, "one").await.unwrap();
        let b = db.append(Role::Assistant, "two").await.unwrap();
        let c = db.append(Role::User, "three").await.unwrap();
        assert!(a < b && b < c);
    }

    #[tokio::test]
    async fn recent_returns_last_entries_oldest_first() {
        let db = test_store().await;
        for i in 0..6 {
            db.append(Role::User, &format!("m{i}")).await.unwrap();
        }

        let recent = db.recent(3).await.unwrap();
        assert_eq!(contents(&recent), vec!["m3", "m4", "m5"]);
        assert!(recent.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn recent_with_limit_above_total_returns_everything() {
        let db = test_store().await;
        db.append(Role::User, "oi").await.unwrap();
        db.append(Role::Assistant, "olá").await.unwrap();

        let recent = db.recent(10).await.unwrap();
        assert_eq!(contents(&recent), vec!["oi", "olá"]);
        assert_eq!(recent[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn recent_zero_and_empty_store() {
        let db = test_store().await;
        assert!(db.recent(5).await.unwrap().is_empty());

        db.append(Role::User, "hello").await.unwrap();
        assert!(db.recent(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_removes_everything_and_is_idempotent() {
        let db = test_store().await;
        db.append(Role::User, "one").await.unwrap();
        db.append(Role::Assistant, "two").await.unwrap();
        assert_eq!(db.count().await.unwrap(), 2);

        db.clear().await.unwrap();
        db.clear().await.unwrap();
        assert_eq!(db.count().await.unwrap(), 0);
        assert!(db.recent(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn timestamp_is_filled_by_the_database() {
        let db = test_store().await;
        let before = Utc::now() - chrono::Duration::seconds(5);
        db.append(Role::User, "when").await.unwrap();

        let msg = &db.recent(1).await.unwrap()[0];
        assert!(msg.timestamp >= before);
    }

    #[tokio::test]
    async fn unknown_roles_are_skipped() {
        let db = test_store().await;
        db.append(Role::User, "kept").await.unwrap();
        sqlx::query("INSERT INTO memory (role, content) VALUES ('tool', 'ignored')")
            .execute(&db.pool)
            .await
            .unwrap();

        let recent = db.recent(5).await.unwrap();
        assert_eq!(contents(&recent), vec!["kept"]);
    }

    #[tokio::test]
    async fn foreign_rows_do_not_shrink_the_tail() {
        let db = test_store().await;
        db.append(Role::User, "a").await.unwrap();
        db.append(Role::Assistant, "b").await.unwrap();
        sqlx::query("INSERT INTO memory (role, content) VALUES ('tool', 'x'), (NULL, 'y')")
            .execute(&db.pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO memory (role, content) VALUES (' User ', 'c')")
            .execute(&db.pool)
            .await
            .unwrap();

        let recent = db.recent(2).await.unwrap();
        assert_eq!(contents(&recent), vec!["b", "c"]);
        assert_eq!(recent[1].role, Role::User);
    }

    #[tokio::test]
    async fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data_memory.db");

        {
            let db = SqliteStore::open(&path).await.unwrap();
            db.append(Role::User, "lembre disso").await.unwrap();
            db.pool.close().await;
        }

        let db = SqliteStore::open(&path).await.unwrap();
        let recent = db.recent(1).await.unwrap();
        assert_eq!(contents(&recent), vec!["lembre disso"]);
    }

    #[tokio::test]
    async fn store_name() {
        let db = test_store().await;
        assert_eq!(db.name(), "sqlite");
    }

    #[test]
    fn parses_sqlite_and_rfc3339_timestamps() {
        let ts = parse_timestamp("2024-05-01 12:30:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T12:30:00+00:00");
        assert!(parse_timestamp("2024-05-01T12:30:00Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
