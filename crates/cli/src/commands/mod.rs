pub mod analyze;
pub mod ask;
pub mod chat;
pub mod init;
pub mod memory;
pub mod models;
pub mod status;

use neura_agent::Neura;
use neura_config::AppConfig;
use neura_core::memory::MessageStore;
use neura_memory::{InMemoryStore, SqliteStore};
use std::sync::Arc;

/// Open the conversation database named by the config.
pub async fn open_store(config: &AppConfig) -> Result<SqliteStore, Box<dyn std::error::Error>> {
    let path = config.db_path();
    SqliteStore::open(&path)
        .await
        .map_err(|e| format!("Failed to open {}: {e}", path.display()).into())
}

/// Build the assistant. If the database cannot be opened the session keeps
/// its memory in-process only.
pub async fn assistant(config: &AppConfig) -> Neura {
    let store: Arc<dyn MessageStore> = match open_store(config).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!("{e}; conversation memory will not be saved");
            Arc::new(InMemoryStore::new())
        }
    };
    Neura::connect(config, store)
}
