//! Error types for the Neura domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context (inference, storage) has its own error type.

use thiserror::Error;

/// Errors raised while talking to the inference server.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Malformed response: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Map a transport-level reqwest-style failure description to the right variant.
    pub fn from_transport(message: impl Into<String>, timed_out: bool) -> Self {
        let message = message.into();
        if timed_out {
            Self::Timeout(message)
        } else {
            Self::Network(message)
        }
    }
}

/// Errors raised by a [`MessageStore`](crate::memory::MessageStore).
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}
