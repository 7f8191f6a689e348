//! Message and context-window domain types.
//!
//! A [`Message`] is a persisted turn: the user said something, or the model
//! replied. A [`ContextEntry`] is the transient `{role, content}` pair sent to
//! the model; a context window is just an ordered `Vec<ContextEntry>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (persona, rules)
    System,
    /// The end user
    User,
    /// The model
    Assistant,
}

impl Role {
    /// The lowercase wire/storage name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// A single stored turn.
///
/// `id` is assigned by the store and strictly increases with insertion order,
/// so sorting by `id` is sorting chronologically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Store-assigned identifier
    pub id: i64,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Project this stored message onto a context-window entry.
    pub fn to_entry(&self) -> ContextEntry {
        ContextEntry {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// One `{role, content}` pair of a context window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub role: Role,
    pub content: String,
}

impl ContextEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}
