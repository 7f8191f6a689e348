//! # Neura Core
//!
//! Domain types, traits, and error definitions for the Neura assistant.
//! This crate has **no I/O dependencies**: it defines the domain model that
//! the storage, provider, and agent crates implement against.
//!
//! - [`MessageStore`] abstracts the durable turn log
//! - [`Provider`] abstracts the inference server (chat, vision, catalog, status)

pub mod error;
pub mod memory;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{MemoryError, ProviderError};
pub use memory::MessageStore;
pub use message::{ContextEntry, Message, Role};
pub use provider::{ChatRequest, ChatResponse, Provider, VisionRequest};
