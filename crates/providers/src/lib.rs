//! Inference provider implementations for Neura.

pub mod ollama;

pub use ollama::OllamaProvider;
