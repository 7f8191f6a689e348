//! Provider trait — the abstraction over the inference server.
//!
//! A Provider knows how to send a context window to a chat model, send an
//! image plus prompt to a vision model, list installed models, and report
//! whether the server is reachable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::ContextEntry;

/// A single chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model to use (e.g., "qwen2:0.5b")
    pub model: String,

    /// The context window, in order
    pub messages: Vec<ContextEntry>,

    /// Temperature (0.0 = deterministic)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Stop sequences
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

fn default_temperature() -> f32 {
    0.2
}

/// A complete (non-streaming) chat response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated text, untrimmed
    pub content: String,

    /// Which model actually responded
    pub model: String,
}

/// An image-to-text request for a vision-capable model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionRequest {
    pub model: String,

    pub prompt: String,

    /// Base64-encoded image payloads
    pub images: Vec<String>,

    #[serde(default)]
    pub temperature: f32,
}

/// The core Provider trait.
///
/// The orchestrator calls these without knowing which server sits behind
/// them; tests substitute scripted implementations.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "ollama").
    fn name(&self) -> &str;

    /// Send a context window and get a complete reply.
    async fn chat(&self, request: ChatRequest) -> std::result::Result<ChatResponse, ProviderError>;

    /// Describe one or more images. Returns the raw (untrimmed) text.
    async fn describe_image(
        &self,
        request: VisionRequest,
    ) -> std::result::Result<String, ProviderError>;

    /// List installed model names.
    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    /// Whether the server answers its status endpoint.
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
