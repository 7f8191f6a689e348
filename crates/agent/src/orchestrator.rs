//! The response orchestrator.
//!
//! [`Neura`] turns one user message (optionally with an image) into one reply
//! string. Every failure on the request path is logged and rendered as text;
//! nothing propagates to the caller.

use crate::context::ContextAssembler;
use crate::history::History;
use crate::vision::{self, VisionDispatcher, VisionSettings};
use neura_config::AppConfig;
use neura_core::error::ProviderError;
use neura_core::memory::MessageStore;
use neura_core::message::{Message, Role};
use neura_core::provider::{ChatRequest, Provider};
use neura_providers::OllamaProvider;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Returned when the model produced only whitespace.
pub const NO_RESPONSE: &str = "(sem resposta gerada)";

/// Returned for image requests when the session has vision turned off.
pub const VISION_DISABLED: &str = "Análise de imagem desativada nesta sessão.";

/// Prefix marking stored image descriptions.
pub const VISION_TAG: &str = "[vision] ";

/// Per-session behavior, fixed at construction.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub model: String,
    pub system_prompt: String,
    pub use_memory: bool,
    pub context_limit: usize,
    pub temperature: f32,
    pub stop_sequences: Vec<String>,
    pub vision_enabled: bool,
    pub vision: VisionSettings,
    /// Prompt used for images sent without one
    pub vision_prompt: String,
    /// Follow-up text turn for a described image; `{description}` is substituted
    pub followup_template: String,
}

impl SessionConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            use_memory: config.memory.enabled,
            context_limit: config.memory.context_limit,
            temperature: config.temperature,
            stop_sequences: config.stop_sequences.clone(),
            vision_enabled: config.vision.enabled,
            vision: VisionSettings::from(&config.vision),
            vision_prompt: config.vision.default_prompt.clone(),
            followup_template: config.vision.followup_template.clone(),
        }
    }
}

/// Snapshot of the session's memory usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    pub message_count: usize,
    pub context_limit: usize,
    pub use_memory: bool,
}

/// Result of the two-step image flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageComment {
    /// The vision model's description, or a rendered failure
    pub description: String,
    /// The chat model's comment; `None` when no description was produced
    pub comment: Option<String>,
}

/// The assistant.
pub struct Neura {
    session: SessionConfig,
    provider: Option<Arc<dyn Provider>>,
    history: History,
    vision: VisionDispatcher,
}

impl Neura {
    /// Assemble an orchestrator from its parts.
    ///
    /// `provider` is `None` when the inference client could not be built; every
    /// request then takes the unreachable path.
    pub fn new(
        session: SessionConfig,
        provider: Option<Arc<dyn Provider>>,
        store: Arc<dyn MessageStore>,
    ) -> Self {
        let vision = VisionDispatcher::new(provider.clone(), session.vision.clone());
        Self {
            session,
            provider,
            history: History::new(store),
            vision,
        }
    }

    /// Build an orchestrator talking to the Ollama server named in `config`.
    pub fn connect(config: &AppConfig, store: Arc<dyn MessageStore>) -> Self {
        let provider: Option<Arc<dyn Provider>> = match OllamaProvider::from_config(config) {
            Ok(provider) => {
                info!(host = %provider.base_url(), model = %config.model, "Inference client ready");
                Some(Arc::new(provider))
            }
            Err(e) => {
                error!(host = %config.host, "Could not create inference client: {e}");
                None
            }
        };
        Self::new(SessionConfig::from_app(config), provider, store)
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    /// Answer one message.
    ///
    /// With `image`, the message is the vision prompt; otherwise it is a chat turn.
    pub async fn respond(&self, message: &str, image: Option<&Path>) -> String {
        match image {
            Some(path) => self.analyze_image(path, message).await,
            None => self.chat(message).await,
        }
    }

    /// Describe an image and remember the description.
    pub async fn analyze_image(&self, path: &Path, prompt: &str) -> String {
        match self.describe_and_store(path, prompt).await {
            Ok(description) => description,
            Err(rendered) => rendered,
        }
    }

    /// Describe an image, then ask the chat model to comment on the description.
    pub async fn describe_then_comment(&self, path: &Path, prompt: &str) -> ImageComment {
        match self.describe_and_store(path, prompt).await {
            Ok(description) => {
                let followup = self
                    .session
                    .followup_template
                    .replace("{description}", &description);
                let comment = self.chat(&followup).await;
                ImageComment {
                    description,
                    comment: Some(comment),
                }
            }
            Err(rendered) => ImageComment {
                description: rendered,
                comment: None,
            },
        }
    }

    /// `Ok` holds a non-empty description; `Err` holds the text to show instead.
    async fn describe_and_store(&self, path: &Path, prompt: &str) -> Result<String, String> {
        if !self.session.vision_enabled {
            return Err(VISION_DISABLED.to_string());
        }

        let prompt = if prompt.trim().is_empty() {
            self.session.vision_prompt.as_str()
        } else {
            prompt
        };

        let description = self
            .vision
            .describe(path, prompt)
            .await
            .map_err(|e| vision::render_error(&e))?;

        if description.is_empty() {
            warn!(path = %path.display(), "Vision model returned an empty description");
            return Err(NO_RESPONSE.to_string());
        }

        if self.session.use_memory {
            self.history
                .append(Role::Assistant, &format!("{VISION_TAG}{description}"))
                .await;
        }

        Ok(description)
    }

    /// One chat turn: store the user message, build the window, ask the model.
    async fn chat(&self, message: &str) -> String {
        let use_memory = self.session.use_memory;

        let history = if use_memory {
            self.history.append(Role::User, message).await;
            self.history.recent(self.session.context_limit).await
        } else {
            Vec::new()
        };

        let messages = ContextAssembler::assemble(
            &self.session.system_prompt,
            &history,
            message,
            use_memory,
        );

        debug!(
            turns = messages.len(),
            use_memory,
            "Assembled context window"
        );

        let request = ChatRequest {
            model: self.session.model.clone(),
            messages,
            temperature: self.session.temperature,
            stop: self.session.stop_sequences.clone(),
        };

        let result = match &self.provider {
            Some(provider) => provider.chat(request).await,
            None => Err(unavailable()),
        };

        match result {
            Ok(response) => {
                let reply = response.content.trim();
                if reply.is_empty() {
                    warn!(model = %response.model, "Model returned an empty reply");
                    return NO_RESPONSE.to_string();
                }
                if use_memory {
                    self.history.append(Role::Assistant, reply).await;
                }
                reply.to_string()
            }
            Err(e) => {
                error!(model = %self.session.model, "Chat request failed: {e}");
                format!("Error: {e}")
            }
        }
    }

    /// Installed model names. Empty when the server cannot be queried.
    pub async fn list_models(&self) -> Vec<String> {
        let Some(provider) = &self.provider else {
            warn!("Cannot list models: {}", unavailable());
            return Vec::new();
        };

        match provider.list_models().await {
            Ok(models) => models,
            Err(e) => {
                error!("Failed to list models: {e}");
                Vec::new()
            }
        }
    }

    /// Whether the inference server answers its status endpoint.
    pub async fn health_check(&self) -> bool {
        let Some(provider) = &self.provider else {
            return false;
        };

        match provider.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                debug!("Health check failed: {e}");
                false
            }
        }
    }

    pub async fn clear_memory(&self) {
        self.history.clear().await;
        info!("Conversation memory cleared");
    }

    pub async fn stats(&self) -> MemoryStats {
        MemoryStats {
            message_count: self.history.count().await,
            context_limit: self.session.context_limit,
            use_memory: self.session.use_memory,
        }
    }

    /// The last `limit` stored turns, oldest first.
    pub async fn recent_messages(&self, limit: usize) -> Vec<Message> {
        self.history.recent(limit).await
    }
}

fn unavailable() -> ProviderError {
    ProviderError::NotConfigured("inference server client is unavailable".into())
}
