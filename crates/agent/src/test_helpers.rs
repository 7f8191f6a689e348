//! Shared test helpers for orchestrator and vision tests.

use neura_core::error::ProviderError;
use neura_core::provider::{ChatRequest, ChatResponse, Provider, VisionRequest};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A provider that replays scripted results and records every request.
///
/// Chat calls pop the next scripted reply; once the script runs out they
/// answer with an empty string.
pub struct ScriptedProvider {
    chat_replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    vision_reply: Result<String, ProviderError>,
    models: Result<Vec<String>, ProviderError>,
    healthy: bool,
    chat_requests: Mutex<Vec<ChatRequest>>,
    vision_requests: Mutex<Vec<VisionRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            chat_replies: Mutex::new(VecDeque::new()),
            vision_reply: Ok(String::new()),
            models: Ok(Vec::new()),
            healthy: true,
            chat_requests: Mutex::new(Vec::new()),
            vision_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(self, text: &str) -> Self {
        self.chat_replies.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn with_chat_error(self, error: ProviderError) -> Self {
        self.chat_replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn with_description(mut self, text: &str) -> Self {
        self.vision_reply = Ok(text.to_string());
        self
    }

    pub fn with_vision_error(mut self, error: ProviderError) -> Self {
        self.vision_reply = Err(error);
        self
    }

    pub fn with_models(mut self, models: Result<Vec<String>, ProviderError>) -> Self {
        self.models = models;
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn vision_requests(&self) -> Vec<VisionRequest> {
        self.vision_requests.lock().unwrap().clone()
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_requests.lock().unwrap().len()
    }

    pub fn vision_calls(&self) -> usize {
        self.vision_requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let model = request.model.clone();
        self.chat_requests.lock().unwrap().push(request);

        let reply = self
            .chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))?;

        Ok(ChatResponse {
            content: reply,
            model,
        })
    }

    async fn describe_image(&self, request: VisionRequest) -> Result<String, ProviderError> {
        self.vision_requests.lock().unwrap().push(request);
        self.vision_reply.clone()
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        self.models.clone()
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(self.healthy)
    }
}
