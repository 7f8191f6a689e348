//! Ollama provider implementation.
//!
//! Talks to the native Ollama HTTP API:
//! - `POST /api/chat` for context-window chat
//! - `POST /api/generate` with `images` for vision models
//! - `GET /api/tags` for the installed model catalog
//! - `GET /api/version` as the status probe
//!
//! Every request is a single non-streaming attempt; there is no retry.

use async_trait::async_trait;
use neura_config::AppConfig;
use neura_core::error::ProviderError;
use neura_core::message::ContextEntry;
use neura_core::provider::{ChatRequest, ChatResponse, Provider, VisionRequest};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Path used by [`Provider::health_check`].
pub const STATUS_PATH: &str = "/api/version";

/// An Ollama inference server.
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider for `base_url`, sending `headers` with every request.
    ///
    /// Fails if a header name/value is not valid HTTP or the client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        headers: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ProviderError::NotConfigured(format!("invalid header name '{name}': {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ProviderError::NotConfigured(format!("invalid value for header '{name}': {e}"))
            })?;
            default_headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Build from the application configuration (host, headers, timeout).
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::new(
            config.host.as_str(),
            &config.headers,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a JSON POST and decode a 200 body as `T`.
    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let response = ensure_success(response).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("{path}: {e}")))
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    ProviderError::from_transport(e.to_string(), e.is_timeout())
}

/// Turn a non-200 status into `ApiError`, keeping the body for diagnostics.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status == 200 {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    warn!(status, body = %error_body, "Inference server returned error");
    Err(ProviderError::ApiError {
        status_code: status,
        message: error_body,
    })
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let body = ApiChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream: false,
            options: ApiOptions {
                temperature: request.temperature,
                stop: &request.stop,
            },
        };

        debug!(
            model = %request.model,
            turns = request.messages.len(),
            "Sending chat request"
        );

        let api_response: ApiChatResponse = self.post_json("/api/chat", &body).await?;

        Ok(ChatResponse {
            content: api_response.message.content,
            model: api_response.model.unwrap_or(request.model),
        })
    }

    async fn describe_image(&self, request: VisionRequest) -> Result<String, ProviderError> {
        let body = ApiGenerateRequest {
            model: &request.model,
            prompt: &request.prompt,
            images: &request.images,
            stream: false,
            options: ApiOptions {
                temperature: request.temperature,
                stop: &[],
            },
        };

        debug!(
            model = %request.model,
            images = request.images.len(),
            "Sending vision request"
        );

        let api_response: ApiGenerateResponse = self.post_json("/api/generate", &body).await?;
        Ok(api_response.response)
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(transport_error)?;

        let response = ensure_success(response).await?;

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("/api/tags: {e}")))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let response = self
            .client
            .get(self.url(STATUS_PATH))
            .send()
            .await
            .map_err(transport_error)?;

        Ok(response.status().is_success())
    }
}

// --- Ollama API wire types ---

#[derive(Debug, Serialize)]
struct ApiOptions<'a> {
    temperature: f32,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop: &'a [String],
}

#[derive(Debug, Serialize)]
struct ApiChatRequest<'a> {
    model: &'a str,
    messages: &'a [ContextEntry],
    stream: bool,
    options: ApiOptions<'a>,
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    #[serde(default)]
    model: Option<String>,
    message: ApiChatMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChatMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct ApiGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: &'a [String],
    stream: bool,
    options: ApiOptions<'a>,
}

#[derive(Debug, Deserialize)]
struct ApiGenerateResponse {
    response: String,
}

/// `GET /api/tags` body. Only the fields we use are declared.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ApiModel>,
}

#[derive(Debug, Deserialize)]
struct ApiModel {
    name: String,
}
