//! Configuration loading, validation, and management for Neura.
//!
//! Loads configuration from `~/.neura/config.toml` (or an explicit path) with
//! environment variable overrides. Every field has a default, so a missing
//! file is not an error. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.neura/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the inference server
    #[serde(default = "default_host")]
    pub host: String,

    /// Chat model
    #[serde(default = "default_model")]
    pub model: String,

    /// Persona / instructions prepended to every context window
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Chat temperature (kept low: determinism over creativity)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Stop sequences that keep the model from writing further turn labels
    #[serde(default = "default_stop_sequences")]
    pub stop_sequences: Vec<String>,

    /// HTTP client timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Extra headers sent with every request to the inference server
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Conversation memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Vision configuration
    #[serde(default)]
    pub vision: VisionConfig,

    /// Reverse-tunnel deployment
    #[serde(default)]
    pub tunnel: TunnelConfig,
}

fn default_host() -> String {
    "http://127.0.0.1:11434".into()
}
fn default_model() -> String {
    "qwen2:0.5b".into()
}
fn default_system_prompt() -> String {
    "Você é a Neura, assistente brasileira, direta e clara. Responda em português.".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_stop_sequences() -> Vec<String> {
    ["USER:", "ASSISTANT:", "SYSTEM:", "User:", "Assistant:"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_request_timeout_secs() -> u64 {
    120
}
fn default_true() -> bool {
    true
}

/// Redact header values for Debug output; they may carry credentials.
fn redact(headers: &BTreeMap<String, String>) -> Vec<(&str, &'static str)> {
    headers.keys().map(|k| (k.as_str(), "[REDACTED]")).collect()
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("temperature", &self.temperature)
            .field("stop_sequences", &self.stop_sequences)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("headers", &redact(&self.headers))
            .field("memory", &self.memory)
            .field("vision", &self.vision)
            .field("tunnel", &self.tunnel)
            .finish()
    }
}

impl std::fmt::Debug for TunnelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelConfig")
            .field("url", &self.url)
            .field("headers", &redact(&self.headers))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Persist turns and send recent history with every request
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Number of stored turns included in each context window
    #[serde(default = "default_context_limit")]
    pub context_limit: usize,

    /// SQLite file; defaults to `~/.neura/data_memory.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
}

fn default_context_limit() -> usize {
    3
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            context_limit: default_context_limit(),
            db_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Vision-capable model
    #[serde(default = "default_vision_model")]
    pub model: String,

    /// Longest side, in pixels, after downscaling
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// JPEG quality (1-100) of the re-encoded payload
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Prompt used when the caller gives none
    #[serde(default = "default_vision_prompt")]
    pub default_prompt: String,

    /// Second-turn prompt built from a description; `{description}` is substituted
    #[serde(default = "default_followup_template")]
    pub followup_template: String,
}

fn default_vision_model() -> String {
    "moondream".into()
}
fn default_max_dimension() -> u32 {
    320
}
fn default_jpeg_quality() -> u8 {
    80
}
fn default_vision_prompt() -> String {
    "Describe this image objectively".into()
}
fn default_followup_template() -> String {
    "Abaixo está a descrição técnica de uma imagem. Comente de forma clara e curta: {description}"
        .into()
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_vision_model(),
            max_dimension: default_max_dimension(),
            jpeg_quality: default_jpeg_quality(),
            default_prompt: default_vision_prompt(),
            followup_template: default_followup_template(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TunnelConfig {
    /// Public URL of the reverse tunnel in front of the inference server
    #[serde(default = "default_tunnel_url")]
    pub url: String,

    /// Headers the tunnel needs to skip its interstitial page
    #[serde(default = "default_tunnel_headers")]
    pub headers: BTreeMap<String, String>,
}

fn default_tunnel_url() -> String {
    "https://neura-ai.loca.lt".into()
}
fn default_tunnel_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Bypass-Tunnel-Reminder".to_string(), "true".to_string())])
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            url: default_tunnel_url(),
            headers: default_tunnel_headers(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.neura/config.toml).
    ///
    /// Environment variables override file values:
    /// - `NEURA_HOST`, `NEURA_MODEL`, `NEURA_VISION_MODEL`
    /// - `NEURA_SYSTEM_PROMPT`, `NEURA_DB_PATH`
    /// - `NEURA_CONTEXT_LIMIT`, `NEURA_USE_MEMORY`
    /// - `NEURA_TUNNEL_URL`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Like [`load`](Self::load), but reads `path` instead of the default file when given.
    pub fn load_with(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Self::config_dir().join("config.toml"));
        let mut config = Self::load_from(&config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("NEURA_HOST") {
            self.host = host;
        }
        if let Some(model) = lookup("NEURA_MODEL") {
            self.model = model;
        }
        if let Some(model) = lookup("NEURA_VISION_MODEL") {
            self.vision.model = model;
        }
        if let Some(prompt) = lookup("NEURA_SYSTEM_PROMPT") {
            self.system_prompt = prompt;
        }
        if let Some(path) = lookup("NEURA_DB_PATH") {
            self.memory.db_path = Some(path);
        }
        if let Some(url) = lookup("NEURA_TUNNEL_URL") {
            self.tunnel.url = url;
        }
        if let Some(raw) = lookup("NEURA_CONTEXT_LIMIT") {
            match raw.trim().parse::<usize>() {
                Ok(limit) => self.memory.context_limit = limit,
                Err(_) => tracing::warn!("Ignoring NEURA_CONTEXT_LIMIT={raw}: not a number"),
            }
        }
        if let Some(raw) = lookup("NEURA_USE_MEMORY") {
            match parse_bool(&raw) {
                Some(enabled) => self.memory.enabled = enabled,
                None => tracing::warn!("Ignoring NEURA_USE_MEMORY={raw}: not a boolean"),
            }
        }
    }

    /// Point at the reverse tunnel instead of the local server.
    ///
    /// The tunnel headers are merged over the configured ones.
    pub fn use_tunnel(&mut self) {
        self.host = self.tunnel.url.clone();
        for (key, value) in &self.tunnel.headers {
            self.headers.insert(key.clone(), value.clone());
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".neura")
    }

    /// Resolved SQLite database path.
    pub fn db_path(&self) -> PathBuf {
        match &self.memory.db_path {
            Some(path) => PathBuf::from(path),
            None => Self::config_dir().join("data_memory.db"),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::ValidationError("host must not be empty".into()));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.memory.context_limit == 0 {
            return Err(ConfigError::ValidationError(
                "memory.context_limit must be at least 1".into(),
            ));
        }

        if self.vision.max_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "vision.max_dimension must be > 0".into(),
            ));
        }

        if !(1..=100).contains(&self.vision.jpeg_quality) {
            return Err(ConfigError::ValidationError(
                "vision.jpeg_quality must be between 1 and 100".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            stop_sequences: default_stop_sequences(),
            request_timeout_secs: default_request_timeout_secs(),
            headers: BTreeMap::new(),
            memory: MemoryConfig::default(),
            vision: VisionConfig::default(),
            tunnel: TunnelConfig::default(),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
