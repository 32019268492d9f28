//! Configuration schema.
//!
//! Hierarchy: `Config` → `ChatConfig`, `ProvidersConfig`, `ServerConfig`,
//! `SessionsConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Instruction line placed at the top of every rendered prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are LangBot, a helpful AI assistant.";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.langbot/config.json` + env vars.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub chat: ChatConfig,
    pub providers: ProvidersConfig,
    pub server: ServerConfig,
    pub sessions: SessionsConfig,
}

/// Problems that make a configuration unusable for serving requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no model configured (set LANGBOT_CHAT__MODEL or chat.model)")]
    MissingModel,
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),
    #[error("no API key configured for provider '{provider}' (set {env_key})")]
    MissingApiKey {
        provider: String,
        env_key: String,
    },
}

impl Config {
    /// Check that the fields required to reach the model provider are present.
    ///
    /// `env_key` names the conventional environment variable for the selected
    /// provider, used only to make the error actionable.
    pub fn validate(&self, env_key: &str) -> Result<(), ConfigError> {
        if self.chat.model.trim().is_empty() {
            return Err(ConfigError::MissingModel);
        }
        let provider = self
            .providers
            .get_by_name(&self.chat.provider)
            .ok_or_else(|| ConfigError::UnknownProvider(self.chat.provider.clone()))?;
        if !provider.is_configured() {
            return Err(ConfigError::MissingApiKey {
                provider: self.chat.provider.clone(),
                env_key: env_key.to_string(),
            });
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────

/// Model selection and generation settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    /// Provider name from the registry (e.g. `"groq"`).
    pub provider: String,
    /// Model identifier passed to the provider.
    pub model: String,
    /// Instruction preamble at the top of every prompt.
    pub system_prompt: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// HTTP request timeout for provider calls, in seconds.
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: "gemma2-9b-it".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Configuration for a single LLM provider (API key, base URL, headers).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    #[serde(default)]
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// All provider configurations, one per supported backend.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub groq: ProviderConfig,
    #[serde(default)]
    pub openai: ProviderConfig,
    #[serde(default)]
    pub openrouter: ProviderConfig,
    #[serde(default)]
    pub deepseek: ProviderConfig,
    #[serde(default)]
    pub vllm: ProviderConfig,
}

impl ProvidersConfig {
    /// Get a provider config by name (e.g. `"groq"`).
    pub fn get_by_name(&self, name: &str) -> Option<&ProviderConfig> {
        match name {
            "groq" => Some(&self.groq),
            "openai" => Some(&self.openai),
            "openrouter" => Some(&self.openrouter),
            "deepseek" => Some(&self.deepseek),
            "vllm" => Some(&self.vllm),
            _ => None,
        }
    }

    /// Mutable variant of [`get_by_name`](Self::get_by_name).
    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut ProviderConfig> {
        match name {
            "groq" => Some(&mut self.groq),
            "openai" => Some(&mut self.openai),
            "openrouter" => Some(&mut self.openrouter),
            "deepseek" => Some(&mut self.deepseek),
            "vllm" => Some(&mut self.vllm),
            _ => None,
        }
    }

    /// Convert to a HashMap<String, ProviderConfig> for use with the provider registry.
    pub fn to_map(&self) -> HashMap<String, ProviderConfig> {
        let entries: &[(&str, &ProviderConfig)] = &[
            ("groq", &self.groq),
            ("openai", &self.openai),
            ("openrouter", &self.openrouter),
            ("deepseek", &self.deepseek),
            ("vllm", &self.vllm),
        ];
        entries
            .iter()
            .map(|(name, config)| (name.to_string(), (*config).clone()))
            .collect()
    }
}

// ─────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────

/// HTTP listener settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
        }
    }
}

// ─────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────

/// Session retention settings.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionsConfig {
    /// Upper bound on live sessions; the least recently used one is evicted
    /// past it. `None` keeps every session for the life of the process.
    pub max_sessions: Option<usize>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
