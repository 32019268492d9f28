//! Config loader — reads `~/.langbot/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.langbot/config.json` (or an explicit path)
//! 3. Environment variables `LANGBOT_<SECTION>__<FIELD>` (override JSON)
//! 4. Conventional provider key variables (`GROQ_API_KEY`, …) fill in keys
//!    that are still empty after step 3

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig};

/// Provider names paired with the upper-case segment used in env var names.
const PROVIDER_ENV_NAMES: &[(&str, &str)] = &[
    ("groq", "GROQ"),
    ("openai", "OPENAI"),
    ("openrouter", "OPENROUTER"),
    ("deepseek", "DEEPSEEK"),
    ("vllm", "VLLM"),
];

/// Get the LangBot data directory (e.g. `~/.langbot/`).
pub fn get_data_path() -> PathBuf {
    let home = std::env::var("HOME")
        .ok()
        .or_else(|| std::env::var("USERPROFILE").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".langbot")
}

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    get_data_path().join("config.json")
}

/// Load configuration from the given path (or the default one) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let config = load_config_from_path(&config_path);
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// `lookup` resolves a variable name to its value; production passes
/// `std::env::var`.
///
/// Supported overrides:
/// - `LANGBOT_CHAT__PROVIDER` → `chat.provider`
/// - `LANGBOT_CHAT__MODEL` → `chat.model`
/// - `LANGBOT_CHAT__SYSTEM_PROMPT` → `chat.system_prompt`
/// - `LANGBOT_CHAT__MAX_TOKENS` → `chat.max_tokens`
/// - `LANGBOT_CHAT__TEMPERATURE` → `chat.temperature`
/// - `LANGBOT_CHAT__TIMEOUT_SECS` → `chat.timeout_secs`
/// - `LANGBOT_PROVIDERS__<NAME>__API_KEY` → `providers.<name>.api_key`
/// - `LANGBOT_PROVIDERS__<NAME>__API_BASE` → `providers.<name>.api_base`
/// - `<NAME>_API_KEY` → `providers.<name>.api_key` when still empty
/// - `LANGBOT_SERVER__HOST` → `server.host`
/// - `LANGBOT_SERVER__PORT` → `server.port`
/// - `LANGBOT_SESSIONS__MAX_SESSIONS` → `sessions.max_sessions`
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    // Chat
    if let Some(val) = lookup("LANGBOT_CHAT__PROVIDER") {
        config.chat.provider = val;
    }
    if let Some(val) = lookup("LANGBOT_CHAT__MODEL") {
        config.chat.model = val;
    }
    if let Some(val) = lookup("LANGBOT_CHAT__SYSTEM_PROMPT") {
        config.chat.system_prompt = val;
    }
    if let Some(val) = lookup("LANGBOT_CHAT__MAX_TOKENS") {
        match val.parse::<u32>() {
            Ok(n) => config.chat.max_tokens = n,
            Err(_) => warn!(value = %val, "ignoring invalid LANGBOT_CHAT__MAX_TOKENS"),
        }
    }
    if let Some(val) = lookup("LANGBOT_CHAT__TEMPERATURE") {
        match val.parse::<f64>() {
            Ok(t) => config.chat.temperature = t,
            Err(_) => warn!(value = %val, "ignoring invalid LANGBOT_CHAT__TEMPERATURE"),
        }
    }
    if let Some(val) = lookup("LANGBOT_CHAT__TIMEOUT_SECS") {
        match val.parse::<u64>() {
            Ok(n) => config.chat.timeout_secs = n,
            Err(_) => warn!(value = %val, "ignoring invalid LANGBOT_CHAT__TIMEOUT_SECS"),
        }
    }

    // Providers
    for (name, env_name) in PROVIDER_ENV_NAMES {
        if let Some(provider) = config.providers.get_by_name_mut(name) {
            apply_provider_env(provider, env_name, &lookup);
        }
    }

    // Server
    if let Some(val) = lookup("LANGBOT_SERVER__HOST") {
        config.server.host = val;
    }
    if let Some(val) = lookup("LANGBOT_SERVER__PORT") {
        match val.parse::<u16>() {
            Ok(p) => config.server.port = p,
            Err(_) => warn!(value = %val, "ignoring invalid LANGBOT_SERVER__PORT"),
        }
    }

    // Sessions
    if let Some(val) = lookup("LANGBOT_SESSIONS__MAX_SESSIONS") {
        match val.parse::<usize>() {
            Ok(n) if n > 0 => config.sessions.max_sessions = Some(n),
            _ => warn!(value = %val, "ignoring invalid LANGBOT_SESSIONS__MAX_SESSIONS"),
        }
    }

    config
}

/// Apply env var overrides for a single provider.
fn apply_provider_env<F>(provider: &mut ProviderConfig, name: &str, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(&format!("LANGBOT_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Some(val) = lookup(&format!("LANGBOT_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
    if provider.api_key.is_empty() {
        if let Some(val) = lookup(&format!("{name}_API_KEY")) {
            provider.api_key = val;
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.chat.model, "gemma2-9b-it");
        assert_eq!(config.server.port, 5001);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "chat": {
                "model": "llama-3.3-70b-versatile",
                "maxTokens": 2048
            }
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.chat.model, "llama-3.3-70b-versatile");
        assert_eq!(config.chat.max_tokens, 2048);
        // Default preserved
        assert_eq!(config.chat.temperature, 0.7);
        assert_eq!(config.chat.provider, "groq");
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_from_path(file.path());
        assert_eq!(config.chat.max_tokens, 1024);
    }

    #[test]
    fn test_load_empty_json() {
        let file = write_temp_json("{}");
        let config = load_config_from_path(file.path());
        assert_eq!(config.chat.model, "gemma2-9b-it");
    }

    #[test]
    fn test_env_override_chat() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[
                ("LANGBOT_CHAT__MODEL", "test-model"),
                ("LANGBOT_CHAT__PROVIDER", "openrouter"),
                ("LANGBOT_CHAT__TEMPERATURE", "0.2"),
                ("LANGBOT_CHAT__SYSTEM_PROMPT", "Be terse."),
            ]),
        );
        assert_eq!(config.chat.model, "test-model");
        assert_eq!(config.chat.provider, "openrouter");
        assert_eq!(config.chat.temperature, 0.2);
        assert_eq!(config.chat.system_prompt, "Be terse.");
    }

    #[test]
    fn test_env_override_invalid_number_ignored() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[("LANGBOT_CHAT__MAX_TOKENS", "lots"), ("LANGBOT_SERVER__PORT", "99999")]),
        );
        assert_eq!(config.chat.max_tokens, 1024);
        assert_eq!(config.server.port, 5001);
    }

    #[test]
    fn test_env_override_server_and_sessions() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[
                ("LANGBOT_SERVER__HOST", "0.0.0.0"),
                ("LANGBOT_SERVER__PORT", "9999"),
                ("LANGBOT_SESSIONS__MAX_SESSIONS", "500"),
            ]),
        );
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.sessions.max_sessions, Some(500));
    }

    #[test]
    fn test_env_zero_max_sessions_ignored() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[("LANGBOT_SESSIONS__MAX_SESSIONS", "0")]),
        );
        assert!(config.sessions.max_sessions.is_none());
    }

    #[test]
    fn test_conventional_api_key_var() {
        let config = apply_env_overrides(Config::default(), env(&[("GROQ_API_KEY", "gsk-plain")]));
        assert_eq!(config.providers.groq.api_key, "gsk-plain");
    }

    #[test]
    fn test_prefixed_api_key_wins_over_conventional() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[
                ("GROQ_API_KEY", "gsk-plain"),
                ("LANGBOT_PROVIDERS__GROQ__API_KEY", "gsk-prefixed"),
                ("LANGBOT_PROVIDERS__GROQ__API_BASE", "http://127.0.0.1:8080/v1"),
            ]),
        );
        assert_eq!(config.providers.groq.api_key, "gsk-prefixed");
        assert_eq!(
            config.providers.groq.api_base.as_deref(),
            Some("http://127.0.0.1:8080/v1")
        );
    }

    #[test]
    fn test_file_key_not_replaced_by_conventional_var() {
        let mut config = Config::default();
        config.providers.openai.api_key = "sk-from-file".into();
        let config = apply_env_overrides(config, env(&[("OPENAI_API_KEY", "sk-from-env")]));
        assert_eq!(config.providers.openai.api_key, "sk-from-file");
    }
}
