//! Provider registry — static specs for the supported LLM providers.
//!
//! Each `ProviderSpec` describes how to connect to a provider: keywords for
//! model matching, the conventional env var for its key, and its API base.

use std::collections::HashMap;

pub use langbot_core::config::schema::ProviderConfig;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"groq"`), also the key in `ProvidersConfig`.
    pub name: &'static str,
    /// Keywords to match in model names (lowercase).
    pub keywords: &'static [&'static str],
    /// Conventional environment variable for the API key.
    pub env_key: &'static str,
    /// Human-readable name for logs.
    pub display_name: &'static str,
    /// Whether this is a gateway/aggregator that serves many model families.
    /// Gateways are used as fallback when no direct match is found.
    pub is_gateway: bool,
    /// Whether this is a local/self-hosted provider; these need an explicit
    /// `api_base`.
    pub is_local: bool,
    /// If the API key starts with this prefix, auto-detect this provider.
    pub detect_by_key_prefix: Option<&'static str>,
    /// Default OpenAI-compatible API base URL.
    pub default_api_base: Option<&'static str>,
}

// ─────────────────────────────────────────────
// Supported providers (in matching priority order)
// ─────────────────────────────────────────────

/// Complete list of supported provider specifications, in matching priority order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "groq",
        keywords: &["groq", "gemma", "mixtral"],
        env_key: "GROQ_API_KEY",
        display_name: "Groq",
        is_gateway: false,
        is_local: false,
        detect_by_key_prefix: Some("gsk_"),
        default_api_base: Some("https://api.groq.com/openai/v1"),
    },
    ProviderSpec {
        name: "openai",
        keywords: &["openai", "gpt"],
        env_key: "OPENAI_API_KEY",
        display_name: "OpenAI",
        is_gateway: false,
        is_local: false,
        detect_by_key_prefix: None,
        default_api_base: Some("https://api.openai.com/v1"),
    },
    ProviderSpec {
        name: "deepseek",
        keywords: &["deepseek"],
        env_key: "DEEPSEEK_API_KEY",
        display_name: "DeepSeek",
        is_gateway: false,
        is_local: false,
        detect_by_key_prefix: None,
        default_api_base: Some("https://api.deepseek.com/v1"),
    },
    ProviderSpec {
        name: "openrouter",
        keywords: &["openrouter"],
        env_key: "OPENROUTER_API_KEY",
        display_name: "OpenRouter",
        is_gateway: true,
        is_local: false,
        detect_by_key_prefix: Some("sk-or-"),
        default_api_base: Some("https://openrouter.ai/api/v1"),
    },
    ProviderSpec {
        name: "vllm",
        keywords: &["vllm"],
        env_key: "VLLM_API_KEY",
        display_name: "vLLM",
        is_gateway: false,
        is_local: true,
        detect_by_key_prefix: None,
        default_api_base: None,
    },
];

// ─────────────────────────────────────────────
// Lookup helpers
// ─────────────────────────────────────────────

/// Find a direct (non-gateway, non-local) provider whose keywords appear in
/// the model name.
pub fn find_by_model(model: &str) -> Option<&'static ProviderSpec> {
    let model_lower = model.to_lowercase();
    PROVIDERS.iter().find(|spec| {
        !spec.is_gateway
            && !spec.is_local
            && spec.keywords.iter().any(|kw| model_lower.contains(kw))
    })
}

/// Find a provider spec by its internal name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

/// Find a provider whose key prefix matches the given API key.
pub fn find_by_key(api_key: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| {
        spec.detect_by_key_prefix
            .is_some_and(|pfx| api_key.starts_with(pfx))
    })
}

/// Pick the provider config + spec to use for a model.
///
/// 1. An explicitly named provider wins, if it has a key.
/// 2. Otherwise a direct provider matched by model keyword, if it has a key.
/// 3. Otherwise the first configured gateway.
pub fn match_provider<'a>(
    provider_name: Option<&str>,
    model: &str,
    providers: &'a HashMap<String, ProviderConfig>,
) -> Option<(&'a ProviderConfig, &'static ProviderSpec)> {
    let configured = |spec: &'static ProviderSpec| {
        providers
            .get(spec.name)
            .filter(|config| config.is_configured())
            .map(|config| (config, spec))
    };

    if let Some(name) = provider_name {
        return find_by_name(name).and_then(configured);
    }

    if let Some(found) = find_by_model(model).and_then(configured) {
        return Some(found);
    }

    PROVIDERS
        .iter()
        .filter(|spec| spec.is_gateway)
        .find_map(configured)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn providers_with(keys: &[(&str, &str)]) -> HashMap<String, ProviderConfig> {
        keys.iter()
            .map(|(name, key)| {
                (
                    name.to_string(),
                    ProviderConfig {
                        api_key: key.to_string(),
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_find_by_model_gemma_is_groq() {
        assert_eq!(find_by_model("gemma2-9b-it").unwrap().name, "groq");
    }

    #[test]
    fn test_find_by_model_case_insensitive() {
        assert_eq!(find_by_model("GPT-4o-mini").unwrap().name, "openai");
    }

    #[test]
    fn test_find_by_model_skips_gateways_and_local() {
        assert!(find_by_model("openrouter/auto").is_none());
        assert!(find_by_model("vllm-served").is_none());
    }

    #[test]
    fn test_find_by_name() {
        let spec = find_by_name("groq").unwrap();
        assert_eq!(spec.display_name, "Groq");
        assert_eq!(spec.env_key, "GROQ_API_KEY");
        assert!(find_by_name("nope").is_none());
    }

    #[test]
    fn test_find_by_key_prefix() {
        assert_eq!(find_by_key("sk-or-v1-abc").unwrap().name, "openrouter");
        assert_eq!(find_by_key("gsk_123").unwrap().name, "groq");
        assert!(find_by_key("sk-plain").is_none());
    }

    #[test]
    fn test_match_explicit_name() {
        let providers = providers_with(&[("groq", "gsk_1"), ("openai", "sk-1")]);
        let (config, spec) = match_provider(Some("openai"), "gemma2-9b-it", &providers).unwrap();
        assert_eq!(spec.name, "openai");
        assert_eq!(config.api_key, "sk-1");
    }

    #[test]
    fn test_match_explicit_name_without_key() {
        let providers = providers_with(&[("groq", "gsk_1")]);
        assert!(match_provider(Some("openai"), "gpt-4o", &providers).is_none());
    }

    #[test]
    fn test_match_by_model_keyword() {
        let providers = providers_with(&[("deepseek", "ds-1"), ("groq", "gsk_1")]);
        let (_, spec) = match_provider(None, "deepseek-chat", &providers).unwrap();
        assert_eq!(spec.name, "deepseek");
    }

    #[test]
    fn test_match_falls_back_to_gateway() {
        let providers = providers_with(&[("openrouter", "sk-or-1")]);
        let (_, spec) = match_provider(None, "meta-llama/llama-3-8b", &providers).unwrap();
        assert_eq!(spec.name, "openrouter");
    }

    #[test]
    fn test_match_nothing_configured() {
        let providers = providers_with(&[]);
        assert!(match_provider(None, "gemma2-9b-it", &providers).is_none());
    }

    #[test]
    fn test_every_direct_provider_has_default_base() {
        for spec in PROVIDERS.iter().filter(|s| !s.is_local) {
            assert!(spec.default_api_base.is_some(), "{} has no base", spec.name);
        }
    }
}
