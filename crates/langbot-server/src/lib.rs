//! LangBot HTTP service — router, error mapping, and the composition root.

pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use langbot_chat::{ConversationHandler, PromptBuilder};
use langbot_core::config::Config;
use langbot_core::session::{InMemorySessionStore, RetentionPolicy};
use langbot_providers::http_provider::create_provider;
use langbot_providers::LlmRequestConfig;

pub use error::ApiError;
pub use routes::{build_router, AppState, ChatRequest, ChatResponse};

/// Wire provider, session store, and handler together from configuration.
pub fn build_state(config: &Config) -> Result<AppState> {
    let chat = &config.chat;

    let provider = create_provider(
        Some(&chat.provider),
        &chat.model,
        &config.providers.to_map(),
        Duration::from_secs(chat.timeout_secs),
    )?;

    let policy = RetentionPolicy::from_max_sessions(config.sessions.max_sessions);
    let sessions = Arc::new(InMemorySessionStore::new(policy));

    let handler = ConversationHandler::new(
        Arc::new(provider),
        sessions,
        Some(chat.model.clone()),
        Some(PromptBuilder::new(&chat.system_prompt)),
        Some(LlmRequestConfig {
            max_tokens: chat.max_tokens,
            temperature: chat.temperature,
        }),
    );

    info!(
        provider = %chat.provider,
        model = %handler.model(),
        retention = ?policy,
        "chat handler initialized"
    );

    Ok(AppState::new(handler))
}
