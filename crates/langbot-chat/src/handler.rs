//! Conversation turn handler.
//!
//! One call to [`ConversationHandler::handle`] is one turn:
//! 1. Reject empty input before touching the session store
//! 2. Get/create the session and lock it for the rest of the turn
//! 3. Render the prompt from the preamble, history, and new message
//! 4. Call the provider once
//! 5. On success append the turn; on failure leave history untouched

use std::sync::Arc;

use tracing::{debug, warn};

use langbot_core::session::SessionStore;
use langbot_core::types::{Message, Turn};
use langbot_providers::traits::{LlmProvider, LlmRequestConfig};

use crate::error::ChatError;
use crate::prompt::PromptBuilder;

/// Session used when the caller does not name one.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Map a missing or empty client-supplied session id to [`DEFAULT_SESSION_ID`].
pub fn resolve_session_id(session_id: Option<&str>) -> &str {
    match session_id {
        Some(id) if !id.is_empty() => id,
        _ => DEFAULT_SESSION_ID,
    }
}

// ─────────────────────────────────────────────
// ConversationHandler
// ─────────────────────────────────────────────

/// Runs conversation turns against a shared session store and provider.
pub struct ConversationHandler {
    /// LLM provider.
    provider: Arc<dyn LlmProvider>,
    /// Session store, shared with whoever composed the handler.
    sessions: Arc<dyn SessionStore>,
    /// Prompt renderer.
    prompt: PromptBuilder,
    /// Model to use (overrides provider default if set).
    model: String,
    /// LLM request config (temperature, max_tokens).
    request_config: LlmRequestConfig,
}

impl ConversationHandler {
    /// Create a new handler.
    ///
    /// `model` falls back to the provider's default model and `prompt` to the
    /// default LangBot preamble.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        sessions: Arc<dyn SessionStore>,
        model: Option<String>,
        prompt: Option<PromptBuilder>,
        request_config: Option<LlmRequestConfig>,
    ) -> Self {
        let model = model.unwrap_or_else(|| provider.default_model().to_string());
        Self {
            provider,
            sessions,
            prompt: prompt.unwrap_or_default(),
            model,
            request_config: request_config.unwrap_or_default(),
        }
    }

    /// Process one user message in the given session and return the reply.
    pub async fn handle(&self, message: &str, session_id: &str) -> Result<String, ChatError> {
        if message.is_empty() {
            return Err(ChatError::InvalidInput);
        }

        let handle = self.sessions.get_or_create(session_id);
        // Held until the turn is recorded, so turns on one session never interleave
        let mut session = handle.lock().await;

        let prompt = self.prompt.render(&session.turns, message);
        debug!(
            session = %session_id,
            history_turns = session.turns.len(),
            prompt_len = prompt.len(),
            "rendered prompt"
        );

        let response = self
            .provider
            .chat(&[Message::user(prompt)], &self.model, &self.request_config)
            .await
            .map_err(|e| {
                warn!(
                    session = %session_id,
                    provider = self.provider.display_name(),
                    error = %e,
                    "provider call failed"
                );
                ChatError::Provider(e.to_string())
            })?;

        session.push_turn(Turn::new(message, response.content.as_str()));
        debug!(session = %session_id, turns = session.turns.len(), "turn recorded");

        Ok(response.content)
    }

    /// The session store this handler writes to.
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
