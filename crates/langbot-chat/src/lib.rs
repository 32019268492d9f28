//! LangBot chat — conversation turns over a session store and an LLM provider.
//!
//! - **prompt**: renders preamble + history + new message into one prompt
//! - **handler**: the per-turn read-history → call-model → append-turn cycle
//! - **error**: the two failure kinds a turn can end in

pub mod error;
pub mod handler;
pub mod prompt;

pub use error::ChatError;
pub use handler::{resolve_session_id, ConversationHandler, DEFAULT_SESSION_ID};
pub use prompt::PromptBuilder;
