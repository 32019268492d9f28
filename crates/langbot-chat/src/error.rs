//! Turn failures.

use thiserror::Error;

/// Why a conversation turn did not produce a reply.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// The message was empty or missing. Nothing was recorded.
    #[error("No input provided")]
    InvalidInput,

    /// The model provider call failed; carries the provider's message as-is.
    #[error("{0}")]
    Provider(String),
}
