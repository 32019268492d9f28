//! Session store — per-key conversation state shared by all request handlers.
//!
//! Sessions live in memory for the life of the process. Each entry is handed
//! out as a [`SessionHandle`], an async mutex around the [`Session`]; holding
//! the lock for a whole turn is what keeps concurrent turns on the same key
//! from interleaving.

pub mod store;

pub use crate::types::Session;
pub use store::{InMemorySessionStore, RetentionPolicy, SessionHandle, SessionStore};
