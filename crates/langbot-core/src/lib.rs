//! LangBot core — shared message types, configuration, and the session store.

pub mod config;
pub mod session;
pub mod types;

pub use session::{InMemorySessionStore, RetentionPolicy, Session, SessionHandle, SessionStore};
pub use types::{Message, Turn};
