//! In-memory session store with an explicit retention policy.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::types::Session;

/// Shared, lockable reference to one session.
pub type SessionHandle = Arc<Mutex<Session>>;

// ─────────────────────────────────────────────
// SessionStore trait
// ─────────────────────────────────────────────

/// Mapping from session id to conversation state.
///
/// Implementations must never hand the same [`SessionHandle`] out under two
/// different ids.
pub trait SessionStore: Send + Sync {
    /// Return the handle registered under `session_id`, creating an empty
    /// session first if the id has not been seen.
    fn get_or_create(&self, session_id: &str) -> SessionHandle;

    /// Return the handle for `session_id` without creating one.
    fn get(&self, session_id: &str) -> Option<SessionHandle>;

    /// Drop the session registered under `session_id`. Returns whether it was
    /// removed; a session with a turn in flight is kept.
    fn evict(&self, session_id: &str) -> bool;

    /// Number of live sessions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─────────────────────────────────────────────
// Retention policy
// ─────────────────────────────────────────────

/// How many sessions the store keeps before it starts evicting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Keep every session for the life of the process.
    ///
    /// Memory grows with the number of distinct session ids.
    #[default]
    Unbounded,
    /// Keep at most `n` sessions; creating one more evicts the least
    /// recently used idle session. When every session is busy the store
    /// grows past `n` until one goes idle.
    MaxSessions(usize),
}

impl RetentionPolicy {
    /// Build a policy from an optional capacity (`None` or `0` → unbounded).
    pub fn from_max_sessions(max: Option<usize>) -> Self {
        match max {
            Some(n) if n > 0 => RetentionPolicy::MaxSessions(n),
            _ => RetentionPolicy::Unbounded,
        }
    }
}

// ─────────────────────────────────────────────
// InMemorySessionStore
// ─────────────────────────────────────────────

struct Entry {
    handle: SessionHandle,
    /// Logical timestamp of the last access, for LRU ordering.
    last_used: AtomicU64,
}

impl Entry {
    /// Someone outside the store holds the handle (a turn is running or
    /// waiting for the lock).
    fn is_busy(&self) -> bool {
        Arc::strong_count(&self.handle) > 1 || self.handle.try_lock().is_err()
    }
}

/// Process-local session store.
///
/// Thread-safe via `RwLock` — lookups of existing sessions share the read
/// lock; only creation and eviction take the write lock.
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, Entry>>,
    clock: AtomicU64,
    policy: RetentionPolicy,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(RetentionPolicy::Unbounded)
    }
}

impl InMemorySessionStore {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
            policy,
        }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Remove the least recently used idle entry. Caller holds the write lock.
    ///
    /// Returns `false` when every entry is busy and nothing was removed.
    fn evict_lru(&self, entries: &mut HashMap<String, Entry>) -> bool {
        let oldest = entries
            .iter()
            .filter(|(_, entry)| !entry.is_busy())
            .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
            .map(|(key, _)| key.clone());

        match oldest {
            Some(key) => {
                entries.remove(&key);
                debug!(session = %key, "evicted least recently used session");
                true
            }
            None => false,
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn get_or_create(&self, session_id: &str) -> SessionHandle {
        // Fast path: existing session under the read lock
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get(session_id) {
                entry.last_used.store(self.tick(), Ordering::Relaxed);
                return entry.handle.clone();
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        // Another request may have created it between the two locks
        if let Some(entry) = entries.get(session_id) {
            entry.last_used.store(self.tick(), Ordering::Relaxed);
            return entry.handle.clone();
        }

        if let RetentionPolicy::MaxSessions(max) = self.policy {
            while entries.len() >= max {
                if !self.evict_lru(&mut entries) {
                    warn!(
                        total = entries.len(),
                        max,
                        "all sessions busy, exceeding retention limit"
                    );
                    break;
                }
            }
        }

        let handle: SessionHandle = Arc::new(Mutex::new(Session::new(session_id)));
        entries.insert(
            session_id.to_string(),
            Entry {
                handle: handle.clone(),
                last_used: AtomicU64::new(self.tick()),
            },
        );
        debug!(session = %session_id, total = entries.len(), "created session");
        handle
    }

    fn get(&self, session_id: &str) -> Option<SessionHandle> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(session_id).map(|entry| entry.handle.clone())
    }

    fn evict(&self, session_id: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get(session_id) {
            Some(entry) if entry.is_busy() => {
                debug!(session = %session_id, "session busy, not evicted");
                false
            }
            Some(_) => {
                entries.remove(session_id);
                debug!(session = %session_id, "evicted session");
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
