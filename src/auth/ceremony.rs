//! In-flight ceremony session storage.
//!
//! Holds the server-side half of a two-phase WebAuthn exchange between the
//! Begin and Finish calls, keyed by the caller-supplied correlation key.
//! All state is process-local and volatile: a restart abandons every
//! in-flight ceremony, which is acceptable because the client simply
//! restarts the exchange.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use webauthn_rs::prelude::{PasskeyAuthentication, PasskeyRegistration};

/// Correlation key for an in-flight ceremony.
///
/// Logins are correlated by username (the caller is not authenticated yet);
/// registrations by the authenticated caller's identity id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CeremonyKey {
    // ---
    Login(String),
    Registration(i64),
}

/// Server-side ceremony state awaiting its Finish call.
pub enum CeremonyState {
    // ---
    Login(PasskeyAuthentication),
    Registration(PasskeyRegistration),
}

struct Entry {
    // ---
    state: CeremonyState,
    started: Instant,
}

/// Consume-once store for in-flight ceremony sessions.
///
/// One mutex guards the whole key space; critical sections cover only the
/// map mutation, never the ceremony library's cryptographic work. `take` is
/// linearizable: of two concurrent Finish calls for the same key, exactly
/// one observes the session.
pub struct CeremonyStore {
    // ---
    ttl: Duration,
    sessions: Mutex<HashMap<CeremonyKey, Entry>>,
}

impl CeremonyStore {
    // ---
    pub fn new(ttl: Duration) -> Self {
        // ---
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Store a session under `key`. An existing live session for the same
    /// key is silently overwritten: last Begin wins.
    pub fn put(&self, key: CeremonyKey, state: CeremonyState) {
        // ---
        let mut sessions = lock(&self.sessions);
        sessions.insert(
            key,
            Entry {
                state,
                started: Instant::now(),
            },
        );
    }

    /// Atomically fetch and delete the session under `key`.
    ///
    /// Returns `None` when no live session exists, including when a session
    /// was present but already past its TTL (the stale entry is dropped).
    pub fn take(&self, key: &CeremonyKey) -> Option<CeremonyState> {
        // ---
        let mut sessions = lock(&self.sessions);
        let entry = sessions.remove(key)?;
        if entry.started.elapsed() > self.ttl {
            tracing::debug!(?key, "discarding expired ceremony session");
            return None;
        }
        Some(entry.state)
    }

    /// Drop sessions older than the TTL. Returns the number evicted.
    ///
    /// An abandoned Begin would otherwise leak its entry for the life of
    /// the process.
    pub fn evict_expired(&self) -> usize {
        // ---
        let mut sessions = lock(&self.sessions);
        let before = sessions.len();
        sessions.retain(|_, entry| entry.started.elapsed() <= self.ttl);
        before - sessions.len()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        lock(&self.sessions).len()
    }
}

// A poisoned mutex only means another task panicked mid-mutation of the map;
// the map itself is still structurally sound, so keep serving.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
