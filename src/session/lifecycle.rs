//! Session lifecycle: creation, expiry and reset
//!
//! A session is `{ id, last_activity_at }` persisted under two independent
//! keys. It is expired once `now - last_activity_at` exceeds the timeout, and
//! only direct user interaction moves `last_activity_at` forward, so a tab
//! left open with background DOM churn still expires.

use super::id::IdGenerator;
use super::types::ActivityOutcome;
use crate::storage::{KeyValueStore, LAST_ACTIVE_KEY, SESSION_ID_KEY};

/// Owns the current session id and its persisted state
pub struct SessionManager {
    store: Box<dyn KeyValueStore>,
    ids: Box<dyn IdGenerator>,
    timeout_ms: u64,
    session_id: String,
    debug: bool,
}

impl SessionManager {
    /// Create the manager and establish a session right away
    pub fn start(
        store: Box<dyn KeyValueStore>,
        ids: Box<dyn IdGenerator>,
        timeout_ms: u64,
        now: u64,
    ) -> Self {
        let mut manager = Self {
            store,
            ids,
            timeout_ms,
            session_id: String::new(),
            debug: false,
        };
        manager.ensure_session(now);
        manager
    }

    /// Enable per-operation diagnostic logging
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Current session id
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Persisted last-activity timestamp, if readable
    pub fn last_activity(&self) -> Option<u64> {
        match self.store.get(LAST_ACTIVE_KEY) {
            Ok(value) => value
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|&t| t > 0),
            Err(e) => {
                if self.debug {
                    tracing::debug!("Failed to read last activity: {}", e);
                }
                None
            }
        }
    }

    fn stored_session_id(&self) -> Option<String> {
        match self.store.get(SESSION_ID_KEY) {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                if self.debug {
                    tracing::debug!("Failed to read session id: {}", e);
                }
                None
            }
        }
    }

    /// Reuse the stored session if it is still valid, otherwise start a new
    /// one. Either way last-activity is stamped to `now`.
    ///
    /// A missing id, a missing last-activity, or an expired pair all count as
    /// "no valid session".
    pub fn ensure_session(&mut self, now: u64) -> &str {
        let expired = match self.last_activity() {
            Some(last) => now.saturating_sub(last) > self.timeout_ms,
            None => true,
        };

        match self.stored_session_id() {
            Some(stored) if !expired => {
                if self.debug {
                    tracing::debug!("Resuming session {}", stored);
                }
                self.session_id = stored;
            }
            _ => {
                let id = self.ids.generate();
                tracing::info!("Started session {}", id);
                self.write(SESSION_ID_KEY, &id);
                self.session_id = id;
            }
        }

        self.write(LAST_ACTIVE_KEY, &now.to_string());
        &self.session_id
    }

    /// Whether the stored last-activity is older than the timeout
    ///
    /// An unset last-activity is not expired here; it only matters when a
    /// session is being established.
    pub fn is_expired(&self, now: u64) -> bool {
        self.last_activity()
            .is_some_and(|last| now.saturating_sub(last) > self.timeout_ms)
    }

    /// Evaluate expiry, then record the activity
    ///
    /// An expired session is reset before anything else. Only interaction
    /// events refresh last-activity.
    pub fn note_activity(&mut self, now: u64, interaction: bool) -> ActivityOutcome {
        let outcome = if self.is_expired(now) {
            self.reset(now)
        } else {
            ActivityOutcome::Continued
        };

        if interaction {
            self.touch(now);
        }

        outcome
    }

    /// Persist `now` as the last activity
    pub fn touch(&mut self, now: u64) {
        self.write(LAST_ACTIVE_KEY, &now.to_string());
    }

    /// Drop the current session and establish a replacement
    pub fn reset(&mut self, now: u64) -> ActivityOutcome {
        let previous = std::mem::take(&mut self.session_id);
        self.clear();
        let current = self.ensure_session(now).to_string();
        tracing::info!("Session {} expired, replaced by {}", previous, current);

        ActivityOutcome::Reset { previous, current }
    }

    /// Remove both persisted session keys
    ///
    /// The in-memory id is kept so it can still be reported after stop.
    pub fn clear(&mut self) {
        for key in [SESSION_ID_KEY, LAST_ACTIVE_KEY] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!("Failed to remove {}: {}", key, e);
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!("Failed to persist {}: {}", key, e);
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session_id", &self.session_id)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}
