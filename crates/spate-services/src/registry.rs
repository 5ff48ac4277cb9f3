//! Session registry — tracks live measurement sessions by caller-chosen id.

use std::sync::Arc;

use dashmap::DashMap;

use spate_core::meter::SessionMeter;

/// The session table — shared across all connection tasks and the reaper.
///
/// Meters are handed out as `Arc`s, so a transfer loop keeps metering its
/// clone even if the entry is evicted mid-transfer; the orphaned meter is
/// simply dropped with the last clone.
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<SessionMeter>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Create a new empty registry behind an `Arc`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Look up the meter for `session_id`, optionally creating it.
    ///
    /// The empty id is never a session: it misses even with
    /// `create_if_missing`. Two racing creators converge on one meter; the
    /// entry API re-checks under the shard lock.
    pub fn resolve(&self, session_id: &str, create_if_missing: bool) -> Option<Arc<SessionMeter>> {
        if session_id.is_empty() {
            return None;
        }
        if let Some(existing) = self.sessions.get(session_id) {
            return Some(existing.value().clone());
        }
        if !create_if_missing {
            return None;
        }
        Some(
            self.sessions
                .entry(session_id.to_string())
                .or_default()
                .clone(),
        )
    }

    /// Drop `session_id` from the table. Returns whether it was present.
    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Keep only the entries `keep` approves of. Used by the reaper sweep.
    pub fn retain(&self, keep: impl FnMut(&String, &mut Arc<SessionMeter>) -> bool) {
        self.sessions.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
