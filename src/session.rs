use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::web::models::Message;

/// In-memory conversation history plus the set of sessions with a request in
/// flight. Nothing is persisted and sessions are never evicted; only the
/// per-session history length is capped.
#[derive(Debug, Default)]
pub struct SessionStore {
    histories: Mutex<HashMap<String, Vec<Message>>>,
    in_flight: Mutex<HashSet<String>>,
    max_turns: usize,
}

impl SessionStore {
    /// `max_turns` of `0` keeps the whole history. An odd cap is rounded up
    /// to a whole user/assistant pair.
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns: max_turns + max_turns % 2,
            ..Self::default()
        }
    }

    pub fn is_locked(&self, session_id: &str) -> bool {
        lock_ignoring_poison(&self.in_flight).contains(session_id)
    }

    /// Marks the session as in flight. Returns `false` if it already was.
    pub fn lock(&self, session_id: &str) -> bool {
        lock_ignoring_poison(&self.in_flight).insert(session_id.to_string())
    }

    pub fn unlock(&self, session_id: &str) {
        if lock_ignoring_poison(&self.in_flight).remove(session_id) {
            debug!("Released session {}", session_id);
        }
    }

    /// Locks the session and returns a guard that unlocks it when dropped.
    pub fn try_acquire(self: &Arc<Self>, session_id: &str) -> Option<SessionGuard> {
        if !self.lock(session_id) {
            return None;
        }
        debug!("Acquired session {}", session_id);
        Some(SessionGuard {
            store: Arc::clone(self),
            session_id: session_id.to_string(),
        })
    }

    /// Snapshot of the session's history, creating the session if needed.
    pub fn history(&self, session_id: &str) -> Vec<Message> {
        lock_ignoring_poison(&self.histories)
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    /// Appends one completed exchange, dropping the oldest pairs when the
    /// history grows past the cap.
    pub fn append_exchange(&self, session_id: &str, user: Message, assistant: Message) {
        let mut histories = lock_ignoring_poison(&self.histories);
        let history = histories.entry(session_id.to_string()).or_default();
        history.push(user);
        history.push(assistant);

        if self.max_turns > 0 && history.len() > self.max_turns {
            let excess = history.len() - self.max_turns;
            history.drain(..excess);
        }
    }

    pub fn session_count(&self) -> usize {
        lock_ignoring_poison(&self.histories).len()
    }
}

/// Holds a session's in-flight marker. Dropping it releases the session on
/// every path out of a request, including errors and panics.
#[derive(Debug)]
pub struct SessionGuard {
    store: Arc<SessionStore>,
    session_id: String,
}

impl SessionGuard {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.store.unlock(&self.session_id);
    }
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
