//! WebSocket endpoint for remotely-authoritative gesture sessions

pub mod handler;
pub mod protocol;

pub use handler::ws_handler;

use dashmap::DashMap;
use uuid::Uuid;

use crate::util::time::unix_millis;

/// Bookkeeping for one connected session
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// Distinguishes reconnects that reuse a session id
    pub connection_id: Uuid,
    pub connected_at_ms: u64,
}

/// Registry of live gesture sessions, keyed by session id
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionInfo>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session. A reconnect with the same id replaces the
    /// old entry.
    pub fn register(&self, session_id: String) -> Uuid {
        let connection_id = Uuid::new_v4();
        self.sessions.insert(
            session_id,
            SessionInfo {
                connection_id,
                connected_at_ms: unix_millis(),
            },
        );
        connection_id
    }

    pub fn remove(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}
