//! In-memory session storage with bounded capacity.
//!
//! Sessions live until they are removed or until the registry is full and a
//! newer session pushes out the one that was created first.
//!
//! Each session sits behind its own async mutex. A turn holds that mutex
//! for its whole duration, so turns on one session run one after another
//! while the registry itself is only locked long enough to look a handle up.
//! Removing a session drops the registry's handle; a turn still running on
//! it finishes on a detached state that nothing can reach again.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::store::ConversationState;

/// Opaque session identifier.
pub type SessionId = String;

/// Shared, lockable state of one session.
pub type SessionHandle = Arc<Mutex<ConversationState>>;

struct Entry {
    handle: SessionHandle,
    created_at: DateTime<Utc>,
}

pub struct SessionRegistry {
    sessions: HashMap<SessionId, Entry>,
    capacity: usize,
}

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Start a fresh session and return its id.
    pub fn create(&mut self) -> SessionId {
        let id = Uuid::new_v4().to_string();
        self.insert(id.clone());
        id
    }

    /// Handle of an existing session.
    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.get(id).map(|e| e.handle.clone())
    }

    /// Handle for `id`, registering an empty session under that id if needed.
    pub fn get_or_create(&mut self, id: &str) -> SessionHandle {
        match self.get(id) {
            Some(handle) => handle,
            None => self.insert(id.to_string()),
        }
    }

    fn insert(&mut self, id: SessionId) -> SessionHandle {
        if self.sessions.len() >= self.capacity {
            if let Some(oldest) = self
                .sessions
                .iter()
                .min_by_key(|(_, e)| e.created_at)
                .map(|(k, _)| k.clone())
            {
                debug!(session = %oldest, "Evicting oldest session");
                self.sessions.remove(&oldest);
            }
        }

        let state = ConversationState::new();
        let entry = Entry {
            created_at: state.created_at,
            handle: Arc::new(Mutex::new(state)),
        };
        let handle = entry.handle.clone();
        self.sessions.insert(id, entry);
        handle
    }

    /// Tear a session down. Returns whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
