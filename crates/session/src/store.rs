//! Append-only conversation log.

use baymed_core::{FilterCategory, Message, Role};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Ordered, append-only log of role-tagged messages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Snapshot of every message, in insertion order.
    pub fn all(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Borrowed view, for callers that only read.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Content of the newest message, only if the user sent it.
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Everything one session remembers.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationState {
    pub store: ConversationStore,
    pub last_filter: FilterCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            store: ConversationStore::new(),
            last_filter: FilterCategory::None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append and bump `updated_at`.
    pub fn push(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.store.append(message);
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}
