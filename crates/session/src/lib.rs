//! Session-scoped conversation state.
//!
//! Every browser tab or terminal chat owns one [`ConversationState`]: an
//! append-only [`ConversationStore`] plus the last filter the map applied.
//! State is never shared between sessions. The [`SessionRegistry`] hands
//! out per-session handles; a turn locks its own session, never the registry.

pub mod registry;
pub mod store;

pub use registry::{SessionHandle, SessionId, SessionRegistry};
pub use store::{ConversationState, ConversationStore};
