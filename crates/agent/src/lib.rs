//! BayMed assistant turn.
//!
//! - [`responder`] builds the grounded system instruction and makes the one
//!   completion call per turn
//! - [`turn`] ties utterance, filter, map view and reply together

pub mod responder;
pub mod turn;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use responder::{
    AssistantResponder, MISSING_CONFIGURATION_REPLY, ResponderSettings, build_system_prompt,
};
pub use turn::{TurnEngine, TurnOutcome};
