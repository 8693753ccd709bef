//! # BayMed Core
//!
//! Domain types, traits, and error definitions for the BayMed cross-border
//! healthcare assistant. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Layout
//!
//! - [`facility`] — facility records, categories, marker colors, filter categories
//! - [`message`] — role-tagged chat messages
//! - [`provider`] — the completion-service abstraction
//! - [`error`] — the error taxonomy shared by every crate

pub mod error;
pub mod facility;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{DataError, ProviderError};
pub use facility::{Category, FacilityRecord, FilterCategory, MarkerColor};
pub use message::{Message, Role};
pub use provider::{Credentials, Provider, ProviderRequest, ProviderResponse, Usage};
