//! Facility data for BayMed.
//!
//! - [`loader`] reads and normalizes the tabular facility file, once
//! - [`intent`] turns the latest utterance into a [`FilterCategory`] and narrows records
//! - [`map`] projects records into the marker set the browser map consumes
//!
//! [`FilterCategory`]: baymed_core::FilterCategory

pub mod intent;
pub mod loader;
pub mod map;

pub use intent::{classify, filter};
pub use loader::{DataStatus, Dataset, DatasetLoader, categorize, knowledge_base};
pub use map::{LegendEntry, MapMarker, MapNotice, MapView};
