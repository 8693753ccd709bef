//! Error types for the BayMed domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type, recovered at its boundary.

use std::path::PathBuf;
use thiserror::Error;

// --- Bounded context errors ---

/// Failures of the remote completion service.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Reasons a facility dataset could not be read.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("Dataset file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read dataset at {}: {reason}", path.display())]
    ReadFailed { path: PathBuf, reason: String },

    #[error("Malformed dataset at {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn data_error_names_the_file() {
        let err = DataError::NotFound {
            path: PathBuf::from("/data/shenzhen_poi_enriched.csv"),
        };
        assert!(err.to_string().contains("shenzhen_poi_enriched.csv"));
    }
}
