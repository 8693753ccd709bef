//! Completion-service providers for BayMed.
//!
//! All providers implement the `baymed_core::Provider` trait.
//! [`build_from_config`] wires the configured endpoint.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use std::sync::Arc;

use baymed_config::AppConfig;
use baymed_core::{Provider, ProviderError};

/// Build the provider described by `config.llm`.
///
/// Credentials are not needed here; they travel with each request, so a
/// provider can be built even when no API key is configured.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let llm = &config.llm;
    let provider = OpenAiCompatProvider::new(provider_name(&llm.base_url), &llm.base_url, llm.request_timeout())?
        .with_auth_style(llm.auth_style)
        .with_api_version(llm.api_version.clone());
    Ok(Arc::new(provider))
}

/// A short label for logs, derived from the endpoint host.
fn provider_name(base_url: &str) -> &'static str {
    if base_url.contains("openai.azure.com") {
        "azure"
    } else if base_url.contains("deepseek") {
        "deepseek"
    } else if base_url.contains("dashscope") {
        "qwen"
    } else if base_url.contains("openrouter") {
        "openrouter"
    } else if base_url.contains("api.openai.com") {
        "openai"
    } else {
        "custom"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_default_config() {
        let provider = build_from_config(&AppConfig::default()).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn names_follow_endpoint() {
        assert_eq!(provider_name("https://api.deepseek.com/v1"), "deepseek");
        assert_eq!(provider_name("https://gbam.openai.azure.com/openai/deployments/x"), "azure");
        assert_eq!(provider_name("http://localhost:8000/v1"), "custom");
    }
}
