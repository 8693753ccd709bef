pub mod chat;
pub mod facilities;
pub mod init;
pub mod serve;

use std::path::Path;

use baymed_config::AppConfig;
use tracing::debug;

/// Load configuration, turning the error into a printable message.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = AppConfig::load(path).map_err(|e| format!("Failed to load config: {e}"))?;
    debug!(
        dataset = %config.dataset.path.display(),
        base_url = %config.llm.base_url,
        model = %config.llm.model,
        "Configuration loaded"
    );
    Ok(config)
}
