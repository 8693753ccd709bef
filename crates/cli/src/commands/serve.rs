//! `baymed serve` — start the web app.

use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🏥 BayMed");
    println!("   Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Dataset:   {}", config.dataset.path.display());
    println!("   Model:     {}", config.llm.model);

    baymed_gateway::start(config).await?;

    Ok(())
}
