//! `baymed facilities` — print the map view a query produces.

use std::path::Path;

use baymed_agent::TurnEngine;
use baymed_dataset::DatasetLoader;

pub async fn run(
    config_path: Option<&Path>,
    query: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let dataset = DatasetLoader::new(&config.dataset.path).load();
    let engine = TurnEngine::from_config(&config, dataset)?;

    let view = engine.preview(query.as_deref().unwrap_or_default());

    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
