//! `baymed chat` — interactive or single-message terminal chat.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use baymed_agent::TurnEngine;
use baymed_dataset::DatasetLoader;
use baymed_session::ConversationState;
use tokio::io::{AsyncBufReadExt, BufReader};

const WELCOME: &str = "您好！我是您的跨境医疗助手。您可以问我：附近的三甲医院在哪里？港大深圳医院怎么走？哪里可以用长者医疗券？";

pub async fn run(
    config_path: Option<&Path>,
    message: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let dataset = DatasetLoader::new(&config.dataset.path).load();
    let engine = Arc::new(TurnEngine::from_config(&config, dataset)?);

    if !engine.has_credentials() {
        eprintln!();
        eprintln!("  WARNING: No API key configured; replies will only carry a setup notice.");
        eprintln!("  Set BAYMED_API_KEY (or OPENAI_API_KEY), or add llm.api_key to:");
        eprintln!("    {}", baymed_config::AppConfig::config_dir().join("config.toml").display());
        eprintln!();
    }

    let mut state = ConversationState::new();

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let outcome = engine.handle_turn(&mut state, &msg).await;
        eprint!("\r              \r");
        println!("{}", outcome.reply.content);
        return Ok(());
    }

    let available = engine.dataset().status.is_available();
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        BayMed — 大湾区跨境医疗助手             ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:       {}", config.llm.model);
    println!(
        "  Facilities:  {}{}",
        engine.dataset().records.len(),
        if available { "" } else { " (dataset unavailable)" }
    );
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();
    println!("  Assistant > {WELCOME}");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        eprint!("  ...");
        let outcome = engine.handle_turn(&mut state, line).await;
        eprint!("\r     \r");

        println!();
        for reply_line in outcome.reply.content.lines() {
            println!("  Assistant > {reply_line}");
        }
        if let Some(tip) = outcome.view.tip {
            println!("  Map       > {tip} ({} 个机构)", outcome.view.markers.len());
        }
        if let Some(notice) = outcome.view.notice_message {
            println!("  Map       > {notice}");
        }
        println!();
    }

    println!("  Goodbye!");
    Ok(())
}
