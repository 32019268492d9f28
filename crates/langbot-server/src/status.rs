//! `langbot status` — show configuration and provider status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use langbot_core::config::{get_config_path, load_config};
use langbot_providers::registry::PROVIDERS;

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    println!();
    println!("{}", "LangBot Status".cyan().bold());
    println!();

    // Config
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".yellow().to_string()
        }
    );

    // Model
    println!(
        "  {:<18} {} via {}",
        "Model:".bold(),
        config.chat.model,
        config.chat.provider
    );
    println!(
        "  {:<18} {} | max_tokens: {} | timeout: {}s",
        "Parameters:".bold(),
        format!("temp: {}", config.chat.temperature).dimmed(),
        config.chat.max_tokens.to_string().dimmed(),
        config.chat.timeout_secs.to_string().dimmed(),
    );

    // Server
    println!(
        "  {:<18} http://{}:{}/chat",
        "Listen:".bold(),
        config.server.host,
        config.server.port
    );

    // Sessions
    let retention = match config.sessions.max_sessions {
        Some(n) => format!("at most {n} (LRU eviction)"),
        None => "unbounded".yellow().to_string(),
    };
    println!("  {:<18} {}", "Sessions:".bold(), retention);

    // Providers
    println!();
    println!("  {}", "Providers:".bold());
    let providers_map = config.providers.to_map();

    for spec in PROVIDERS {
        let status = match providers_map.get(spec.name) {
            Some(prov) if prov.is_configured() => {
                format!("{} ({})", "✓".green(), mask_key(&prov.api_key))
            }
            _ => format!("{} (set {})", "· not configured".dimmed(), spec.env_key),
        };
        let marker = if spec.name == config.chat.provider { "*" } else { " " };
        println!("   {marker}{:<20} {}", spec.display_name, status);
    }

    println!();

    Ok(())
}

/// Show only the first and last four characters of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
