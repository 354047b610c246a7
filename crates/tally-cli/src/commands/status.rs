//! Status command implementation

use std::path::Path;

use anyhow::Result;
use tally_core::ai::{AIBackend, AIClient};
use tally_core::config::{default_config_path, Config};

use super::open_db;

pub async fn cmd_status(db_path: &Path, no_encrypt: bool, config: &Config) -> Result<()> {
    use std::fs;
    use tally_core::db::DB_KEY_ENV;

    println!();
    println!("📊 Tally Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    if db_path.exists() {
        if let Err(e) = open_db(db_path, no_encrypt, config) {
            println!();
            println!("   ❌ Error opening database: {}", e);
            if !no_encrypt && !has_key {
                println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
            } else if has_key {
                println!("      (Check if {} is correct)", DB_KEY_ENV);
            }
        }
    }

    println!();
    match default_config_path() {
        Some(path) if path.exists() => println!("   Config: {}", path.display()),
        _ => println!("   Config: built-in defaults"),
    }

    match AIClient::from_env(&config.oracle) {
        Some(client) => {
            let healthy = client.health_check().await;
            println!(
                "   {} Oracle: {} at {} ({})",
                if healthy { "✅" } else { "❌" },
                client.model(),
                client.host(),
                if healthy { "reachable" } else { "unreachable" }
            );
        }
        None => {
            println!("   ❌ Oracle: not configured");
            println!("      Set OLLAMA_HOST, or AI_BACKEND=mock to try Tally offline");
        }
    }

    println!();
    Ok(())
}
