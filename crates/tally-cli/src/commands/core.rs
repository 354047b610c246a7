//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `oracle_client` - Oracle selected from the environment
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tally_core::ai::AIClient;
use tally_core::config::Config;
use tally_core::db::Database;
use tracing::debug;

/// Load tally.toml (user override if present, embedded defaults otherwise)
pub fn load_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool, config: &Config) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    let db = if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")?
    } else {
        Database::new(path_str).context("Failed to open database")?
    };
    debug!(path = path_str, encrypted = db.is_encrypted(), "Opened database");
    Ok(db.with_default_target(config.budget.default_monthly_target))
}

/// Oracle client from AI_BACKEND and the backend's host variables
pub fn oracle_client(config: &Config) -> Result<AIClient> {
    AIClient::from_env(&config.oracle).context(
        "No language model configured. Set OLLAMA_HOST (or AI_BACKEND=openai_compatible \
         with OPENAI_COMPATIBLE_HOST), or use AI_BACKEND=mock to try Tally offline",
    )
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse an optional YYYY-MM-DD argument
pub fn parse_date_arg(flag: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool, config: &Config) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt, config)?;

    if db.is_encrypted() {
        println!("   🔒 Encryption: ENABLED");
    } else {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    }
    println!(
        "   Default monthly target: {:.2}",
        config.budget.default_monthly_target
    );

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Point Tally at a model: export OLLAMA_HOST=http://localhost:11434");
    println!("  2. Record an expense: tally spend \"gastei 50 no mercado\"");
    println!("  3. See where it goes: tally dashboard");

    Ok(())
}
