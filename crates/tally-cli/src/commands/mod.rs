//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, oracle_client, config)
//! - `expenses` - Record and list expenses
//! - `prompts` - Prompt library management commands
//! - `reports` - Questions and the dashboard
//! - `settings` - Monthly target
//! - `status` - Database and oracle status

pub mod core;
pub mod expenses;
pub mod prompts;
pub mod reports;
pub mod settings;
pub mod status;

// Re-export command functions for main.rs
pub use core::*;
pub use expenses::*;
pub use prompts::*;
pub use reports::*;
pub use settings::*;
pub use status::*;

use anyhow::Result;
use serde::Serialize;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
