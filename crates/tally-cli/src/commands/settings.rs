//! Monthly target command

use anyhow::{Context, Result};
use tally_core::assistant::Assistant;
use tally_core::db::Database;

use super::print_json;

pub fn cmd_target(db: &Database, user_id: i64, set: Option<f64>, json: bool) -> Result<()> {
    let assistant = Assistant::without_oracle(db, db);

    let settings = match set {
        Some(value) => assistant
            .set_monthly_target(user_id, value)
            .context("Failed to update monthly target")?,
        None => assistant.settings(user_id)?,
    };

    if json {
        return print_json(&settings);
    }

    if set.is_some() {
        println!("✅ Monthly target set to {:.2}", settings.monthly_target);
    } else {
        println!("🎯 Monthly target: {:.2}", settings.monthly_target);
        println!("   Change it with: tally target --set <amount>");
    }

    Ok(())
}
