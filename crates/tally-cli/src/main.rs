//! Tally CLI - Personal finance assistant
//!
//! Usage:
//!   tally init                        Initialize database
//!   tally spend "uber 25 ontem"       Record an expense
//!   tally ask "quanto gastei hoje?"   Ask about your spending
//!   tally dashboard                   Current-month overview

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config()?;
    let today = commands::today();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt, &config),
        Commands::Spend { text } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, &config)?;
            let ai = commands::oracle_client(&config)?;
            commands::cmd_spend(&db, &ai, cli.user, &text.join(" "), today, cli.json).await
        }
        Commands::Ask { text } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, &config)?;
            let ai = commands::oracle_client(&config)?;
            commands::cmd_ask(&db, &ai, cli.user, &text.join(" "), today, cli.json).await
        }
        Commands::Dashboard => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, &config)?;
            commands::cmd_dashboard(&db, cli.user, today, cli.json)
        }
        Commands::Expenses {
            from,
            to,
            category,
            limit,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, &config)?;
            let from = commands::parse_date_arg("--from", from.as_deref())?;
            let to = commands::parse_date_arg("--to", to.as_deref())?;
            commands::cmd_expenses_list(&db, cli.user, from, to, category.as_deref(), limit, cli.json)
        }
        Commands::Target { set } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, &config)?;
            commands::cmd_target(&db, cli.user, set, cli.json)
        }
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id, text }) => {
                commands::cmd_prompts_show(&prompt_id, text.as_deref(), today)
            }
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt, &config).await,
    }
}
