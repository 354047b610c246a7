//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Talk to your budget
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Personal finance assistant that understands plain-language expenses", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// User the command acts for
    #[arg(short, long, default_value = "1", global = true)]
    pub user: i64,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set TALLY_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Record an expense described in plain language
    ///
    /// Example: tally spend "gastei 50 no mercado hoje"
    Spend {
        /// What you spent, in your own words
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Ask a question about your spending
    ///
    /// Example: tally ask "quanto gastei com transporte este mês?"
    Ask {
        /// The question, in your own words
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Show the current-month dashboard
    Dashboard,

    /// List recorded expenses
    Expenses {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Maximum number of expenses to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show or change the monthly spending target
    Target {
        /// New monthly target
        #[arg(long)]
        set: Option<f64>,
    },

    /// Manage prompt templates (list, show, path)
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Show database and oracle status
    Status,
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List prompts with their source and template variables
    List,

    /// Show a prompt, or preview it rendered for a sample statement
    Show {
        /// Prompt ID (interpret_expense, interpret_query)
        prompt_id: String,

        /// Render with this text and today's date, as the oracle would receive it
        #[arg(long)]
        text: Option<String>,
    },

    /// Print the override directory
    Path,
}
