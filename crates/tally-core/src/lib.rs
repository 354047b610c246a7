//! Tally Core Library
//!
//! Shared functionality for the Tally personal finance assistant:
//! - Free-text expense and query interpretation through a pluggable oracle
//! - Aggregation, month-over-month comparison and spending tips
//! - Encrypted SQLite storage behind store traits
//! - Prompt library with user overrides
//! - Configuration from tally.toml

pub mod ai;
pub mod analytics;
pub mod assistant;
pub mod config;
pub mod db;
pub mod error;
pub mod interpreter;
pub mod models;
pub mod prompts;
pub mod store;
pub mod window;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, MockBackend, OllamaBackend, OpenAICompatibleBackend};
pub use analytics::{
    aggregate, compare, generate_tips, AggregationResult, CategoryTotals, ComparisonResult, Tip,
    TipKind, TopCategory,
};
pub use assistant::{Assistant, CategoryShare, Dashboard, QueryReport, StatementOutcome};
pub use config::Config;
pub use db::Database;
pub use error::{Error, InterpretationError, Result};
pub use interpreter::ExpenseInterpreter;
pub use models::{Expense, NewExpense, QueryParameters, UserSettings};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use store::{ExpenseFilter, ExpenseStore, SettingsStore};
pub use window::DateWindow;
