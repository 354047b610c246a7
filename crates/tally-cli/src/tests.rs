//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::NaiveDate;
use clap::Parser;
use tally_core::ai::{AIClient, MockBackend};
use tally_core::config::Config;
use tally_core::db::Database;
use tally_core::models::NewExpense;
use tally_core::store::{ExpenseFilter, ExpenseStore, SettingsStore};

use crate::cli::{Cli, Commands, PromptsAction};
use crate::commands::{self, truncate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn seed(db: &Database, amount: f64, category: &str, day: NaiveDate) {
    db.insert_expense(&NewExpense {
        user_id: 1,
        amount,
        category: category.to_string(),
        date: day,
        description: format!("{} purchase", category),
    })
    .unwrap();
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_spend_joins_words() {
    let cli = Cli::try_parse_from(["tally", "--user", "4", "spend", "uber", "25", "ontem"]).unwrap();
    assert_eq!(cli.user, 4);
    match cli.command {
        Commands::Spend { text } => assert_eq!(text.join(" "), "uber 25 ontem"),
        _ => panic!("expected spend"),
    }
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["tally", "dashboard", "--json", "--no-encrypt"]).unwrap();
    assert!(cli.json);
    assert!(cli.no_encrypt);
    assert_eq!(cli.user, 1);
    assert_eq!(cli.db.to_str(), Some("tally.db"));
}

#[test]
fn test_parse_spend_requires_text() {
    assert!(Cli::try_parse_from(["tally", "spend"]).is_err());
}

#[test]
fn test_parse_expenses_and_prompts() {
    let cli = Cli::try_parse_from([
        "tally", "expenses", "--from", "2024-03-01", "-c", "lazer", "-l", "5",
    ])
    .unwrap();
    match cli.command {
        Commands::Expenses {
            from,
            to,
            category,
            limit,
        } => {
            assert_eq!(from.as_deref(), Some("2024-03-01"));
            assert!(to.is_none());
            assert_eq!(category.as_deref(), Some("lazer"));
            assert_eq!(limit, 5);
        }
        _ => panic!("expected expenses"),
    }

    let cli = Cli::try_parse_from([
        "tally", "prompts", "show", "interpret_query", "--text", "uber este ano",
    ])
    .unwrap();
    match cli.command {
        Commands::Prompts {
            action: Some(PromptsAction::Show { prompt_id, text }),
        } => {
            assert_eq!(prompt_id, "interpret_query");
            assert_eq!(text.as_deref(), Some("uber este ano"));
        }
        _ => panic!("expected prompts show"),
    }
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a longer description", 10), "a longe...");
    // Multi-byte characters are never split
    assert_eq!(truncate("alimentação no mercado", 12), "alimentaç...");
}

#[test]
fn test_parse_date_arg() {
    assert_eq!(
        commands::parse_date_arg("--from", Some("2024-03-01")).unwrap(),
        Some(date(2024, 3, 1))
    );
    assert_eq!(commands::parse_date_arg("--from", None).unwrap(), None);

    let err = commands::parse_date_arg("--to", Some("03/01/2024")).unwrap_err();
    assert!(err.to_string().contains("--to"));
}

#[test]
fn test_open_db_applies_configured_target() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("cli.db");
    let mut config = Config::default();
    config.budget.default_monthly_target = 1234.0;

    let db = commands::open_db(&path, true, &config).unwrap();
    assert!(!db.is_encrypted());
    assert_eq!(db.get_or_create_settings(1).unwrap().monthly_target, 1234.0);
}

#[test]
fn test_cmd_init() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("init.db");
    commands::cmd_init(&path, true, &Config::default()).unwrap();
    assert!(path.exists());
}

// ========== Expense Command Tests ==========

#[tokio::test]
async fn test_cmd_spend_records_expense() {
    let db = setup_test_db();
    let ai = AIClient::Mock(MockBackend::new());

    commands::cmd_spend(&db, &ai, 1, "gastei 35 no cinema", date(2024, 3, 5), false)
        .await
        .unwrap();

    let stored = db.query_expenses(&ExpenseFilter::for_user(1)).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].amount, 35.0);
    assert_eq!(stored[0].category, "lazer");
}

#[tokio::test]
async fn test_cmd_spend_rejection_is_not_an_error() {
    let db = setup_test_db();
    let ai = AIClient::Mock(MockBackend::unhealthy());

    let result = commands::cmd_spend(&db, &ai, 1, "mercado 10", date(2024, 3, 5), true).await;
    assert!(result.is_ok());
    assert_eq!(db.count_expenses(1).unwrap(), 0);
}

#[test]
fn test_cmd_expenses_list() {
    let db = setup_test_db();
    seed(&db, 10.0, "lazer", date(2024, 3, 1));
    seed(&db, 20.0, "transporte", date(2024, 3, 2));

    assert!(commands::cmd_expenses_list(&db, 1, None, None, None, 20, false).is_ok());
    assert!(commands::cmd_expenses_list(&db, 1, None, None, Some("lazer"), 1, true).is_ok());
    // Empty result prints a hint
    assert!(commands::cmd_expenses_list(&db, 2, None, None, None, 20, false).is_ok());
    // Inverted range is rejected
    assert!(commands::cmd_expenses_list(
        &db,
        1,
        Some(date(2024, 3, 2)),
        Some(date(2024, 3, 1)),
        None,
        20,
        false
    )
    .is_err());
}

// ========== Report Command Tests ==========

#[tokio::test]
async fn test_cmd_ask() {
    let db = setup_test_db();
    seed(&db, 40.0, "alimentação", date(2024, 3, 1));
    let ai = AIClient::Mock(MockBackend::new());

    assert!(
        commands::cmd_ask(&db, &ai, 1, "quanto gastei este mês?", date(2024, 3, 10), false)
            .await
            .is_ok()
    );
    assert!(
        commands::cmd_ask(&db, &ai, 1, "mercado este ano", date(2024, 3, 10), true)
            .await
            .is_ok()
    );
}

#[test]
fn test_cmd_dashboard() {
    let db = setup_test_db();
    assert!(commands::cmd_dashboard(&db, 1, date(2024, 3, 10), false).is_ok());

    seed(&db, 100.0, "moradia", date(2024, 3, 1));
    seed(&db, 50.0, "moradia", date(2024, 2, 1));
    assert!(commands::cmd_dashboard(&db, 1, date(2024, 3, 10), false).is_ok());
    assert!(commands::cmd_dashboard(&db, 1, date(2024, 3, 10), true).is_ok());
}

// ========== Settings Command Tests ==========

#[test]
fn test_cmd_target() {
    let db = setup_test_db();

    commands::cmd_target(&db, 1, None, false).unwrap();
    assert_eq!(db.get_or_create_settings(1).unwrap().monthly_target, 2000.0);

    commands::cmd_target(&db, 1, Some(750.0), false).unwrap();
    assert_eq!(db.get_or_create_settings(1).unwrap().monthly_target, 750.0);

    assert!(commands::cmd_target(&db, 1, Some(0.0), false).is_err());
    assert_eq!(db.get_or_create_settings(1).unwrap().monthly_target, 750.0);
}

// ========== Prompts Command Tests ==========

#[test]
fn test_cmd_prompts() {
    let today = date(2024, 3, 10);
    assert!(commands::cmd_prompts_list().is_ok());
    assert!(commands::cmd_prompts_show("interpret_expense", None, today).is_ok());
    assert!(
        commands::cmd_prompts_show("interpret_query", Some("uber este ano"), today).is_ok()
    );
    // Unknown IDs print the known ones instead of failing
    assert!(commands::cmd_prompts_show("nonexistent", None, today).is_ok());
    assert!(commands::cmd_prompts_path().is_ok());
}
