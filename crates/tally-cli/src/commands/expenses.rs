//! Expense command implementations (spend, list)

use anyhow::Result;
use chrono::NaiveDate;
use tally_core::ai::AIClient;
use tally_core::assistant::{Assistant, StatementOutcome};
use tally_core::db::Database;
use tally_core::models::Expense;

use super::{print_json, truncate};

pub async fn cmd_spend(
    db: &Database,
    ai: &AIClient,
    user_id: i64,
    text: &str,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let assistant = Assistant::new(db, db, ai);
    let outcome = assistant.process_statement(text, user_id, today).await?;

    if json {
        return print_json(&outcome);
    }

    match outcome {
        StatementOutcome::Success { record } => {
            println!("✅ Recorded expense #{}", record.id);
            println!("   Amount:      {:.2}", record.amount);
            println!("   Category:    {}", record.category);
            println!("   Date:        {}", record.date);
            println!("   Description: {}", record.description);
        }
        StatementOutcome::Error { message } => {
            println!("❌ {}", message);
        }
    }

    Ok(())
}

pub fn cmd_expenses_list(
    db: &Database,
    user_id: i64,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    category: Option<&str>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let assistant = Assistant::without_oracle(db, db);
    let mut expenses = assistant.list_expenses(user_id, from, to, category)?;
    expenses.truncate(limit);

    if json {
        return print_json(&expenses);
    }

    if expenses.is_empty() {
        println!("No expenses found. Record one with:");
        println!("  tally spend \"gastei 50 no mercado\"");
        return Ok(());
    }

    println!();
    println!("📝 Expenses");
    println!("   ─────────────────────────────────────────────────────────────");
    print_expense_rows(&expenses);

    Ok(())
}

/// One line per expense: date, amount, category and description
pub fn print_expense_rows(expenses: &[Expense]) {
    for expense in expenses {
        println!(
            "   [{}] {} │ {:>10.2} │ {:<12} │ {}",
            expense.id,
            expense.date,
            expense.amount,
            expense.category,
            truncate(&expense.description, 35)
        );
    }
}
