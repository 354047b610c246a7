//! Report command implementations (ask, dashboard)

use anyhow::Result;
use chrono::NaiveDate;
use tally_core::ai::AIClient;
use tally_core::assistant::Assistant;
use tally_core::db::Database;

use super::expenses::print_expense_rows;
use super::print_json;

/// Records shown under a query answer before eliding the rest
const ASK_SHOWN_RECORDS: usize = 10;

pub async fn cmd_ask(
    db: &Database,
    ai: &AIClient,
    user_id: i64,
    text: &str,
    now: NaiveDate,
    json: bool,
) -> Result<()> {
    let assistant = Assistant::new(db, db, ai);
    let report = assistant.process_query(text, user_id, now).await?;

    if json {
        return print_json(&report);
    }

    println!();
    println!("📊 Spending for the {}", report.period_label);
    if let Some(ref category) = report.parameters.category {
        println!("   Category: {}", category);
    }
    if let Some(ref reason) = report.parameters.fallback_reason {
        println!("   ⚠️  Showing the current month ({})", reason);
    }
    println!("   ─────────────────────────────");
    println!("   Total:      {:.2}", report.total);
    if report.projection > 0.0 && report.projection != report.total {
        println!("   Projection: {:.2}", report.projection);
    }

    if !report.by_category.is_empty() {
        println!();
        for (category, amount) in report.by_category.iter() {
            println!("   {:<14} {:>10.2}", category, amount);
        }
        println!();
        println!(
            "   Top category: {} ({:.1}%)",
            report.top_category.name, report.top_category.percentage
        );
    }

    if !report.records.is_empty() {
        println!();
        let shown = report.records.len().min(ASK_SHOWN_RECORDS);
        print_expense_rows(&report.records[..shown]);
        if report.records.len() > shown {
            println!("   ... and {} more", report.records.len() - shown);
        }
    }

    Ok(())
}

pub fn cmd_dashboard(db: &Database, user_id: i64, now: NaiveDate, json: bool) -> Result<()> {
    let assistant = Assistant::without_oracle(db, db);
    let dashboard = assistant.build_dashboard(user_id, now)?;

    if json {
        return print_json(&dashboard);
    }

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│           💰 Tally Dashboard            │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", dashboard.period_label);
    println!();
    println!("  Spent so far:    {:.2}", dashboard.total_this_month);
    println!(
        "  vs last month:   {:+.1}%",
        dashboard.percent_change_vs_prior
    );
    println!("  Projection:      {:.2}", dashboard.projection);
    println!("  Monthly target:  {:.2}", dashboard.target);

    if !dashboard.category_breakdown.is_empty() {
        println!();
        println!("  📂 By category");
        for share in &dashboard.category_breakdown {
            println!(
                "     {:<14} {:>10.2}  {:>5.1}%",
                share.category, share.amount, share.percentage
            );
        }
    }

    if !dashboard.last_5_transactions.is_empty() {
        println!();
        println!("  📝 Latest expenses");
        print_expense_rows(&dashboard.last_5_transactions);
    }

    if !dashboard.tips.is_empty() {
        println!();
        println!("  💡 Tips");
        for tip in &dashboard.tips {
            println!("     • {}", tip.text);
        }
    }
    println!();

    Ok(())
}
