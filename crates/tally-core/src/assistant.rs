//! Assistant facade
//!
//! Wires the interpreter, the stores and the analytics pipeline into the
//! user-facing operations: record a statement, answer a query, build the
//! dashboard, list expenses and manage the monthly target.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::ai::parsing::truncate_raw;
use crate::ai::AIClient;
use crate::analytics::{
    aggregate, compare, round_to, CategoryTotals, Tip, TipGenerator, TopCategory,
};
use crate::error::{Error, InterpretationError, Result};
use crate::interpreter::{fallback_query, ExpenseInterpreter};
use crate::models::{Expense, QueryParameters, UserSettings};
use crate::store::{sort_newest_first, sort_oldest_first, ExpenseFilter, ExpenseStore, SettingsStore};
use crate::window::DateWindow;

/// Number of transactions shown on the dashboard
pub const DASHBOARD_RECENT: usize = 5;

/// Result of submitting a statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatementOutcome {
    Success { record: Expense },
    Error { message: String },
}

/// Answer to a spending question
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub status: &'static str,
    pub parameters: QueryParameters,
    pub period_label: String,
    /// Rounded to 2 decimals
    pub total: f64,
    pub by_category: CategoryTotals,
    pub top_category: TopCategory,
    /// Rounded to 2 decimals
    pub projection: f64,
    /// Newest first
    pub records: Vec<Expense>,
}

/// One row of the dashboard breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "porcentagem")]
    pub percentage: f64,
}

/// Current-month overview
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub period_label: String,
    pub total_this_month: f64,
    pub percent_change_vs_prior: f64,
    pub top_category: TopCategory,
    pub category_breakdown: Vec<CategoryShare>,
    pub last_5_transactions: Vec<Expense>,
    pub projection: f64,
    pub target: f64,
    pub tips: Vec<Tip>,
}

/// User-facing operations over injected stores and an optional oracle
pub struct Assistant<'a> {
    expenses: &'a dyn ExpenseStore,
    settings: &'a dyn SettingsStore,
    interpreter: Option<ExpenseInterpreter>,
    tips: TipGenerator,
}

impl<'a> Assistant<'a> {
    /// Create an assistant using the default prompt library
    pub fn new(
        expenses: &'a dyn ExpenseStore,
        settings: &'a dyn SettingsStore,
        ai: &AIClient,
    ) -> Self {
        Self::with_interpreter(expenses, settings, ExpenseInterpreter::new(ai.clone()))
    }

    /// Assistant for the operations that never reach the oracle
    ///
    /// Statements are rejected as unavailable and queries fall back to the
    /// current month.
    pub fn without_oracle(expenses: &'a dyn ExpenseStore, settings: &'a dyn SettingsStore) -> Self {
        Self {
            expenses,
            settings,
            interpreter: None,
            tips: TipGenerator::new(),
        }
    }

    pub fn with_interpreter(
        expenses: &'a dyn ExpenseStore,
        settings: &'a dyn SettingsStore,
        interpreter: ExpenseInterpreter,
    ) -> Self {
        Self {
            interpreter: Some(interpreter),
            ..Self::without_oracle(expenses, settings)
        }
    }

    /// Interpret a statement and store the resulting expense
    ///
    /// Interpretation failures come back as [`StatementOutcome::Error`];
    /// store failures are returned as `Err`.
    pub async fn process_statement(
        &self,
        text: &str,
        user_id: i64,
        today: NaiveDate,
    ) -> Result<StatementOutcome> {
        let interpreted = match &self.interpreter {
            Some(interpreter) => interpreter.interpret_expense(text, user_id, today).await,
            None => Err(InterpretationError::OracleUnavailable(
                "no oracle configured".to_string(),
            )),
        };
        let draft = match interpreted {
            Ok(draft) => draft,
            Err(e) => {
                info!(user_id, error = %e, "Statement not recorded");
                return Ok(StatementOutcome::Error {
                    message: statement_message(&e),
                });
            }
        };

        let record = self.expenses.insert_expense(&draft)?;
        info!(
            user_id,
            id = record.id,
            amount = record.amount,
            category = %record.category,
            "Expense recorded"
        );
        Ok(StatementOutcome::Success { record })
    }

    /// Interpret a question and aggregate the matching expenses
    pub async fn process_query(&self, text: &str, user_id: i64, now: NaiveDate) -> Result<QueryReport> {
        let parameters = match &self.interpreter {
            Some(interpreter) => interpreter.interpret_query(text, user_id, now).await,
            None => fallback_query(
                user_id,
                DateWindow::current_month(now),
                "no oracle configured".to_string(),
            ),
        };
        let window = DateWindow::new(parameters.start_date, parameters.end_date)?;

        let filter = ExpenseFilter::for_user(user_id)
            .date_range(window.start(), window.end())
            .category(parameters.category.as_deref());
        let mut records = self.expenses.query_expenses(&filter)?;
        sort_oldest_first(&mut records);

        let summary = aggregate(&records, &window, now);
        debug!(user_id, count = records.len(), total = summary.total, "Query aggregated");

        sort_newest_first(&mut records);
        Ok(QueryReport {
            status: "success",
            period_label: window.label(),
            total: round_to(summary.total, 2),
            by_category: summary.by_category,
            top_category: summary.top_category,
            projection: round_to(summary.projection, 2),
            records,
            parameters,
        })
    }

    /// Build the current-month dashboard
    pub fn build_dashboard(&self, user_id: i64, now: NaiveDate) -> Result<Dashboard> {
        let settings = self.settings.get_or_create_settings(user_id)?;
        let current_window = DateWindow::current_month(now);
        let previous_window = DateWindow::previous_month(now);

        let current_records = self.window_records(user_id, &current_window)?;
        let previous_records = self.window_records(user_id, &previous_window)?;

        let current = aggregate(&current_records, &current_window, now);
        let previous = aggregate(&previous_records, &previous_window, now);
        let comparison = compare(&current, &previous);
        let tips = self
            .tips
            .generate(&current, &previous, current.projection, settings.monthly_target);

        let category_breakdown = current
            .by_category
            .iter()
            .map(|(category, amount)| CategoryShare {
                category: category.to_string(),
                amount: round_to(amount, 2),
                percentage: if current.total > 0.0 {
                    round_to(amount / current.total * 100.0, 1)
                } else {
                    0.0
                },
            })
            .collect();

        let last_5_transactions = self.expenses.recent_expenses(user_id, DASHBOARD_RECENT)?;

        Ok(Dashboard {
            period_label: current_window.label(),
            total_this_month: round_to(current.total, 2),
            percent_change_vs_prior: round_to(comparison.percent_change, 1),
            top_category: current.top_category,
            category_breakdown,
            last_5_transactions,
            projection: round_to(current.projection, 2),
            target: settings.monthly_target,
            tips,
        })
    }

    /// List a user's expenses, newest first
    pub fn list_expenses(
        &self,
        user_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        category: Option<&str>,
    ) -> Result<Vec<Expense>> {
        let mut filter = ExpenseFilter::for_user(user_id).category(category);
        if from.is_some() || to.is_some() {
            let start = match from {
                Some(d) => d,
                None => open_bound(1, 1, 1)?,
            };
            let end = match to {
                Some(d) => d,
                None => open_bound(9999, 12, 31)?,
            };
            let window = DateWindow::new(start, end)?;
            filter = filter.date_range(window.start(), window.end());
        }

        let mut records = self.expenses.query_expenses(&filter)?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    /// Settings for a user, created on first access
    pub fn settings(&self, user_id: i64) -> Result<UserSettings> {
        self.settings.get_or_create_settings(user_id)
    }

    /// Replace the monthly target (must be a finite positive amount)
    pub fn set_monthly_target(&self, user_id: i64, value: f64) -> Result<UserSettings> {
        self.settings.set_monthly_target(user_id, value)
    }

    /// Records of a window in (date, id) order for deterministic tie-breaking
    fn window_records(&self, user_id: i64, window: &DateWindow) -> Result<Vec<Expense>> {
        let filter = ExpenseFilter::for_user(user_id).date_range(window.start(), window.end());
        let mut records = self.expenses.query_expenses(&filter)?;
        sort_oldest_first(&mut records);
        Ok(records)
    }
}

/// Stand-in for a missing `list_expenses` bound; four-digit years keep the
/// ISO text comparison in the store valid
fn open_bound(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::InvalidData(format!("invalid date {}-{}-{}", year, month, day)))
}

/// Human-readable message for a failed statement
fn statement_message(err: &InterpretationError) -> String {
    match err {
        InterpretationError::NotAnExpense => {
            "No expense found in that text. Try something like \"spent 50 on groceries today\"."
                .to_string()
        }
        InterpretationError::MalformedOracleOutput { reason, raw } => format!(
            "Could not understand the expense ({}). Oracle reply: {}",
            reason,
            truncate_raw(raw)
        ),
        InterpretationError::OracleUnavailable(_) => {
            "The language service is unavailable right now. Please try again later.".to_string()
        }
    }
}
