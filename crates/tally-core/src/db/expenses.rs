//! Expense operations

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Expense, NewExpense};
use crate::store::{ExpenseFilter, ExpenseStore};

const EXPENSE_COLUMNS: &str = "id, user_id, amount, category, date, description, created_at";

impl Database {
    /// Insert an expense and return its id
    pub fn insert_expense_row(&self, expense: &NewExpense) -> Result<i64> {
        if !expense.amount.is_finite() {
            return Err(Error::InvalidData(format!(
                "expense amount must be finite, got {}",
                expense.amount
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO expenses (user_id, amount, category, date, description)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                expense.user_id,
                expense.amount,
                expense.category,
                expense.date.format("%Y-%m-%d").to_string(),
                expense.description,
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!(id, user_id = expense.user_id, "Inserted expense");
        Ok(id)
    }

    /// Get a single expense by ID
    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE id = ?",
            EXPENSE_COLUMNS
        ))?;

        let expense = stmt
            .query_row(params![id], |row| Self::row_to_expense(row))
            .optional()?;

        Ok(expense)
    }

    /// Count a user's expenses
    pub fn count_expenses(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Helper to convert a row to Expense
    /// Column order: id, user_id, amount, category, date, description, created_at
    pub(crate) fn row_to_expense(row: &rusqlite::Row) -> rusqlite::Result<Expense> {
        let date_str: String = row.get(4)?;
        let created_at_str: String = row.get(6)?;
        let date = chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Expense {
            id: row.get(0)?,
            user_id: row.get(1)?,
            amount: row.get(2)?,
            category: row.get(3)?,
            date,
            description: row.get(5)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}

impl ExpenseStore for Database {
    fn insert_expense(&self, expense: &NewExpense) -> Result<Expense> {
        let id = self.insert_expense_row(expense)?;
        self.get_expense(id)?
            .ok_or_else(|| Error::NotFound(format!("expense {} after insert", id)))
    }

    fn query_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let built = filter.build();
        let sql = format!(
            "SELECT {} FROM expenses {} ORDER BY date DESC, id DESC",
            EXPENSE_COLUMNS, built.where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs = built.param_refs();
        let expenses = stmt
            .query_map(params_refs.as_slice(), |row| Self::row_to_expense(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    fn recent_expenses(&self, user_id: i64, limit: usize) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE user_id = ? ORDER BY date DESC, id DESC LIMIT ?",
            EXPENSE_COLUMNS
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let expenses = stmt
            .query_map(params![user_id, limit], |row| Self::row_to_expense(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }
}
