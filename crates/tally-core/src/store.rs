//! Persistence contracts
//!
//! The assistant only talks to storage through these traits. [`crate::db::Database`]
//! is the SQLite implementation; tests may substitute their own.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Expense, NewExpense, UserSettings};

/// Filter for expense queries
///
/// Date bounds are inclusive; the category must match exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFilter {
    pub user_id: i64,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub category: Option<String>,
}

impl ExpenseFilter {
    /// Every expense of one user
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id,
            date_range: None,
            category: None,
        }
    }

    /// Set date range filter
    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some((start, end));
        self
    }

    /// Set category filter
    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = category.map(str::to_string);
        self
    }

    /// Whether `expense` satisfies this filter
    pub fn matches(&self, expense: &Expense) -> bool {
        expense.user_id == self.user_id
            && self
                .date_range
                .map_or(true, |(start, end)| expense.date >= start && expense.date <= end)
            && self
                .category
                .as_deref()
                .map_or(true, |c| expense.category == c)
    }
}

/// Expense persistence
pub trait ExpenseStore: Send + Sync {
    /// Persist a draft, returning the stored record with its new id
    fn insert_expense(&self, expense: &NewExpense) -> Result<Expense>;

    /// Records matching `filter`, in no particular order
    fn query_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>>;

    /// The `limit` most recent records of a user, newest first
    fn recent_expenses(&self, user_id: i64, limit: usize) -> Result<Vec<Expense>> {
        let mut records = self.query_expenses(&ExpenseFilter::for_user(user_id))?;
        sort_newest_first(&mut records);
        records.truncate(limit);
        Ok(records)
    }
}

/// Per-user settings persistence
pub trait SettingsStore: Send + Sync {
    /// Settings for a user, created with the default target on first access
    fn get_or_create_settings(&self, user_id: i64) -> Result<UserSettings>;

    /// Replace the monthly target; rejects non-positive values before writing
    fn set_monthly_target(&self, user_id: i64, value: f64) -> Result<UserSettings>;
}

/// Order by date then id, both descending
pub fn sort_newest_first(records: &mut [Expense]) {
    records.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
}

/// Order by date then id, both ascending
pub fn sort_oldest_first(records: &mut [Expense]) {
    records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn expense(id: i64, user_id: i64, day: u32, category: &str) -> Expense {
        Expense {
            id,
            user_id,
            amount: 10.0,
            category: category.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_matches() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let filter = ExpenseFilter::for_user(1)
            .date_range(start, end)
            .category(Some("lazer"));

        assert!(filter.matches(&expense(1, 1, 5, "lazer")));
        assert!(filter.matches(&expense(2, 1, 10, "lazer")));
        assert!(!filter.matches(&expense(3, 1, 11, "lazer")));
        assert!(!filter.matches(&expense(4, 1, 7, "outros")));
        assert!(!filter.matches(&expense(5, 2, 7, "lazer")));
        assert!(ExpenseFilter::for_user(1).matches(&expense(6, 1, 30, "outros")));
    }

    #[test]
    fn test_sorting() {
        let mut records = vec![
            expense(3, 1, 5, "a"),
            expense(1, 1, 9, "a"),
            expense(2, 1, 5, "a"),
        ];
        sort_newest_first(&mut records);
        let ids: Vec<i64> = records.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);

        sort_oldest_first(&mut records);
        let ids: Vec<i64> = records.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
