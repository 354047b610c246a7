//! WHERE clause builder for expense queries

use crate::store::ExpenseFilter;

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword
    pub where_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl FilterResult {
    pub fn param_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

impl ExpenseFilter {
    /// Build the SQL components for this filter
    ///
    /// The user condition is always present. Dates are stored as ISO text, so
    /// string comparison is chronological.
    pub fn build(&self) -> FilterResult {
        let mut conditions = vec!["user_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(self.user_id)];

        if let Some((start, end)) = self.date_range {
            conditions.push("date >= ?".to_string());
            params.push(Box::new(start.format("%Y-%m-%d").to_string()));
            conditions.push("date <= ?".to_string());
            params.push(Box::new(end.format("%Y-%m-%d").to_string()));
        }

        if let Some(ref category) = self.category {
            conditions.push("category = ?".to_string());
            params.push(Box::new(category.clone()));
        }

        FilterResult {
            where_clause: format!("WHERE {}", conditions.join(" AND ")),
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_user_only() {
        let result = ExpenseFilter::for_user(5).build();
        assert_eq!(result.where_clause, "WHERE user_id = ?");
        assert_eq!(result.params.len(), 1);
    }

    #[test]
    fn test_all_conditions() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let result = ExpenseFilter::for_user(5)
            .date_range(start, end)
            .category(Some("lazer"))
            .build();

        assert_eq!(
            result.where_clause,
            "WHERE user_id = ? AND date >= ? AND date <= ? AND category = ?"
        );
        assert_eq!(result.params.len(), 4);
        assert_eq!(result.param_refs().len(), 4);
    }
}
