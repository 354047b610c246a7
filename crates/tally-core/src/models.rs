//! Domain models for Tally
//!
//! Serialized field names follow the wire format shared with the oracle and the
//! stored documents (`valor`, `tipo`, `data`, `descricao`, `meta_mensal`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Closed set of category labels offered to the oracle
pub const CATEGORIES: [&str; 8] = [
    "alimentação",
    "transporte",
    "moradia",
    "lazer",
    "saúde",
    "educação",
    "vestuário",
    "outros",
];

/// Category used when the oracle gives none
pub const FALLBACK_CATEGORY: &str = "outros";

/// Monthly target assigned to settings created on first access
pub const DEFAULT_MONTHLY_TARGET: f64 = 2000.0;

/// A stored expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Store-assigned id, never reused
    pub id: i64,
    pub user_id: i64,
    /// Positive magnitude of the expense
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "tipo")]
    pub category: String,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "descricao")]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A validated expense draft, ready for insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub user_id: i64,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "tipo")]
    pub category: String,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "descricao")]
    pub description: String,
}

/// Filters resolved from a natural-language query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParameters {
    /// Always the authenticated caller
    pub user_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Optional exact category filter
    #[serde(rename = "tipo", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Period classification reported by the oracle (diário, mensal, ...)
    #[serde(rename = "periodo", skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    /// Set when defaults replaced part or all of the oracle answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Per-user preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_id: i64,
    #[serde(rename = "meta_mensal")]
    pub monthly_target: f64,
    pub updated_at: DateTime<Utc>,
}

/// Reject targets that are not finite positive amounts
pub fn validate_target(value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidTarget(value))
    }
}

/// Normalize a category label
///
/// Known labels are matched case-insensitively and with or without accents,
/// returning the canonical spelling. Blank input becomes [`FALLBACK_CATEGORY`].
/// Anything else is kept (trimmed, lowercased) so unknown categories survive.
pub fn canonical_category(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return FALLBACK_CATEGORY.to_string();
    }

    let folded = fold_accents(&lowered);
    CATEGORIES
        .iter()
        .find(|known| fold_accents(known) == folded)
        .map(|known| known.to_string())
        .unwrap_or(lowered)
}

fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_category_known() {
        assert_eq!(canonical_category("Alimentação"), "alimentação");
        assert_eq!(canonical_category("  TRANSPORTE "), "transporte");
        assert_eq!(canonical_category("saude"), "saúde");
        assert_eq!(canonical_category("educacao"), "educação");
    }

    #[test]
    fn test_canonical_category_blank_falls_back() {
        assert_eq!(canonical_category(""), FALLBACK_CATEGORY);
        assert_eq!(canonical_category("   "), FALLBACK_CATEGORY);
    }

    #[test]
    fn test_canonical_category_unknown_is_kept() {
        assert_eq!(canonical_category("Pets"), "pets");
    }

    #[test]
    fn test_validate_target() {
        assert_eq!(validate_target(1500.0).unwrap(), 1500.0);
        assert!(matches!(validate_target(0.0), Err(Error::InvalidTarget(_))));
        assert!(matches!(validate_target(-10.0), Err(Error::InvalidTarget(_))));
        assert!(matches!(
            validate_target(f64::NAN),
            Err(Error::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_expense_serializes_wire_names() {
        let expense = NewExpense {
            user_id: 7,
            amount: 50.0,
            category: "lazer".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            description: "cinema".to_string(),
        };
        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["valor"], 50.0);
        assert_eq!(json["tipo"], "lazer");
        assert_eq!(json["data"], "2024-03-15");
        assert_eq!(json["descricao"], "cinema");
    }
}
