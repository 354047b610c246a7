use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::models::Expense;
use crate::window::DateWindow;

/// Name reported as the dominant category when there are no records
pub const NO_CATEGORY: &str = "nenhuma";

/// Per-category sums, in the order each category was first seen
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals(Vec<(String, f64)>);

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `category`, appending it if unseen
    pub fn add(&mut self, category: &str, amount: f64) {
        match self.0.iter_mut().find(|(name, _)| name == category) {
            Some((_, sum)) => *sum += amount,
            None => self.0.push((category.to_string(), amount)),
        }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, sum)| *sum)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, sum)| (name.as_str(), *sum))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest sum, first-seen category winning ties
    fn largest(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (name, sum) in self.iter() {
            match best {
                Some((_, top)) if sum <= top => {}
                _ => best = Some((name, sum)),
            }
        }
        best
    }
}

impl Serialize for CategoryTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, sum) in &self.0 {
            map.serialize_entry(name, sum)?;
        }
        map.end()
    }
}

/// Dominant category and its share of the total
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TopCategory {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    /// Share of the total, 0-100, one decimal
    #[serde(rename = "porcentagem")]
    pub percentage: f64,
}

impl TopCategory {
    fn none() -> Self {
        Self {
            name: NO_CATEGORY.to_string(),
            amount: 0.0,
            percentage: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AggregationResult {
    pub total: f64,
    #[serde(rename = "por_categoria")]
    pub by_category: CategoryTotals,
    #[serde(rename = "categoria_principal")]
    pub top_category: TopCategory,
    /// Linear end-of-window estimate, unrounded
    #[serde(rename = "projecao")]
    pub projection: f64,
}

/// Aggregate records that already belong to `window`
///
/// Order matters only for ties: categories are reported in first-seen order
/// and the first-seen category wins an equal sum.
pub fn aggregate(records: &[Expense], window: &DateWindow, today: NaiveDate) -> AggregationResult {
    let mut by_category = CategoryTotals::new();
    let mut total = 0.0;
    for record in records {
        by_category.add(&record.category, record.amount);
        total += record.amount;
    }

    let top_category = match by_category.largest() {
        Some((name, amount)) => TopCategory {
            name: name.to_string(),
            amount,
            percentage: if total > 0.0 {
                round_to(amount / total * 100.0, 1)
            } else {
                0.0
            },
        },
        None => TopCategory::none(),
    };

    AggregationResult {
        total,
        projection: project(total, window, today),
        by_category,
        top_category,
    }
}

/// `total / days_elapsed * days_in_window`, 0 before the window starts
pub fn project(total: f64, window: &DateWindow, today: NaiveDate) -> f64 {
    let elapsed = window.days_elapsed(today);
    if elapsed <= 0 {
        return 0.0;
    }
    total / elapsed as f64 * window.days_in_window() as f64
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
