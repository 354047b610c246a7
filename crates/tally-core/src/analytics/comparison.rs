use serde::Serialize;

use super::aggregation::AggregationResult;

/// Growth (in percent) a category must strictly exceed to be flagged
pub const GROWTH_ALERT_THRESHOLD: f64 = 50.0;

/// Change of one category between two periods
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGrowth {
    #[serde(rename = "categoria")]
    pub category: String,
    pub previous: f64,
    pub current: f64,
    /// Percent change against `previous`
    pub growth: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Percent change of the total, 0 without a prior baseline
    pub percent_change: f64,
    /// Categories present in both periods with a positive prior value
    pub category_growth: Vec<CategoryGrowth>,
    /// Fastest-growing category above [`GROWTH_ALERT_THRESHOLD`]
    pub top_growth: Option<CategoryGrowth>,
}

/// Compare a current aggregation against a previous one
pub fn compare(current: &AggregationResult, previous: &AggregationResult) -> ComparisonResult {
    let percent_change = if previous.total != 0.0 {
        (current.total - previous.total) / previous.total * 100.0
    } else {
        0.0
    };

    let category_growth: Vec<CategoryGrowth> = current
        .by_category
        .iter()
        .filter_map(|(category, now)| {
            let before = previous.by_category.get(category).filter(|v| *v > 0.0)?;
            Some(CategoryGrowth {
                category: category.to_string(),
                previous: before,
                current: now,
                growth: (now - before) / before * 100.0,
            })
        })
        .collect();

    let mut top_growth: Option<&CategoryGrowth> = None;
    for entry in category_growth
        .iter()
        .filter(|g| g.growth > GROWTH_ALERT_THRESHOLD)
    {
        if top_growth.map_or(true, |best| entry.growth > best.growth) {
            top_growth = Some(entry);
        }
    }
    let top_growth = top_growth.cloned();

    ComparisonResult {
        percent_change,
        category_growth,
        top_growth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregation::{CategoryTotals, TopCategory};

    fn aggregation(entries: &[(&str, f64)]) -> AggregationResult {
        let mut by_category = CategoryTotals::new();
        for (name, amount) in entries {
            by_category.add(name, *amount);
        }
        AggregationResult {
            total: entries.iter().map(|(_, v)| v).sum(),
            by_category,
            top_category: TopCategory {
                name: String::new(),
                amount: 0.0,
                percentage: 0.0,
            },
            projection: 0.0,
        }
    }

    #[test]
    fn test_percent_change() {
        let result = compare(
            &aggregation(&[("lazer", 120.0)]),
            &aggregation(&[("lazer", 100.0)]),
        );
        assert!((result.percent_change - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_baseline_is_zero() {
        let result = compare(&aggregation(&[("lazer", 120.0)]), &aggregation(&[]));
        assert_eq!(result.percent_change, 0.0);
        assert!(result.category_growth.is_empty());
        assert!(result.top_growth.is_none());
    }

    #[test]
    fn test_category_growth_requires_positive_baseline() {
        let result = compare(
            &aggregation(&[("lazer", 100.0), ("saúde", 40.0), ("outros", 5.0)]),
            &aggregation(&[("lazer", 50.0), ("outros", 0.0)]),
        );
        assert_eq!(result.category_growth.len(), 1);
        assert_eq!(result.category_growth[0].category, "lazer");
        assert!((result.category_growth[0].growth - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_growth_threshold_and_ties() {
        // Exactly 50% does not qualify
        let result = compare(
            &aggregation(&[("lazer", 150.0)]),
            &aggregation(&[("lazer", 100.0)]),
        );
        assert!(result.top_growth.is_none());

        // Equal growth: first category in the current breakdown wins
        let result = compare(
            &aggregation(&[("transporte", 30.0), ("lazer", 300.0), ("saúde", 20.0)]),
            &aggregation(&[("transporte", 10.0), ("lazer", 100.0), ("saúde", 15.0)]),
        );
        let top = result.top_growth.unwrap();
        assert_eq!(top.category, "transporte");
        assert!((top.growth - 200.0).abs() < 1e-9);
    }
}
