use serde::{Deserialize, Serialize};

use super::aggregation::{round_to, AggregationResult};
use super::comparison::{compare, ComparisonResult};

/// Upper bound on tips returned per dashboard
pub const MAX_TIPS: usize = 2;

/// Share of the target under which spending is praised
const UNDER_BUDGET_RATIO: f64 = 0.7;

/// Absolute change of the total (percent) needed for a comparison tip
const COMPARISON_THRESHOLD: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipKind {
    #[serde(rename = "categoria")]
    Category,
    #[serde(rename = "meta")]
    Target,
    #[serde(rename = "comparacao")]
    Comparison,
    #[serde(rename = "aumento_categoria")]
    CategoryIncrease,
}

impl TipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "categoria",
            Self::Target => "meta",
            Self::Comparison => "comparacao",
            Self::CategoryIncrease => "aumento_categoria",
        }
    }
}

impl std::fmt::Display for TipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One advisory message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    #[serde(rename = "tipo")]
    pub kind: TipKind,
    #[serde(rename = "texto")]
    pub text: String,
}

/// Inputs every rule sees
struct TipContext<'a> {
    current: &'a AggregationResult,
    previous: &'a AggregationResult,
    comparison: ComparisonResult,
    projection: f64,
    target: f64,
}

trait TipRule: Send + Sync {
    fn kind(&self) -> TipKind;

    fn evaluate(&self, ctx: &TipContext<'_>) -> Option<String>;
}

struct CategoryRule;

impl TipRule for CategoryRule {
    fn kind(&self) -> TipKind {
        TipKind::Category
    }

    fn evaluate(&self, ctx: &TipContext<'_>) -> Option<String> {
        let top = &ctx.current.top_category;
        (top.amount > 0.0).then(|| {
            format!(
                "Your largest expense is {}, at {:.1}% of your spending. \
                 Look for savings opportunities in this area.",
                top.name, top.percentage
            )
        })
    }
}

struct TargetRule;

impl TipRule for TargetRule {
    fn kind(&self) -> TipKind {
        TipKind::Target
    }

    fn evaluate(&self, ctx: &TipContext<'_>) -> Option<String> {
        if ctx.target <= 0.0 {
            return None;
        }
        if ctx.projection > ctx.target {
            let over = round_to((ctx.projection - ctx.target) / ctx.target * 100.0, 1);
            Some(format!(
                "Your projected spending for this month is {:.1}% above your target. \
                 Try to cut back over the coming weeks.",
                over
            ))
        } else if ctx.projection < ctx.target * UNDER_BUDGET_RATIO {
            let share = round_to(ctx.projection / ctx.target * 100.0, 1);
            Some(format!(
                "You are on track to use only {:.1}% of your monthly target. Keep it up!",
                share
            ))
        } else {
            None
        }
    }
}

struct ComparisonRule;

impl TipRule for ComparisonRule {
    fn kind(&self) -> TipKind {
        TipKind::Comparison
    }

    fn evaluate(&self, ctx: &TipContext<'_>) -> Option<String> {
        if ctx.current.total <= 0.0 || ctx.previous.total <= 0.0 {
            return None;
        }
        let change = ctx.comparison.percent_change;
        if change > COMPARISON_THRESHOLD {
            Some(format!(
                "Your spending rose {:.1}% compared to the previous month. \
                 Review your budget to find areas to cut.",
                round_to(change, 1)
            ))
        } else if change < -COMPARISON_THRESHOLD {
            Some(format!(
                "Well done! You cut your spending by {:.1}% compared to the previous month. \
                 Keep it under control.",
                round_to(change, 1).abs()
            ))
        } else {
            None
        }
    }
}

struct CategoryIncreaseRule;

impl TipRule for CategoryIncreaseRule {
    fn kind(&self) -> TipKind {
        TipKind::CategoryIncrease
    }

    fn evaluate(&self, ctx: &TipContext<'_>) -> Option<String> {
        ctx.comparison.top_growth.as_ref().map(|growth| {
            format!(
                "Your spending on {} rose {:.1}% compared to the previous month. \
                 Check what caused the increase.",
                growth.category,
                round_to(growth.growth, 1)
            )
        })
    }
}

/// Evaluates the tip rules in their fixed priority order
pub struct TipGenerator {
    rules: Vec<Box<dyn TipRule>>,
}

impl Default for TipGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TipGenerator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(CategoryRule),
                Box::new(TargetRule),
                Box::new(ComparisonRule),
                Box::new(CategoryIncreaseRule),
            ],
        }
    }

    /// First [`MAX_TIPS`] tips whose rule fires, in priority order
    pub fn generate(
        &self,
        current: &AggregationResult,
        previous: &AggregationResult,
        projection: f64,
        target: f64,
    ) -> Vec<Tip> {
        let ctx = TipContext {
            current,
            previous,
            comparison: compare(current, previous),
            projection,
            target,
        };

        let tips: Vec<Tip> = self
            .rules
            .iter()
            .filter_map(|rule| {
                rule.evaluate(&ctx).map(|text| Tip {
                    kind: rule.kind(),
                    text,
                })
            })
            .take(MAX_TIPS)
            .collect();

        tracing::debug!(
            count = tips.len(),
            kinds = ?tips.iter().map(|t| t.kind.as_str()).collect::<Vec<_>>(),
            "Generated tips"
        );
        tips
    }
}

/// Generate tips with the standard rule set
pub fn generate_tips(
    current: &AggregationResult,
    previous: &AggregationResult,
    projection: f64,
    target: f64,
) -> Vec<Tip> {
    TipGenerator::new().generate(current, previous, projection, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregation::{CategoryTotals, TopCategory, NO_CATEGORY};

    fn aggregation(entries: &[(&str, f64)]) -> AggregationResult {
        let mut by_category = CategoryTotals::new();
        for (name, amount) in entries {
            by_category.add(name, *amount);
        }
        let total: f64 = entries.iter().map(|(_, v)| v).sum();
        let top_category = entries
            .first()
            .map(|(name, amount)| TopCategory {
                name: name.to_string(),
                amount: *amount,
                percentage: if total > 0.0 {
                    round_to(amount / total * 100.0, 1)
                } else {
                    0.0
                },
            })
            .unwrap_or(TopCategory {
                name: NO_CATEGORY.to_string(),
                amount: 0.0,
                percentage: 0.0,
            });
        AggregationResult {
            total,
            by_category,
            top_category,
            projection: total,
        }
    }

    #[test]
    fn test_empty_data_gives_only_target_praise() {
        let empty = aggregation(&[]);
        let tips = generate_tips(&empty, &empty, 0.0, 2000.0);
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].kind, TipKind::Target);
        assert!(tips[0].text.contains("0.0%"));
    }

    #[test]
    fn test_over_budget_text() {
        let empty = aggregation(&[]);
        let tips = generate_tips(&empty, &empty, 2500.0, 2000.0);
        assert_eq!(tips[0].kind, TipKind::Target);
        assert!(tips[0].text.contains("25.0%"));
        assert!(tips[0].text.contains("above"));
    }

    #[test]
    fn test_target_band_is_silent() {
        let empty = aggregation(&[]);
        // 70% of target and exactly the target both stay quiet
        assert!(generate_tips(&empty, &empty, 1400.0, 2000.0).is_empty());
        assert!(generate_tips(&empty, &empty, 2000.0, 2000.0).is_empty());
        // Non-positive target disables the rule
        assert!(generate_tips(&empty, &empty, 500.0, 0.0).is_empty());
    }

    #[test]
    fn test_at_most_two_in_priority_order() {
        let current = aggregation(&[("lazer", 400.0)]);
        let previous = aggregation(&[("lazer", 100.0)]);
        // Every rule fires: category, target (over), comparison, category increase
        let tips = generate_tips(&current, &previous, 5000.0, 2000.0);
        assert_eq!(tips.len(), MAX_TIPS);
        assert_eq!(tips[0].kind, TipKind::Category);
        assert_eq!(tips[1].kind, TipKind::Target);
    }

    #[test]
    fn test_comparison_threshold_is_strict() {
        let current = aggregation(&[("lazer", 120.0)]);
        let previous = aggregation(&[("lazer", 100.0)]);
        // Projection inside the quiet band so only the category rule competes
        let tips = generate_tips(&current, &previous, 1500.0, 2000.0);
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].kind, TipKind::Category);
    }

    #[test]
    fn test_comparison_increase_and_decrease_wording() {
        let rule = ComparisonRule;
        let up = TipContext {
            current: &aggregation(&[("lazer", 150.0)]),
            previous: &aggregation(&[("lazer", 100.0)]),
            comparison: compare(&aggregation(&[("lazer", 150.0)]), &aggregation(&[("lazer", 100.0)])),
            projection: 0.0,
            target: 0.0,
        };
        let text = rule.evaluate(&up).unwrap();
        assert!(text.contains("rose 50.0%"));

        let down = TipContext {
            current: &aggregation(&[("lazer", 50.0)]),
            previous: &aggregation(&[("lazer", 100.0)]),
            comparison: compare(&aggregation(&[("lazer", 50.0)]), &aggregation(&[("lazer", 100.0)])),
            projection: 0.0,
            target: 0.0,
        };
        let text = rule.evaluate(&down).unwrap();
        assert!(text.contains("by 50.0%"));
    }

    #[test]
    fn test_category_increase_tip() {
        let current = aggregation(&[("saúde", 0.0), ("lazer", 90.0)]);
        let previous = aggregation(&[("lazer", 50.0)]);
        // Top category has zero amount, target band quiet, comparison needs both totals:
        // 90 vs 50 is +80%, so comparison and category increase fire
        let tips = generate_tips(&current, &previous, 1500.0, 2000.0);
        assert_eq!(tips.len(), 2);
        assert_eq!(tips[0].kind, TipKind::Comparison);
        assert_eq!(tips[1].kind, TipKind::CategoryIncrease);
        assert!(tips[1].text.contains("lazer"));
        assert!(tips[1].text.contains("80.0%"));
    }

    #[test]
    fn test_tip_serializes_wire_names() {
        let tip = Tip {
            kind: TipKind::CategoryIncrease,
            text: "x".to_string(),
        };
        let json = serde_json::to_value(&tip).unwrap();
        assert_eq!(json["tipo"], "aumento_categoria");
        assert_eq!(json["texto"], "x");
    }
}
