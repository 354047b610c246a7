//! Analytics pipeline
//!
//! Pure functions over already-fetched expense records:
//! - [`aggregate`]: totals, category breakdown, dominant category and projection
//! - [`compare`]: change against a previous aggregation, per-category growth
//! - [`generate_tips`]: at most two advisory messages from fixed rules

mod aggregation;
mod comparison;
mod tips;

pub use aggregation::{
    aggregate, project, round_to, AggregationResult, CategoryTotals, TopCategory, NO_CATEGORY,
};
pub use comparison::{compare, CategoryGrowth, ComparisonResult, GROWTH_ALERT_THRESHOLD};
pub use tips::{generate_tips, Tip, TipGenerator, TipKind, MAX_TIPS};
