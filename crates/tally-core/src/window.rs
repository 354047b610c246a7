//! Inclusive calendar date windows used by queries and aggregation

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A contiguous, inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Create a window, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidData(format!(
                "window start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The calendar month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        let start = first_of_month(date.year(), date.month());
        let end = start + Duration::days(i64::from(days_in_month(date.year(), date.month())) - 1);
        Self { start, end }
    }

    /// Alias for [`DateWindow::month_of`] with "today" semantics
    pub fn current_month(today: NaiveDate) -> Self {
        Self::month_of(today)
    }

    /// The calendar month before the one containing `today`
    pub fn previous_month(today: NaiveDate) -> Self {
        let first = first_of_month(today.year(), today.month());
        // The day before the 1st always exists
        Self::month_of(first.pred_opt().unwrap_or(first))
    }

    /// Full calendar year
    pub fn year(year: i32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| Error::InvalidData(format!("year out of range: {}", year)))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| Error::InvalidData(format!("year out of range: {}", year)))?;
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, both ends included
    pub fn days_in_window(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Days of the window that have passed as of `today`, today included
    ///
    /// Clamped to `[0, days_in_window]`: a future window yields 0, a past one
    /// yields its full length.
    pub fn days_elapsed(&self, today: NaiveDate) -> i64 {
        let elapsed = (today - self.start).num_days() + 1;
        elapsed.clamp(0, self.days_in_window())
    }

    /// True when the window is exactly one calendar month
    pub fn is_calendar_month(&self) -> bool {
        *self == Self::month_of(self.start)
    }

    /// True when the window is exactly one calendar year
    pub fn is_calendar_year(&self) -> bool {
        self.start.month() == 1
            && self.start.day() == 1
            && self.end.year() == self.start.year()
            && self.end.month() == 12
            && self.end.day() == 31
    }

    /// Human-readable period label
    ///
    /// `month of March 2024`, `year 2024` or `2024-03-05 to 2024-03-20`.
    pub fn label(&self) -> String {
        if self.is_calendar_month() {
            format!("month of {}", self.start.format("%B %Y"))
        } else if self.is_calendar_year() {
            format!("year {}", self.start.year())
        } else {
            format!(
                "{} to {}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            )
        }
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 31,
    }
}
