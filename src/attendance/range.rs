//! Date range selection for attendance queries.

use chrono::{Datelike, NaiveDate, TimeDelta};

use crate::error::{AppError, Result};

/// Parse date from multiple formats: "2000-1-1", "2000/1/1", "2000 1 1", "2000.1.1"
pub fn parse_flexible_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();

    let parts: Vec<&str> = input
        .split(['-', '/', ' ', '.'])
        .filter(|s| !s.is_empty())
        .collect();

    if parts.len() != 3 {
        return None;
    }

    let year: i32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let day: u32 = parts[2].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Parse both ends with [`parse_flexible_date`].
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start_date =
            parse_flexible_date(start).ok_or_else(|| AppError::parse(format!("Invalid start date '{start}'")))?;
        let end_date = parse_flexible_date(end).ok_or_else(|| AppError::parse(format!("Invalid end date '{end}'")))?;
        Self::new(start_date, end_date)
    }

    /// First of the month up to `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        Self {
            start: today.with_day(1).unwrap_or(today),
            end: today,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(AppError::validation(format!(
                "Start date {} is after end date {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start + TimeDelta::days(1)).num_days()
    }
}
