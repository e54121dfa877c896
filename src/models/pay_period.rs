//! Pay period model.
//!
//! This module contains the [`PayPeriod`] type that bounds a payroll run.
//! Both ends are inclusive calendar dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Represents the inclusive date range a payroll run covers.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::from_iso("2025-01-01", "2025-01-31").unwrap();
///
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()));
/// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayPeriod {
    /// The first day of the period (inclusive).
    pub start_date: NaiveDate,
    /// The last day of the period (inclusive).
    pub end_date: NaiveDate,
}

impl PayPeriod {
    /// Creates a period, rejecting an end date before the start date.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> EngineResult<Self> {
        if end_date < start_date {
            return Err(EngineError::InvalidPeriod {
                message: format!("end date {} is before start date {}", end_date, start_date),
            });
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Parses inclusive ISO calendar-date bounds (`YYYY-MM-DD`).
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriod` when either bound is not a calendar date or the
    /// bounds are reversed.
    pub fn from_iso(start: &str, end: &str) -> EngineResult<Self> {
        let start_date = parse_bound("startDate", start)?;
        let end_date = parse_bound("endDate", end)?;
        Self::new(start_date, end_date)
    }

    /// Checks if a given date falls within this pay period.
    ///
    /// The check is inclusive of both start and end dates.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::PayPeriod;
    /// use chrono::NaiveDate;
    ///
    /// let period = PayPeriod::from_iso("2025-01-01", "2025-01-07").unwrap();
    ///
    /// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())); // start date
    /// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 1, 7).unwrap())); // end date
    /// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())); // before
    /// ```
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

fn parse_bound(field: &str, value: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| EngineError::InvalidPeriod {
        message: format!("{} '{}' is not an ISO date: {}", field, value, e),
    })
}
