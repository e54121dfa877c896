//! Work record models.
//!
//! This module defines the canonical [`WorkRecord`] every raw attendance entry
//! is normalized into, and [`RawWorkRecord`], the untyped shape records arrive
//! in from the host's data store.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Attendance status of a work record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Assigned but not yet started.
    Scheduled,
    /// Checked in, not yet checked out.
    InProgress,
    /// Checked out.
    Completed,
    /// Cancelled; never paid.
    Cancelled,
}

impl RecordStatus {
    /// Parses a status string from any of the spellings upstream systems use.
    ///
    /// Returns `None` for an unrecognised value.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::RecordStatus;
    ///
    /// assert_eq!(RecordStatus::parse("checked_out"), Some(RecordStatus::Completed));
    /// assert_eq!(RecordStatus::parse("In-Progress"), Some(RecordStatus::InProgress));
    /// assert_eq!(RecordStatus::parse("on_break"), None);
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "scheduled" | "not_started" | "assigned" => Some(Self::Scheduled),
            "in_progress" | "inprogress" | "checked_in" | "working" => Some(Self::InProgress),
            "completed" | "checked_out" | "done" => Some(Self::Completed),
            "cancelled" | "canceled" | "absent" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Rank used when several records compete; a finished record is the most
    /// complete.
    pub(crate) fn completeness(self) -> u8 {
        match self {
            Self::Completed => 2,
            Self::InProgress => 1,
            Self::Scheduled | Self::Cancelled => 0,
        }
    }
}

/// Where a work record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Read from the attendance store.
    Real,
    /// Derived from a roster assignment's time range.
    Synthetic,
}

/// Which pair of time fields produced a record's hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBasis {
    /// Planned shift start/end.
    Scheduled,
    /// Clock-in/clock-out punches.
    Actual,
}

/// One worker's attendance for one date.
///
/// The date is fixed at construction and exposed read-only. Hours are derived
/// by the reconciler from the pay window and are zero until then.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{Provenance, WorkRecord};
/// use chrono::NaiveDate;
///
/// let record = WorkRecord::new(
///     "log_001",
///     "worker_a",
///     "event_1",
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
/// );
/// assert_eq!(record.provenance, Provenance::Real);
/// assert!(!record.has_usable_times());
/// assert!(record.source_ids.contains("log_001"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRecord {
    /// Stable identifier of the source record.
    pub id: String,
    /// Identifier of the worker.
    pub worker_id: String,
    /// Display name carried on the raw record, if any.
    pub worker_name: Option<String>,
    /// Identifier of the event the work belongs to.
    pub event_id: String,
    date: NaiveDate,
    /// Role embedded in the record, if any.
    pub role: Option<String>,
    /// Planned shift start.
    pub scheduled_start: Option<NaiveDateTime>,
    /// Planned shift end.
    pub scheduled_end: Option<NaiveDateTime>,
    /// Clock-in instant.
    pub actual_start: Option<NaiveDateTime>,
    /// Clock-out instant.
    pub actual_end: Option<NaiveDateTime>,
    /// Attendance status.
    pub status: RecordStatus,
    /// Hours derived from the pay window.
    pub hours_worked: Decimal,
    /// The time fields that produced `hours_worked`.
    pub pay_basis: Option<TimeBasis>,
    /// Whether the record is real or synthesized.
    pub provenance: Provenance,
    /// Identifiers of every source record merged into this one.
    pub source_ids: BTreeSet<String>,
}

impl WorkRecord {
    /// Creates a real, scheduled record with no time data.
    pub fn new(
        id: impl Into<String>,
        worker_id: impl Into<String>,
        event_id: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        let id = id.into();
        Self {
            source_ids: BTreeSet::from([id.clone()]),
            id,
            worker_id: worker_id.into(),
            worker_name: None,
            event_id: event_id.into(),
            date,
            role: None,
            scheduled_start: None,
            scheduled_end: None,
            actual_start: None,
            actual_end: None,
            status: RecordStatus::Scheduled,
            hours_worked: Decimal::ZERO,
            pay_basis: None,
            provenance: Provenance::Real,
        }
    }

    /// The calendar day this record belongs to.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns true if either the scheduled or the actual start/end pair is complete.
    pub fn has_usable_times(&self) -> bool {
        (self.scheduled_start.is_some() && self.scheduled_end.is_some())
            || (self.actual_start.is_some() && self.actual_end.is_some())
    }

    /// The times to show a person: clock punches where present, the plan otherwise.
    pub fn display_window(&self) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
        (
            self.actual_start.or(self.scheduled_start),
            self.actual_end.or(self.scheduled_end),
        )
    }

    /// The role with surrounding whitespace removed, ignoring blank roles.
    pub fn explicit_role(&self) -> Option<&str> {
        self.role
            .as_deref()
            .map(str::trim)
            .filter(|role| !role.is_empty())
    }

    /// Number of populated time fields, used to rank competing records.
    pub(crate) fn time_field_count(&self) -> usize {
        [
            self.scheduled_start,
            self.scheduled_end,
            self.actual_start,
            self.actual_end,
        ]
        .iter()
        .filter(|t| t.is_some())
        .count()
    }
}

/// A work record exactly as the host fetched it.
///
/// Field names vary between legacy shapes, so the record is kept as raw JSON
/// and interpreted by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawWorkRecord(pub serde_json::Value);

impl From<serde_json::Value> for RawWorkRecord {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
