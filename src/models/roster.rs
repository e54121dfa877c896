//! Roster assignment model and lookup index.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One worker's confirmed staffing assignment.
///
/// Read-only input. Fields default to empty so that one incomplete entry does
/// not reject the whole roster; incomplete entries are dropped by
/// [`RosterIndex::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterAssignment {
    /// Identifier of the assigned worker.
    #[serde(default)]
    pub worker_id: String,
    /// Display name of the worker.
    #[serde(default)]
    pub worker_name: String,
    /// Role the worker is assigned to.
    #[serde(default)]
    pub role: String,
    /// The assigned date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Human-entered range such as "10:00-18:00", or an "undecided" sentinel.
    #[serde(default)]
    pub time_range: Option<String>,
    /// Event the assignment belongs to.
    #[serde(default)]
    pub event_id: Option<String>,
}

impl RosterAssignment {
    /// Returns the name of the first required field that is missing.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.worker_id.trim().is_empty() {
            Some("workerId")
        } else if self.role.trim().is_empty() {
            Some("role")
        } else if self.date.is_none() {
            Some("date")
        } else {
            None
        }
    }
}

/// A roster entry exactly as the host sent it.
///
/// Kept untyped so that one entry with an odd date or field name is dropped
/// on its own instead of rejecting the whole request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRosterEntry(pub serde_json::Value);

impl From<serde_json::Value> for RawRosterEntry {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

impl From<RosterAssignment> for RawRosterEntry {
    fn from(assignment: RosterAssignment) -> Self {
        Self(json!({
            "workerId": assignment.worker_id,
            "workerName": assignment.worker_name,
            "role": assignment.role,
            "date": assignment.date,
            "timeRange": assignment.time_range,
            "eventId": assignment.event_id,
        }))
    }
}

/// Lookup tables over the valid entries of a roster.
///
/// Assignments for one worker keep roster order within a date and are ordered
/// by date across dates, so every "first match" below is deterministic.
#[derive(Debug, Default)]
pub struct RosterIndex<'a> {
    by_worker_date: BTreeMap<&'a str, BTreeMap<NaiveDate, Vec<&'a RosterAssignment>>>,
    by_worker: BTreeMap<&'a str, Vec<&'a RosterAssignment>>,
    by_name: BTreeMap<&'a str, Vec<&'a str>>,
}

impl<'a> RosterIndex<'a> {
    /// Indexes every assignment that has a worker id, role and date.
    pub fn new(roster: &'a [RosterAssignment]) -> Self {
        let mut index = Self::default();
        for assignment in roster {
            let Some(date) = assignment.date else {
                continue;
            };
            if assignment.missing_field().is_some() {
                continue;
            }
            let worker_id = assignment.worker_id.trim();
            index
                .by_worker_date
                .entry(worker_id)
                .or_default()
                .entry(date)
                .or_default()
                .push(assignment);
            index.by_worker.entry(worker_id).or_default().push(assignment);

            let name = assignment.worker_name.trim();
            if !name.is_empty() {
                let ids = index.by_name.entry(name).or_default();
                if !ids.contains(&worker_id) {
                    ids.push(worker_id);
                }
            }
        }
        for assignments in index.by_worker.values_mut() {
            assignments.sort_by_key(|a| a.date);
        }
        index
    }

    /// Assignments for a worker on one exact date.
    pub fn on_date(&self, worker_id: &str, date: NaiveDate) -> &[&'a RosterAssignment] {
        self.by_worker_date
            .get(worker_id)
            .and_then(|dates| dates.get(&date))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Assignments for a worker on any date, earliest first.
    pub fn for_worker(&self, worker_id: &str) -> &[&'a RosterAssignment] {
        self.by_worker
            .get(worker_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns true if the worker holds at least one valid assignment.
    pub fn contains_worker(&self, worker_id: &str) -> bool {
        self.by_worker.contains_key(worker_id)
    }

    /// The roster display name for a worker.
    pub fn worker_name(&self, worker_id: &str) -> Option<&'a str> {
        self.for_worker(worker_id)
            .iter()
            .map(|a| a.worker_name.trim())
            .find(|name| !name.is_empty())
    }

    /// The worker id whose display name is exactly `name`, when exactly one
    /// worker carries that name.
    pub fn worker_id_for_name(&self, name: &str) -> Option<&'a str> {
        match self.by_name.get(name.trim()).map(Vec::as_slice) {
            Some([only]) => Some(*only),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assignment(worker: &str, name: &str, role: &str, day: Option<NaiveDate>) -> RosterAssignment {
        RosterAssignment {
            worker_id: worker.to_string(),
            worker_name: name.to_string(),
            role: role.to_string(),
            date: day,
            time_range: Some("10:00-18:00".to_string()),
            event_id: Some("event_1".to_string()),
        }
    }

    #[test]
    fn test_missing_field_reports_first_gap() {
        assert_eq!(
            assignment("", "A", "dealer", Some(date(2025, 1, 1))).missing_field(),
            Some("workerId")
        );
        assert_eq!(
            assignment("a", "A", " ", Some(date(2025, 1, 1))).missing_field(),
            Some("role")
        );
        assert_eq!(assignment("a", "A", "dealer", None).missing_field(), Some("date"));
        assert_eq!(
            assignment("a", "A", "dealer", Some(date(2025, 1, 1))).missing_field(),
            None
        );
    }

    #[test]
    fn test_index_skips_incomplete_entries() {
        let roster = vec![
            assignment("a", "Alice", "dealer", Some(date(2025, 1, 1))),
            assignment("b", "Bob", "dealer", None),
        ];
        let index = RosterIndex::new(&roster);
        assert!(index.contains_worker("a"));
        assert!(!index.contains_worker("b"));
    }

    #[test]
    fn test_for_worker_is_ordered_by_date() {
        let roster = vec![
            assignment("a", "Alice", "floor", Some(date(2025, 1, 3))),
            assignment("a", "Alice", "dealer", Some(date(2025, 1, 1))),
        ];
        let index = RosterIndex::new(&roster);
        let roles: Vec<&str> = index
            .for_worker("a")
            .iter()
            .map(|a| a.role.as_str())
            .collect();
        assert_eq!(roles, vec!["dealer", "floor"]);
        assert_eq!(index.on_date("a", date(2025, 1, 3))[0].role, "floor");
        assert!(index.on_date("a", date(2025, 1, 2)).is_empty());
    }

    #[test]
    fn test_on_date_accepts_short_lived_key() {
        let roster = vec![assignment("a", "Alice", "dealer", Some(date(2025, 1, 1)))];
        let index = RosterIndex::new(&roster);
        let found = {
            let key = String::from(" a ").trim().to_string();
            index.on_date(&key, date(2025, 1, 1)).len()
        };
        assert_eq!(found, 1);
    }

    #[test]
    fn test_raw_entry_from_assignment_keeps_fields() {
        let raw = RawRosterEntry::from(assignment("a", "Alice", "dealer", Some(date(2025, 1, 4))));
        assert_eq!(raw.0["workerId"], "a");
        assert_eq!(raw.0["date"], "2025-01-04");
        assert_eq!(raw.0["timeRange"], "10:00-18:00");
    }

    #[test]
    fn test_name_lookup_requires_unique_name() {
        let roster = vec![
            assignment("a", "Alice", "dealer", Some(date(2025, 1, 1))),
            assignment("a", "Alice", "dealer", Some(date(2025, 1, 2))),
            assignment("k1", "Kim", "dealer", Some(date(2025, 1, 1))),
            assignment("k2", "Kim", "floor", Some(date(2025, 1, 1))),
        ];
        let index = RosterIndex::new(&roster);
        assert_eq!(index.worker_id_for_name("Alice"), Some("a"));
        assert_eq!(index.worker_id_for_name("Kim"), None);
        assert_eq!(index.worker_name("a"), Some("Alice"));
    }

    #[test]
    fn test_deserialize_assignment_with_missing_fields() {
        let json = r#"{ "workerId": "a", "role": "dealer", "timeRange": "undecided" }"#;
        let assignment: RosterAssignment = serde_json::from_str(json).unwrap();
        assert_eq!(assignment.date, None);
        assert_eq!(assignment.worker_name, "");
        assert_eq!(assignment.missing_field(), Some("date"));
    }
}
