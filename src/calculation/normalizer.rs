//! Record normalization functionality.
//!
//! Raw work records come from several generations of upstream systems and
//! name the same field differently. This module reads each canonical field
//! from an ordered alias list and converts every time shape into a canonical
//! local instant.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{RawRosterEntry, RawWorkRecord, RecordStatus, RosterAssignment, WorkRecord};

use super::time_resolver::{parse_date, parse_instant};

/// Source record identifier.
pub const ID_FIELDS: &[&str] = &["id", "recordId", "workLogId", "sourceId"];
/// Worker identifier.
pub const WORKER_ID_FIELDS: &[&str] = &["workerId", "staffId", "userId", "dealerId", "worker_id"];
/// Worker display name.
pub const WORKER_NAME_FIELDS: &[&str] = &["workerName", "staffName", "name"];
/// Event identifier.
pub const EVENT_ID_FIELDS: &[&str] = &["eventId", "tournamentId", "jobPostingId", "postingId", "event_id"];
/// Work date.
pub const DATE_FIELDS: &[&str] = &["date", "workDate"];
/// Role embedded in the record.
pub const ROLE_FIELDS: &[&str] = &["role", "position", "assignedRole"];
/// Planned shift start.
pub const SCHEDULED_START_FIELDS: &[&str] = &["scheduledStartTime", "assignedStartTime", "startTime"];
/// Planned shift end.
pub const SCHEDULED_END_FIELDS: &[&str] = &["scheduledEndTime", "assignedEndTime", "endTime"];
/// Clock-in.
pub const ACTUAL_START_FIELDS: &[&str] = &["actualStartTime", "checkInTime", "clockIn"];
/// Clock-out.
pub const ACTUAL_END_FIELDS: &[&str] = &["actualEndTime", "checkOutTime", "clockOut"];
/// Attendance status.
pub const STATUS_FIELDS: &[&str] = &["status", "attendanceStatus"];
/// Roster assignment time range.
pub const TIME_RANGE_FIELDS: &[&str] = &["timeRange", "timeSlot", "assignedTime"];

/// Normalizes one raw work record.
///
/// # Arguments
///
/// * `raw` - The record as fetched
/// * `settings` - Engine settings; the UTC offset is used for zone-qualified times
///
/// # Returns
///
/// The canonical record, or `EngineError::InvalidRecord` when the record is
/// not an object or lacks a worker id, an event id or a usable date. A record
/// with no date field takes the date of its first full start timestamp.
/// A record without an id gets `"{eventId}:{workerId}:{date}"`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::normalize;
/// use payroll_engine::config::EngineSettings;
/// use payroll_engine::models::{RawWorkRecord, RecordStatus};
/// use serde_json::json;
///
/// let raw = RawWorkRecord(json!({
///     "staffId": "worker_a",
///     "tournamentId": "event_1",
///     "date": "2025-01-01",
///     "checkInTime": "10:02",
///     "checkOutTime": "18:00",
///     "status": "checked_out"
/// }));
///
/// let record = normalize(&raw, &EngineSettings::default()).unwrap();
/// assert_eq!(record.worker_id, "worker_a");
/// assert_eq!(record.id, "event_1:worker_a:2025-01-01");
/// assert_eq!(record.status, RecordStatus::Completed);
/// assert!(record.has_usable_times());
/// ```
pub fn normalize(raw: &RawWorkRecord, settings: &EngineSettings) -> EngineResult<WorkRecord> {
    let fields = raw.0.as_object().ok_or_else(|| EngineError::InvalidRecord {
        field: "record".to_string(),
        message: "expected a JSON object".to_string(),
    })?;
    let offset = settings.offset();

    let worker_id = text_field(fields, WORKER_ID_FIELDS).ok_or_else(|| missing("workerId"))?;
    let event_id = text_field(fields, EVENT_ID_FIELDS).ok_or_else(|| missing("eventId"))?;
    let date = record_date(fields, offset)?;

    let id = text_field(fields, ID_FIELDS)
        .unwrap_or_else(|| format!("{}:{}:{}", event_id, worker_id, date));

    let mut record = WorkRecord::new(id, worker_id, event_id, date);
    record.worker_name = text_field(fields, WORKER_NAME_FIELDS);
    record.role = text_field(fields, ROLE_FIELDS);
    record.scheduled_start = instant_field(fields, SCHEDULED_START_FIELDS, date, offset);
    record.scheduled_end = instant_field(fields, SCHEDULED_END_FIELDS, date, offset);
    record.actual_start = instant_field(fields, ACTUAL_START_FIELDS, date, offset);
    record.actual_end = instant_field(fields, ACTUAL_END_FIELDS, date, offset);
    record.status = match text_field(fields, STATUS_FIELDS) {
        Some(status) => RecordStatus::parse(&status).unwrap_or_else(|| {
            debug!(record_id = %record.id, status = %status, "unknown status, treating as scheduled");
            RecordStatus::Scheduled
        }),
        None => RecordStatus::Scheduled,
    };

    Ok(record)
}

/// Reads one roster entry into a [`RosterAssignment`].
///
/// Uses the same field aliases and date shapes as [`normalize`]. Absent
/// fields are left empty for [`RosterAssignment::missing_field`] to report;
/// only a non-object entry or a date that is present but unparsable is an
/// error.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::normalize_assignment;
/// use payroll_engine::config::EngineSettings;
/// use payroll_engine::models::RawRosterEntry;
/// use serde_json::json;
///
/// let raw = RawRosterEntry(json!({
///     "staffId": "worker_a",
///     "staffName": "Alice",
///     "position": "dealer",
///     "workDate": "2025-01-03",
///     "timeSlot": "10:00~18:00"
/// }));
/// let assignment = normalize_assignment(&raw, &EngineSettings::default()).unwrap();
/// assert_eq!(assignment.worker_id, "worker_a");
/// assert_eq!(assignment.time_range.as_deref(), Some("10:00~18:00"));
/// assert_eq!(assignment.missing_field(), None);
///
/// let bad = RawRosterEntry(json!({ "workerId": "b", "role": "dealer", "date": "2025/01/01" }));
/// assert!(normalize_assignment(&bad, &EngineSettings::default()).is_err());
/// ```
pub fn normalize_assignment(
    raw: &RawRosterEntry,
    settings: &EngineSettings,
) -> EngineResult<RosterAssignment> {
    let fields = raw.0.as_object().ok_or_else(|| EngineError::InvalidRecord {
        field: "rosterEntry".to_string(),
        message: "expected a JSON object".to_string(),
    })?;

    let date = match DATE_FIELDS
        .iter()
        .find_map(|alias| fields.get(*alias).filter(|v| !v.is_null()))
    {
        Some(value) => Some(parse_date(value, settings.offset()).ok_or_else(|| {
            EngineError::InvalidRecord {
                field: "date".to_string(),
                message: format!("unparsable value {}", value),
            }
        })?),
        None => None,
    };

    Ok(RosterAssignment {
        worker_id: text_field(fields, WORKER_ID_FIELDS).unwrap_or_default(),
        worker_name: text_field(fields, WORKER_NAME_FIELDS).unwrap_or_default(),
        role: text_field(fields, ROLE_FIELDS).unwrap_or_default(),
        date,
        time_range: text_field(fields, TIME_RANGE_FIELDS),
        event_id: text_field(fields, EVENT_ID_FIELDS),
    })
}

fn missing(field: &str) -> EngineError {
    EngineError::InvalidRecord {
        field: field.to_string(),
        message: "missing".to_string(),
    }
}

/// First alias holding a non-blank string or a number.
fn text_field(fields: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| match fields.get(*alias)? {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// First alias holding a value that parses as an instant.
fn instant_field(
    fields: &Map<String, Value>,
    aliases: &[&str],
    date: NaiveDate,
    offset: FixedOffset,
) -> Option<NaiveDateTime> {
    aliases.iter().find_map(|alias| {
        let value = fields.get(*alias)?;
        let instant = parse_instant(value, Some(date), offset);
        if instant.is_none() && !value.is_null() {
            debug!(field = *alias, value = %value, "unparsable time value skipped");
        }
        instant
    })
}

fn record_date(fields: &Map<String, Value>, offset: FixedOffset) -> EngineResult<NaiveDate> {
    let explicit = DATE_FIELDS
        .iter()
        .find_map(|alias| fields.get(*alias).filter(|v| !v.is_null()));

    if let Some(value) = explicit {
        return parse_date(value, offset).ok_or_else(|| EngineError::InvalidRecord {
            field: "date".to_string(),
            message: format!("unparsable value {}", value),
        });
    }

    SCHEDULED_START_FIELDS
        .iter()
        .chain(ACTUAL_START_FIELDS)
        .filter_map(|alias| fields.get(*alias))
        .find_map(|value| parse_instant(value, None, offset))
        .map(|instant| instant.date())
        .ok_or_else(|| missing("date"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provenance;
    use serde_json::json;

    fn settings() -> EngineSettings {
        EngineSettings::default()
    }

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn invalid_field(result: EngineResult<WorkRecord>) -> String {
        match result {
            Err(EngineError::InvalidRecord { field, .. }) => field,
            other => panic!("Expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_canonical_field_names() {
        let raw = RawWorkRecord(json!({
            "id": "log_001",
            "workerId": "worker_a",
            "workerName": "Alice",
            "eventId": "event_1",
            "date": "2025-01-01",
            "role": "dealer",
            "scheduledStartTime": "2025-01-01T10:00:00",
            "scheduledEndTime": "2025-01-01T18:00:00",
            "status": "completed"
        }));
        let record = normalize(&raw, &settings()).unwrap();

        assert_eq!(record.id, "log_001");
        assert_eq!(record.worker_name.as_deref(), Some("Alice"));
        assert_eq!(record.role.as_deref(), Some("dealer"));
        assert_eq!(record.scheduled_start, Some(make_datetime("2025-01-01 10:00")));
        assert_eq!(record.scheduled_end, Some(make_datetime("2025-01-01 18:00")));
        assert_eq!(record.provenance, Provenance::Real);
    }

    #[test]
    fn test_legacy_aliases() {
        let raw = RawWorkRecord(json!({
            "workLogId": "legacy_9",
            "dealerId": "worker_b",
            "jobPostingId": "posting_3",
            "workDate": "2025-01-02",
            "position": "floor",
            "assignedStartTime": "09:00",
            "assignedEndTime": "17:00",
            "clockIn": "09:05",
            "attendanceStatus": "in_progress"
        }));
        let record = normalize(&raw, &settings()).unwrap();

        assert_eq!(record.id, "legacy_9");
        assert_eq!(record.worker_id, "worker_b");
        assert_eq!(record.event_id, "posting_3");
        assert_eq!(record.role.as_deref(), Some("floor"));
        assert_eq!(record.actual_start, Some(make_datetime("2025-01-02 09:05")));
        assert_eq!(record.actual_end, None);
        assert_eq!(record.status, RecordStatus::InProgress);
    }

    #[test]
    fn test_earlier_alias_wins() {
        let raw = RawWorkRecord(json!({
            "workerId": "primary",
            "staffId": "secondary",
            "eventId": "event_1",
            "date": "2025-01-01"
        }));
        assert_eq!(normalize(&raw, &settings()).unwrap().worker_id, "primary");
    }

    #[test]
    fn test_numeric_ids_become_text() {
        let raw = RawWorkRecord(json!({
            "id": 42,
            "workerId": 7,
            "eventId": "event_1",
            "date": "2025-01-01"
        }));
        let record = normalize(&raw, &settings()).unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.worker_id, "7");
    }

    #[test]
    fn test_missing_required_fields() {
        let no_worker = RawWorkRecord(json!({ "eventId": "e", "date": "2025-01-01" }));
        assert_eq!(invalid_field(normalize(&no_worker, &settings())), "workerId");

        let blank_worker = RawWorkRecord(json!({ "workerId": "  ", "eventId": "e", "date": "2025-01-01" }));
        assert_eq!(invalid_field(normalize(&blank_worker, &settings())), "workerId");

        let no_event = RawWorkRecord(json!({ "workerId": "a", "date": "2025-01-01" }));
        assert_eq!(invalid_field(normalize(&no_event, &settings())), "eventId");

        let no_date = RawWorkRecord(json!({ "workerId": "a", "eventId": "e" }));
        assert_eq!(invalid_field(normalize(&no_date, &settings())), "date");

        let bad_date = RawWorkRecord(json!({ "workerId": "a", "eventId": "e", "date": "someday" }));
        assert_eq!(invalid_field(normalize(&bad_date, &settings())), "date");
    }

    #[test]
    fn test_non_object_rejected() {
        let raw = RawWorkRecord(json!(["not", "a", "record"]));
        assert_eq!(invalid_field(normalize(&raw, &settings())), "record");
    }

    #[test]
    fn test_date_derived_from_start_timestamp() {
        let raw = RawWorkRecord(json!({
            "workerId": "a",
            "eventId": "e",
            "startTime": "2025-01-05T10:00:00",
            "endTime": "2025-01-05T18:00:00"
        }));
        let record = normalize(&raw, &settings()).unwrap();
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
        assert_eq!(record.id, "e:a:2025-01-05");
    }

    #[test]
    fn test_unknown_status_maps_to_scheduled() {
        let raw = RawWorkRecord(json!({
            "workerId": "a",
            "eventId": "e",
            "date": "2025-01-01",
            "status": "on_break"
        }));
        assert_eq!(normalize(&raw, &settings()).unwrap().status, RecordStatus::Scheduled);
    }

    #[test]
    fn test_unparsable_time_falls_through_to_next_alias() {
        let raw = RawWorkRecord(json!({
            "workerId": "a",
            "eventId": "e",
            "date": "2025-01-01",
            "actualStartTime": "soon",
            "checkInTime": "10:15"
        }));
        let record = normalize(&raw, &settings()).unwrap();
        assert_eq!(record.actual_start, Some(make_datetime("2025-01-01 10:15")));
    }

    #[test]
    fn test_assignment_date_from_timestamp_object() {
        let raw = RawRosterEntry(json!({
            "workerId": "a",
            "role": "dealer",
            "date": { "seconds": 1_735_722_000_i64, "nanoseconds": 0 },
            "timeRange": "TBD"
        }));
        let assignment = normalize_assignment(&raw, &settings()).unwrap();
        assert_eq!(assignment.date, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(assignment.time_range.as_deref(), Some("TBD"));
    }

    #[test]
    fn test_assignment_without_date_left_for_validation() {
        let raw = RawRosterEntry(json!({ "workerId": "a", "role": "dealer", "date": null }));
        let assignment = normalize_assignment(&raw, &settings()).unwrap();
        assert_eq!(assignment.missing_field(), Some("date"));
    }

    #[test]
    fn test_assignment_with_bad_date_rejected() {
        for date in [json!("2025/01/01"), json!({ "when": "tomorrow" })] {
            let raw = RawRosterEntry(json!({ "workerId": "a", "role": "dealer", "date": date }));
            match normalize_assignment(&raw, &settings()) {
                Err(EngineError::InvalidRecord { field, .. }) => assert_eq!(field, "date"),
                other => panic!("Expected InvalidRecord, got {:?}", other),
            }
        }
        let not_object = RawRosterEntry(json!("A,dealer,2025-01-01"));
        assert!(normalize_assignment(&not_object, &settings()).is_err());
    }

    #[test]
    fn test_zone_qualified_times_use_configured_offset() {
        let settings = EngineSettings {
            utc_offset_minutes: 540,
            ..EngineSettings::default()
        };
        let raw = RawWorkRecord(json!({
            "workerId": "a",
            "eventId": "e",
            "date": "2025-01-01",
            "checkInTime": "2025-01-01T01:00:00Z",
            "checkOutTime": { "seconds": 1_735_722_000_i64, "nanoseconds": 0 }
        }));
        let record = normalize(&raw, &settings).unwrap();
        assert_eq!(record.actual_start, Some(make_datetime("2025-01-01 10:00")));
        assert_eq!(record.actual_end, Some(make_datetime("2025-01-01 18:00")));
    }
}
