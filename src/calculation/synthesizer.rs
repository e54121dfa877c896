//! Record synthesis from roster assignments.
//!
//! A worker who was rostered but never produced a usable attendance record is
//! still paid for the assigned shift. This module derives such a synthetic
//! record from the assignment's time range.

use tracing::debug;

use crate::config::EngineSettings;
use crate::models::{Provenance, RosterAssignment, WorkRecord};

use super::time_resolver::parse_assignment_range;

/// The result of trying to synthesize a record for one assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// A real record with usable times already covers the worker and date.
    NotNeeded,
    /// A record was derived from the assignment.
    Synthesized(WorkRecord),
    /// The assignment could not be turned into a shift.
    Excluded {
        /// Why the assignment was excluded.
        reason: String,
    },
}

/// Synthesizes a work record for a roster assignment when no real record
/// covers it.
///
/// A real record for the same worker and date with a usable start/end pair
/// wins and nothing is synthesized. Otherwise the assignment's time range is
/// parsed; success gives a scheduled, synthetic record with the stable id
/// `synthetic:{worker}:{date}:{role}`, failure excludes the assignment.
///
/// # Arguments
///
/// * `assignment` - A valid roster assignment (worker id, role and date present)
/// * `existing` - The normalized real records
/// * `settings` - Engine settings, for the undecided sentinels
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{SynthesisOutcome, synthesize};
/// use payroll_engine::config::EngineSettings;
/// use payroll_engine::models::{Provenance, RosterAssignment};
/// use chrono::NaiveDate;
///
/// let assignment = RosterAssignment {
///     worker_id: "worker_a".to_string(),
///     worker_name: "Alice".to_string(),
///     role: "dealer".to_string(),
///     date: NaiveDate::from_ymd_opt(2025, 1, 1),
///     time_range: Some("10:00-18:00".to_string()),
///     event_id: Some("event_1".to_string()),
/// };
///
/// match synthesize(&assignment, &[], &EngineSettings::default()) {
///     SynthesisOutcome::Synthesized(record) => {
///         assert_eq!(record.id, "synthetic:worker_a:2025-01-01:dealer");
///         assert_eq!(record.provenance, Provenance::Synthetic);
///     }
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub fn synthesize(
    assignment: &RosterAssignment,
    existing: &[WorkRecord],
    settings: &EngineSettings,
) -> SynthesisOutcome {
    let Some(date) = assignment.date else {
        return SynthesisOutcome::Excluded {
            reason: "assignment has no date".to_string(),
        };
    };
    let worker_id = assignment.worker_id.trim();
    let role = assignment.role.trim();

    let covered = existing.iter().any(|record| {
        record.provenance == Provenance::Real
            && record.worker_id == worker_id
            && record.date() == date
            && record.has_usable_times()
    });
    if covered {
        return SynthesisOutcome::NotNeeded;
    }

    let range = assignment.time_range.as_deref().unwrap_or_default();
    let Some((start, end)) = parse_assignment_range(range, date, settings) else {
        return SynthesisOutcome::Excluded {
            reason: format!("assignment time range '{}' has no usable start and end", range),
        };
    };

    let id = format!("synthetic:{}:{}:{}", worker_id, date, role);
    debug!(record_id = %id, range = %range, "synthesized record from roster assignment");

    let mut record = WorkRecord::new(
        id,
        worker_id,
        assignment.event_id.clone().unwrap_or_default(),
        date,
    );
    let name = assignment.worker_name.trim();
    record.worker_name = (!name.is_empty()).then(|| name.to_string());
    record.role = Some(role.to_string());
    record.scheduled_start = Some(start);
    record.scheduled_end = Some(end);
    record.provenance = Provenance::Synthetic;

    SynthesisOutcome::Synthesized(record)
}
