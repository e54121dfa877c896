//! Deduplication and reconciliation of work records.
//!
//! Several records may describe the same worker on the same day: copies of
//! one source reached through different queries, an attendance record next to
//! a synthetic one, or a role-less punch next to a rostered shift. This module
//! merges them so that at most one record per (worker, date, role) survives,
//! and derives the hours that record is paid for.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{
    Diagnostic, DiagnosticCode, Diagnostics, Provenance, RosterIndex, TimeBasis, WorkRecord,
};

use super::strategy::{Resolution, Strategy, resolve_first};
use super::time_resolver::resolve_hours;

/// The start/end pair a record is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayWindow {
    /// Start of the window.
    pub start: NaiveDateTime,
    /// End of the window.
    pub end: NaiveDateTime,
    /// Which time fields the window came from.
    pub basis: TimeBasis,
}

fn scheduled_window(record: &WorkRecord) -> Option<PayWindow> {
    Some(PayWindow {
        start: record.scheduled_start?,
        end: record.scheduled_end?,
        basis: TimeBasis::Scheduled,
    })
}

fn actual_window(record: &WorkRecord) -> Option<PayWindow> {
    Some(PayWindow {
        start: record.actual_start?,
        end: record.actual_end?,
        basis: TimeBasis::Actual,
    })
}

/// Pay-window chain: the plan is paid, clock punches are the fallback.
pub const PAY_WINDOW_CHAIN: [Strategy<WorkRecord, PayWindow>; 2] = [
    Strategy {
        name: "scheduled",
        resolve: scheduled_window,
    },
    Strategy {
        name: "actual",
        resolve: actual_window,
    },
];

/// Resolves the window a record is paid for.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::pay_window;
/// use payroll_engine::models::{TimeBasis, WorkRecord};
/// use chrono::{NaiveDate, NaiveDateTime};
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let mut record = WorkRecord::new("r1", "a", "e", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
/// record.actual_start = Some(at("2025-01-01 10:07"));
/// record.actual_end = Some(at("2025-01-01 18:02"));
///
/// let window = pay_window(&record).unwrap();
/// assert_eq!(window.strategy, "actual");
/// assert_eq!(window.value.basis, TimeBasis::Actual);
/// ```
pub fn pay_window(record: &WorkRecord) -> Option<Resolution<PayWindow>> {
    resolve_first(&PAY_WINDOW_CHAIN, record)
}

/// Rank of a candidate; higher is more complete.
fn completeness(record: &WorkRecord) -> (bool, usize, u8) {
    (
        record.provenance == Provenance::Real,
        record.time_field_count(),
        record.status.completeness(),
    )
}

/// Merges the candidates for one (worker, date, role partition) into a single
/// record.
///
/// Copies sharing a source id collapse to the most complete copy. The
/// remaining candidates are merged most complete first (real before
/// synthetic, then more time fields, then a more finished status; ties break
/// on the record id): the best candidate keeps its values and takes missing
/// ones from the others, and the source ids of every candidate are unioned.
/// Hours are derived from [`pay_window`]; a record with no window keeps zero
/// hours and no pay basis.
///
/// Returns `None` only for an empty candidate list.
pub fn reconcile(mut candidates: Vec<WorkRecord>) -> Option<WorkRecord> {
    candidates.sort_by(|a, b| {
        completeness(b)
            .cmp(&completeness(a))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut distinct = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate.source_ids.iter().any(|id| seen.contains(id)) {
            debug!(record_id = %candidate.id, "dropped less complete copy of a merged source");
            continue;
        }
        seen.extend(candidate.source_ids.iter().cloned());
        distinct.push(candidate);
    }

    let mut merged = distinct.into_iter();
    let mut base = merged.next()?;
    for other in merged {
        fill_missing(&mut base, other);
    }

    match pay_window(&base) {
        Some(window) => {
            base.hours_worked = resolve_hours(Some(window.value.start), Some(window.value.end));
            base.pay_basis = Some(window.value.basis);
        }
        None => {
            base.hours_worked = Decimal::ZERO;
            base.pay_basis = None;
        }
    }
    Some(base)
}

fn fill_missing(base: &mut WorkRecord, other: WorkRecord) {
    if base.worker_name.is_none() {
        base.worker_name = other.worker_name.clone();
    }
    if base.event_id.is_empty() {
        base.event_id = other.event_id.clone();
    }
    if base.explicit_role().is_none() {
        base.role = other.role.clone();
    }
    // Time fields fill as pairs so one window never mixes two sources.
    if scheduled_window(base).is_none() && scheduled_window(&other).is_some() {
        base.scheduled_start = other.scheduled_start;
        base.scheduled_end = other.scheduled_end;
    }
    if actual_window(base).is_none() && actual_window(&other).is_some() {
        base.actual_start = other.actual_start;
        base.actual_end = other.actual_end;
    }
    if other.status.completeness() > base.status.completeness() {
        base.status = other.status;
    }
    base.source_ids.extend(other.source_ids);
}

/// Deduplicates records so at most one survives per (worker, date, role).
///
/// Records are bucketed by (worker, date). Within a bucket, records with an
/// explicit role form one partition per role. Role-less records join the
/// single explicit-role partition when exactly one exists; otherwise they form
/// their own partition. Each partition is merged by [`reconcile`].
///
/// The output is ordered by worker, date and role.
pub fn deduplicate(records: Vec<WorkRecord>) -> Vec<WorkRecord> {
    let mut buckets: BTreeMap<(String, NaiveDate), Vec<WorkRecord>> = BTreeMap::new();
    for record in records {
        buckets
            .entry((record.worker_id.clone(), record.date()))
            .or_default()
            .push(record);
    }

    let mut reconciled = Vec::new();
    for (_, bucket) in buckets {
        let mut partitions: BTreeMap<Option<String>, Vec<WorkRecord>> = BTreeMap::new();
        let mut role_less = Vec::new();
        for record in bucket {
            match record.explicit_role().map(str::to_string) {
                Some(role) => partitions.entry(Some(role)).or_default().push(record),
                None => role_less.push(record),
            }
        }

        if !role_less.is_empty() {
            let target = if partitions.len() == 1 {
                partitions.keys().next().cloned().flatten()
            } else {
                None
            };
            partitions.entry(target).or_default().extend(role_less);
        }

        reconciled.extend(partitions.into_values().filter_map(reconcile));
    }
    reconciled
}

/// Re-keys records whose worker id is unknown to the roster but matches
/// exactly one roster display name.
///
/// The record's worker id is tried first, then its worker name. Matched
/// records are reported with an info diagnostic. Returns the number of
/// records re-keyed.
pub fn match_workers_by_name(
    records: &mut [WorkRecord],
    roster: &RosterIndex<'_>,
    diagnostics: &mut Diagnostics,
) -> usize {
    let mut matched = 0;
    for record in records.iter_mut() {
        if roster.contains_worker(&record.worker_id) {
            continue;
        }
        let by_id = roster.worker_id_for_name(&record.worker_id);
        let by_name = || {
            record
                .worker_name
                .as_deref()
                .and_then(|name| roster.worker_id_for_name(name))
        };
        let Some(worker_id) = by_id.or_else(by_name) else {
            continue;
        };

        diagnostics.push(
            Diagnostic::info(
                DiagnosticCode::WorkerMatchedByName,
                format!("worker '{}' matched to roster worker '{}' by name", record.worker_id, worker_id),
            )
            .with_worker(worker_id)
            .with_date(record.date())
            .with_record(record.id.clone()),
        );
        if record.worker_name.is_none() {
            record.worker_name = Some(record.worker_id.clone());
        }
        record.worker_id = worker_id.to_string();
        matched += 1;
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecordStatus, RosterAssignment};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn record(id: &str, role: Option<&str>) -> WorkRecord {
        let mut record = WorkRecord::new(id, "worker_a", "event_1", date(1));
        record.role = role.map(str::to_string);
        record
    }

    fn scheduled(mut record: WorkRecord, start: &str, end: &str) -> WorkRecord {
        record.scheduled_start = Some(at(start));
        record.scheduled_end = Some(at(end));
        record
    }

    fn actual(mut record: WorkRecord, start: &str, end: &str) -> WorkRecord {
        record.actual_start = Some(at(start));
        record.actual_end = Some(at(end));
        record
    }

    #[test]
    fn test_scheduled_window_wins_for_pay() {
        let merged = reconcile(vec![actual(
            scheduled(record("r1", None), "2025-01-01 10:00", "2025-01-01 18:00"),
            "2025-01-01 10:20",
            "2025-01-01 19:00",
        )])
        .unwrap();
        assert_eq!(merged.hours_worked, dec("8.00"));
        assert_eq!(merged.pay_basis, Some(TimeBasis::Scheduled));
    }

    #[test]
    fn test_actual_window_is_fallback() {
        let merged = reconcile(vec![actual(record("r1", None), "2025-01-01 10:00", "2025-01-01 16:30")]).unwrap();
        assert_eq!(merged.hours_worked, dec("6.50"));
        assert_eq!(merged.pay_basis, Some(TimeBasis::Actual));
    }

    #[test]
    fn test_record_without_window_has_zero_hours() {
        let merged = reconcile(vec![record("r1", None)]).unwrap();
        assert_eq!(merged.hours_worked, Decimal::ZERO);
        assert_eq!(merged.pay_basis, None);
    }

    #[test]
    fn test_copies_of_one_source_count_once() {
        let a = scheduled(record("r1", Some("dealer")), "2025-01-01 10:00", "2025-01-01 18:00");
        let b = a.clone();
        let merged = reconcile(vec![a, b]).unwrap();
        assert_eq!(merged.hours_worked, dec("8.00"));
        assert_eq!(merged.source_ids.len(), 1);
    }

    #[test]
    fn test_most_complete_copy_survives() {
        let sparse = record("r1", Some("dealer"));
        let full = actual(
            scheduled(record("r1", Some("dealer")), "2025-01-01 10:00", "2025-01-01 18:00"),
            "2025-01-01 10:05",
            "2025-01-01 18:01",
        );
        let merged = reconcile(vec![sparse, full]).unwrap();
        assert_eq!(merged.time_field_count(), 4);
    }

    #[test]
    fn test_real_beats_synthetic_and_fills_gaps() {
        let mut synthetic = scheduled(
            record("synthetic:worker_a:2025-01-01:dealer", Some("dealer")),
            "2025-01-01 10:00",
            "2025-01-01 18:00",
        );
        synthetic.provenance = Provenance::Synthetic;
        synthetic.worker_name = Some("Alice".to_string());

        let mut real = record("r1", None);
        real.status = RecordStatus::Completed;

        let merged = reconcile(vec![synthetic, real]).unwrap();
        assert_eq!(merged.id, "r1");
        assert_eq!(merged.provenance, Provenance::Real);
        assert_eq!(merged.role.as_deref(), Some("dealer"));
        assert_eq!(merged.worker_name.as_deref(), Some("Alice"));
        assert_eq!(merged.hours_worked, dec("8.00"));
        assert_eq!(merged.source_ids.len(), 2);
    }

    #[test]
    fn test_ties_break_on_id() {
        let b = scheduled(record("b", None), "2025-01-01 09:00", "2025-01-01 17:00");
        let a = scheduled(record("a", None), "2025-01-01 10:00", "2025-01-01 18:00");
        assert_eq!(reconcile(vec![b.clone(), a.clone()]).unwrap().id, "a");
        assert_eq!(reconcile(vec![a, b]).unwrap().id, "a");
    }

    #[test]
    fn test_role_less_joins_single_role_partition() {
        let dealer = scheduled(record("r1", Some("dealer")), "2025-01-01 10:00", "2025-01-01 18:00");
        let punch = actual(record("r2", None), "2025-01-01 10:05", "2025-01-01 18:03");
        let records = deduplicate(vec![dealer, punch]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].role.as_deref(), Some("dealer"));
        assert!(records[0].actual_start.is_some());
    }

    #[test]
    fn test_role_less_kept_apart_with_two_roles() {
        let dealer = scheduled(record("r1", Some("dealer")), "2025-01-01 10:00", "2025-01-01 14:00");
        let floor = scheduled(record("r2", Some("floor")), "2025-01-01 14:00", "2025-01-01 18:00");
        let punch = actual(record("r3", None), "2025-01-01 10:00", "2025-01-01 18:00");
        let records = deduplicate(vec![dealer, floor, punch]);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].role, None);
        assert_eq!(records[1].role.as_deref(), Some("dealer"));
        assert_eq!(records[2].role.as_deref(), Some("floor"));
    }

    #[test]
    fn test_different_dates_never_merge() {
        let first = scheduled(record("r1", Some("dealer")), "2025-01-01 10:00", "2025-01-01 18:00");
        let mut second = WorkRecord::new("r2", "worker_a", "event_1", date(2));
        second.role = Some("dealer".to_string());
        let second = scheduled(second, "2025-01-02 10:00", "2025-01-02 18:00");

        let records = deduplicate(vec![second, first]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date(), date(1));
        assert_eq!(records[1].date(), date(2));
    }

    #[test]
    fn test_match_workers_by_name() {
        let roster = vec![RosterAssignment {
            worker_id: "worker_a".to_string(),
            worker_name: "Alice".to_string(),
            role: "dealer".to_string(),
            date: Some(date(1)),
            time_range: None,
            event_id: None,
        }];
        let index = RosterIndex::new(&roster);

        let mut by_name = WorkRecord::new("r1", "Alice", "event_1", date(1));
        let known = WorkRecord::new("r2", "worker_a", "event_1", date(1));
        let unknown = WorkRecord::new("r3", "Bob", "event_1", date(1));
        by_name.role = Some("dealer".to_string());
        let mut records = vec![by_name, known, unknown];

        let mut diagnostics = Diagnostics::new();
        let matched = match_workers_by_name(&mut records, &index, &mut diagnostics);

        assert_eq!(matched, 1);
        assert_eq!(records[0].worker_id, "worker_a");
        assert_eq!(records[0].worker_name.as_deref(), Some("Alice"));
        assert_eq!(records[2].worker_id, "Bob");
        assert_eq!(diagnostics.count(DiagnosticCode::WorkerMatchedByName), 1);
    }
}
