//! Grouping of reconciled records into payroll buckets.
//!
//! Each (worker, role) pair becomes one bucket and later one payroll line.
//! A worker who held two roles gets two independent buckets.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::models::{Diagnostic, DiagnosticCode, Diagnostics, RecordStatus, RosterIndex, WorkRecord};

use super::strategy::{Resolution, Strategy, resolve_first};

/// Identifies one payroll line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PayrollKey {
    /// Identifier of the worker.
    pub worker_id: String,
    /// The role being paid.
    pub role: String,
}

impl PayrollKey {
    /// Creates a key.
    pub fn new(worker_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            role: role.into(),
        }
    }
}

/// What the role strategies look at.
pub struct RoleContext<'r, 'a> {
    /// The record whose role is being resolved.
    pub record: &'r WorkRecord,
    /// The roster lookup tables.
    pub roster: &'r RosterIndex<'a>,
}

/// Name of the strategy that takes the role from any roster date.
pub const ROLE_FROM_ANY_DATE: &str = "roster_any_date";

fn role_from_record(ctx: &RoleContext<'_, '_>) -> Option<String> {
    ctx.record.explicit_role().map(str::to_string)
}

fn role_from_same_date(ctx: &RoleContext<'_, '_>) -> Option<String> {
    ctx.roster
        .on_date(&ctx.record.worker_id, ctx.record.date())
        .first()
        .map(|assignment| assignment.role.trim().to_string())
}

fn role_from_any_date(ctx: &RoleContext<'_, '_>) -> Option<String> {
    ctx.roster
        .for_worker(&ctx.record.worker_id)
        .first()
        .map(|assignment| assignment.role.trim().to_string())
}

/// Role chain: the record itself, the roster on the same date, the roster on
/// any date.
fn role_chain<'r, 'a>() -> [Strategy<RoleContext<'r, 'a>, String>; 3] {
    [
        Strategy {
            name: "record",
            resolve: role_from_record,
        },
        Strategy {
            name: "roster_same_date",
            resolve: role_from_same_date,
        },
        Strategy {
            name: ROLE_FROM_ANY_DATE,
            resolve: role_from_any_date,
        },
    ]
}

/// Resolves the role a record is paid under.
pub fn resolve_role(record: &WorkRecord, roster: &RosterIndex<'_>) -> Option<Resolution<String>> {
    let context = RoleContext { record, roster };
    resolve_first(&role_chain(), &context)
}

/// Groups records into (worker, role) buckets.
///
/// Records are skipped, each with a diagnostic, when they are:
/// - cancelled (info)
/// - without a pay window or with zero hours (`insufficient_time_data`)
/// - without any resolvable role (`unresolved_role`)
/// - carrying a source id the bucket already holds (`duplicate_source`)
///
/// The role comes from the first of `record`, `roster_same_date` and
/// `roster_any_date` that yields one. A role taken from another date is
/// reported with a `role_from_other_date` warning.
///
/// # Arguments
///
/// * `records` - Deduplicated, reconciled records
/// * `roster` - Roster lookup tables
/// * `diagnostics` - Collector for skipped records
pub fn group(
    records: Vec<WorkRecord>,
    roster: &RosterIndex<'_>,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<PayrollKey, Vec<WorkRecord>> {
    let mut buckets: BTreeMap<PayrollKey, Vec<WorkRecord>> = BTreeMap::new();
    let mut bucket_sources: BTreeMap<PayrollKey, BTreeSet<String>> = BTreeMap::new();

    for record in records {
        let subject = |diagnostic: Diagnostic| {
            diagnostic
                .with_worker(record.worker_id.clone())
                .with_date(record.date())
                .with_record(record.id.clone())
        };

        if record.status == RecordStatus::Cancelled {
            debug!(record_id = %record.id, "cancelled record excluded");
            diagnostics.push(subject(Diagnostic::info(
                DiagnosticCode::CancelledRecord,
                "cancelled record is not paid",
            )));
            continue;
        }

        if record.pay_basis.is_none() || record.hours_worked.is_zero() {
            warn!(record_id = %record.id, worker_id = %record.worker_id, "record has no usable time window");
            diagnostics.push(subject(Diagnostic::warning(
                DiagnosticCode::InsufficientTimeData,
                "record has no usable start and end time",
            )));
            continue;
        }

        let Some(role) = resolve_role(&record, roster) else {
            warn!(record_id = %record.id, worker_id = %record.worker_id, "no role for record");
            diagnostics.push(subject(Diagnostic::warning(
                DiagnosticCode::UnresolvedRole,
                "no role on the record or the roster",
            )));
            continue;
        };
        if role.strategy == ROLE_FROM_ANY_DATE {
            warn!(record_id = %record.id, role = %role.value, "role taken from another roster date");
            diagnostics.push(subject(Diagnostic::warning(
                DiagnosticCode::RoleFromOtherDate,
                format!("role '{}' taken from a roster assignment on another date", role.value),
            )));
        } else {
            debug!(record_id = %record.id, role = %role.value, strategy = role.strategy, "role resolved");
        }

        let key = PayrollKey::new(record.worker_id.clone(), role.value);
        let sources = bucket_sources.entry(key.clone()).or_default();
        if record.source_ids.iter().any(|id| sources.contains(id)) {
            warn!(record_id = %record.id, "source already counted for this worker and role");
            diagnostics.push(subject(Diagnostic::warning(
                DiagnosticCode::DuplicateSource,
                format!("source already counted for role '{}'", key.role),
            )));
            continue;
        }
        sources.extend(record.source_ids.iter().cloned());
        buckets.entry(key).or_default().push(record);
    }

    buckets
}
