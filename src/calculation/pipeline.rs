//! The payroll pipeline.
//!
//! Wires the stages together: normalize → match identities → synthesize →
//! deduplicate → group → price each (worker, role) bucket → summarize.
//! The pipeline is synchronous, pure computation and never fails: problems
//! with individual records or roster entries become diagnostics.

use std::collections::BTreeSet;
use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::config::EngineSettings;
use crate::error::EngineError;
use crate::models::{
    Diagnostic, DiagnosticCode, Diagnostics, PayrollInput, PayrollLine, PayrollSummary,
    RosterAssignment, RosterIndex, WorkRecord,
};

use super::allowances::allowances;
use super::base_pay::base_pay;
use super::grouper::{PayrollKey, group};
use super::normalizer::{normalize, normalize_assignment};
use super::rate_resolver::resolve_rate;
use super::reconciler::{deduplicate, match_workers_by_name};
use super::summary::summarize;
use super::synthesizer::{SynthesisOutcome, synthesize};

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollOutcome {
    /// One line per (worker, role), ordered by worker then role.
    pub lines: Vec<PayrollLine>,
    /// Aggregate over the lines.
    pub summary: PayrollSummary,
    /// Everything dropped, excluded or resolved through a fallback.
    pub diagnostics: Vec<Diagnostic>,
}

/// Calculates payroll for a period.
///
/// Identical inputs always give identical outputs.
///
/// # Arguments
///
/// * `input` - Raw records, roster, policy, period and override snapshots
/// * `settings` - Engine settings (UTC offset, undecided sentinels)
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_payroll;
/// use payroll_engine::config::{EngineSettings, PayPolicy};
/// use payroll_engine::models::{PayPeriod, PayrollInput, RawWorkRecord};
/// use rust_decimal::Decimal;
/// use serde_json::json;
/// use std::str::FromStr;
///
/// let record = RawWorkRecord(json!({
///     "id": "log_001",
///     "workerId": "worker_a",
///     "eventId": "event_1",
///     "date": "2025-01-01",
///     "role": "dealer",
///     "scheduledStartTime": "22:00",
///     "scheduledEndTime": "02:00"
/// }));
/// let period = PayPeriod::from_iso("2025-01-01", "2025-01-31").unwrap();
/// let input = PayrollInput::new(vec![record], Vec::new(), PayPolicy::default(), period);
///
/// let outcome = calculate_payroll(&input, &EngineSettings::default());
/// assert_eq!(outcome.lines.len(), 1);
/// assert_eq!(outcome.lines[0].total_hours, Decimal::from_str("4.00").unwrap());
/// ```
pub fn calculate_payroll(input: &PayrollInput, settings: &EngineSettings) -> PayrollOutcome {
    let started = Instant::now();
    let period = input.period;
    let mut diagnostics = Diagnostics::new();

    let mut assignments: Vec<RosterAssignment> = Vec::with_capacity(input.roster.len());
    for (position, raw) in input.roster.iter().enumerate() {
        match normalize_assignment(raw, settings) {
            Ok(assignment) => assignments.push(assignment),
            Err(e) => {
                warn!(position, error = %e, "roster entry dropped");
                diagnostics.push(Diagnostic::warning(
                    DiagnosticCode::InvalidRosterEntry,
                    format!("roster entry #{}: {}", position, e),
                ));
            }
        }
    }
    for assignment in &assignments {
        if let Some(field) = assignment.missing_field() {
            warn!(worker_id = %assignment.worker_id, field, "roster entry dropped");
            let mut diagnostic = Diagnostic::warning(
                DiagnosticCode::InvalidRosterEntry,
                format!("roster entry is missing {}", field),
            );
            if !assignment.worker_id.trim().is_empty() {
                diagnostic = diagnostic.with_worker(assignment.worker_id.trim());
            }
            if let Some(date) = assignment.date {
                diagnostic = diagnostic.with_date(date);
            }
            diagnostics.push(diagnostic);
        }
    }
    let roster = RosterIndex::new(&assignments);

    let mut records: Vec<WorkRecord> = Vec::with_capacity(input.records.len());
    for (position, raw) in input.records.iter().enumerate() {
        match normalize(raw, settings) {
            Ok(record) if period.contains_date(record.date()) => records.push(record),
            Ok(record) => {
                debug!(record_id = %record.id, date = %record.date(), "record outside period");
            }
            Err(e) => {
                warn!(position, error = %e, "work record dropped");
                diagnostics.push(Diagnostic::warning(
                    DiagnosticCode::InvalidRecord,
                    format!("record #{}: {}", position, e),
                ));
            }
        }
    }

    match_workers_by_name(&mut records, &roster, &mut diagnostics);

    let mut synthetic = Vec::new();
    for assignment in &assignments {
        let Some(date) = assignment.date else {
            continue;
        };
        if assignment.missing_field().is_some() || !period.contains_date(date) {
            continue;
        }
        match synthesize(assignment, &records, settings) {
            SynthesisOutcome::NotNeeded => {}
            SynthesisOutcome::Synthesized(record) => synthetic.push(record),
            SynthesisOutcome::Excluded { reason } => {
                let range = assignment.time_range.clone().unwrap_or_default();
                warn!(worker_id = %assignment.worker_id, %date, reason = %reason, "assignment excluded");
                diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticCode::AmbiguousAssignmentTime,
                        EngineError::AmbiguousTime { range }.to_string(),
                    )
                    .with_worker(assignment.worker_id.trim())
                    .with_date(date),
                );
            }
        }
    }
    records.extend(synthetic);

    let reconciled = deduplicate(records);
    let buckets = group(reconciled, &roster, &mut diagnostics);

    let mut lines: Vec<PayrollLine> = Vec::with_capacity(buckets.len());
    let mut running_total = Decimal::ZERO;
    for (key, bucket) in buckets {
        let Some(line) = build_line(key, bucket, input, &roster, &mut diagnostics) else {
            continue;
        };
        match running_total.checked_add(line.grand_total) {
            Some(total) => {
                running_total = total;
                lines.push(line);
            }
            None => overflowed(&line.worker_id, &line.role, "the run total", &mut diagnostics),
        }
    }
    let summary = summarize(&lines, &period);

    info!(
        lines = lines.len(),
        workers = summary.total_workers,
        diagnostics = diagnostics.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "payroll calculated"
    );

    PayrollOutcome {
        lines,
        summary,
        diagnostics: diagnostics.into_vec(),
    }
}

fn overflowed(worker_id: &str, role: &str, amount: &str, diagnostics: &mut Diagnostics) {
    error!(worker_id, role, amount, "amount overflow, line dropped");
    diagnostics.push(
        Diagnostic::error(
            DiagnosticCode::AmountOverflow,
            format!("{} for role '{}' is too large to represent", amount, role),
        )
        .with_worker(worker_id),
    );
}

/// Prices one bucket; `None` when an amount overflows.
fn build_line(
    key: PayrollKey,
    records: Vec<WorkRecord>,
    input: &PayrollInput,
    roster: &RosterIndex<'_>,
    diagnostics: &mut Diagnostics,
) -> Option<PayrollLine> {
    let total_hours: Decimal = records.iter().map(|r| r.hours_worked).sum();
    let worked_dates: BTreeSet<_> = records
        .iter()
        .filter(|r| r.hours_worked > Decimal::ZERO)
        .map(WorkRecord::date)
        .collect();
    let total_days = u32::try_from(worked_dates.len()).unwrap_or(u32::MAX);

    let rate = resolve_rate(&key.role, &input.policy, &input.role_overrides);
    for strategy in &rate.skipped {
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticCode::RateResolution,
                format!("rate strategy '{}' gave an unknown pay type for role '{}'", strategy, key.role),
            )
            .with_worker(key.worker_id.clone()),
        );
    }

    let Some(base) = base_pay(rate.pay_type, rate.rate, total_hours, total_days) else {
        overflowed(&key.worker_id, &key.role, "base pay", diagnostics);
        return None;
    };
    let Some(allowance) = allowances(
        &key.worker_id,
        &key.role,
        total_days,
        &input.policy,
        &input.allowance_overrides,
    ) else {
        overflowed(&key.worker_id, &key.role, "allowance total", diagnostics);
        return None;
    };
    let Some(grand_total) = base.checked_add(allowance.total) else {
        overflowed(&key.worker_id, &key.role, "grand total", diagnostics);
        return None;
    };

    let worker_name = roster
        .worker_name(&key.worker_id)
        .map(str::to_string)
        .or_else(|| records.iter().find_map(|r| r.worker_name.clone()))
        .unwrap_or_else(|| key.worker_id.clone());
    let record_ids: BTreeSet<String> = records
        .into_iter()
        .flat_map(|r| r.source_ids)
        .collect();

    Some(PayrollLine {
        worker_id: key.worker_id,
        worker_name,
        role: key.role,
        total_hours,
        total_days,
        pay_type: rate.pay_type,
        base_rate: rate.rate,
        base_pay: base,
        allowance_total: allowance.total,
        grand_total,
        allowances: allowance.allowances,
        period_start: input.period.start_date,
        period_end: input.period.end_date,
        record_ids: record_ids.into_iter().collect(),
        rate_source: rate.strategy.to_string(),
    })
}
