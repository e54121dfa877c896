//! Summary aggregation.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::models::{PayPeriod, PayrollLine, PayrollSummary, RoleSummary};

/// Reduces payroll lines to a summary.
///
/// Workers are counted once however many roles they held. Sums saturate
/// instead of overflowing.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::summarize;
/// use payroll_engine::models::PayPeriod;
///
/// let period = PayPeriod::from_iso("2025-01-01", "2025-01-31").unwrap();
/// let summary = summarize(&[], &period);
/// assert_eq!(summary.total_workers, 0);
/// assert!(summary.by_role.is_empty());
/// ```
pub fn summarize(lines: &[PayrollLine], period: &PayPeriod) -> PayrollSummary {
    let workers: BTreeSet<&str> = lines.iter().map(|line| line.worker_id.as_str()).collect();

    let mut by_role: BTreeMap<String, RoleSummary> = BTreeMap::new();
    let mut by_pay_type = BTreeMap::new();
    let mut total_hours = Decimal::ZERO;
    let mut total_days: u32 = 0;
    let mut total_amount = Decimal::ZERO;

    for line in lines {
        total_hours = total_hours.saturating_add(line.total_hours);
        total_days = total_days.saturating_add(line.total_days);
        total_amount = total_amount.saturating_add(line.grand_total);

        let role = by_role.entry(line.role.clone()).or_default();
        role.count = role.count.saturating_add(1);
        role.hours = role.hours.saturating_add(line.total_hours);
        role.amount = role.amount.saturating_add(line.grand_total);

        let by_type = by_pay_type.entry(line.pay_type).or_insert(Decimal::ZERO);
        *by_type = by_type.saturating_add(line.grand_total);
    }

    PayrollSummary {
        total_workers: u32::try_from(workers.len()).unwrap_or(u32::MAX),
        total_hours,
        total_days,
        total_amount,
        by_role,
        by_pay_type,
        period_start: period.start_date,
        period_end: period.end_date,
    }
}
