//! Calculation logic for the payroll engine.
//!
//! This module contains every stage of a payroll run: time resolution,
//! record normalization, synthesis from the roster, deduplication, grouping
//! by (worker, role), rate resolution, base pay, allowances and the summary,
//! plus the [`calculate_payroll`] pipeline that wires them together.

mod allowances;
mod base_pay;
mod grouper;
mod normalizer;
mod pipeline;
mod rate_resolver;
mod reconciler;
mod strategy;
mod summary;
mod synthesizer;
mod time_resolver;

use rust_decimal::{Decimal, RoundingStrategy};

pub use allowances::{
    AllowanceResolution, AllowanceSource, ApplyTo, BulkAllowanceRequest, allowances,
    apply_bulk_allowances, default_allowances, parse_benefit_amount,
};
pub use base_pay::base_pay;
pub use grouper::{PayrollKey, RoleContext, group, resolve_role};
pub use normalizer::{normalize, normalize_assignment};
pub use pipeline::{PayrollOutcome, calculate_payroll};
pub use rate_resolver::{
    FALLBACK_RATES, GENERIC_DEFAULT_RATE, RateContext, RateResolution, resolve_rate,
};
pub use reconciler::{
    PAY_WINDOW_CHAIN, PayWindow, deduplicate, match_workers_by_name, pay_window, reconcile,
};
pub use strategy::{Resolution, Strategy, resolve_first};
pub use summary::summarize;
pub use synthesizer::{SynthesisOutcome, synthesize};
pub use time_resolver::{parse_assignment_range, parse_date, parse_instant, resolve_hours};

/// Rounds half away from zero, so 0.5 always goes up in magnitude.
fn round_half_away(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}
