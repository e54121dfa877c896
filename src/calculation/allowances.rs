//! Allowance aggregation functionality.
//!
//! This module decides the allowances a payroll line carries and provides the
//! caller-side helper that writes one allowance set to many lines at once.
//!
//! Precedence, most specific first:
//! 1. the caller's override for `"{worker}_{role}"`
//! 2. the caller's override for `"{worker}"`
//! 3. the posting's defaults: the role's own allowances, else the posting
//!    benefit strings read as integers; multiplied by days worked when the
//!    allowance basis is `per_day`

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AllowanceBasis, PayPolicy};
use crate::models::{AllowanceOverride, AllowanceOverrides, AllowanceSet, PayrollLine, allowance_key};

/// Where a line's allowances came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceSource {
    /// Override keyed by worker and role.
    WorkerRoleOverride,
    /// Override keyed by worker only.
    WorkerOverride,
    /// The role's allowances on the posting.
    RolePolicy,
    /// The posting-level benefit strings.
    PostingBenefits,
}

/// The allowances of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowanceResolution {
    /// The allowance breakdown.
    pub allowances: AllowanceSet,
    /// Sum of the breakdown.
    pub total: Decimal,
    /// Which rule produced the breakdown.
    pub source: AllowanceSource,
}

/// Reads a posting benefit string as an integer amount.
///
/// Thousands separators are removed and the leading digits are read; text
/// with no leading digits is zero.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::parse_benefit_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_benefit_amount("10,000원"), Decimal::from(10000));
/// assert_eq!(parse_benefit_amount("숙소 제공"), Decimal::ZERO);
/// ```
pub fn parse_benefit_amount(text: &str) -> Decimal {
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',')
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u64>().map(Decimal::from).unwrap_or(Decimal::ZERO)
}

/// The posting's default allowances for a role.
///
/// Returns `None` when a per-day amount or the total does not fit in a
/// `Decimal`.
pub fn default_allowances(
    role: &str,
    total_days: u32,
    policy: &PayPolicy,
) -> Option<AllowanceResolution> {
    let (mut allowances, source) = match policy.role_allowances.get(role) {
        Some(defaults) => (
            AllowanceSet {
                meal: defaults.meal,
                transportation: defaults.transportation,
                accommodation: defaults.accommodation,
                ..AllowanceSet::default()
            },
            AllowanceSource::RolePolicy,
        ),
        None => {
            let amount = |text: &Option<String>| text.as_deref().map(parse_benefit_amount).unwrap_or_default();
            (
                AllowanceSet {
                    meal: amount(&policy.benefits.meal),
                    transportation: amount(&policy.benefits.transportation),
                    accommodation: amount(&policy.benefits.accommodation),
                    ..AllowanceSet::default()
                },
                AllowanceSource::PostingBenefits,
            )
        }
    };

    if policy.allowance_basis == AllowanceBasis::PerDay {
        let days = Decimal::from(total_days);
        allowances.meal = allowances.meal.checked_mul(days)?;
        allowances.transportation = allowances.transportation.checked_mul(days)?;
        allowances.accommodation = allowances.accommodation.checked_mul(days)?;
    }

    Some(AllowanceResolution {
        total: allowances.total()?,
        allowances,
        source,
    })
}

/// Resolves the allowances of one (worker, role) line.
///
/// Returns `None` when the amounts do not fit in a `Decimal`.
///
/// # Arguments
///
/// * `worker_id` - The worker being paid
/// * `role` - The role being paid
/// * `total_days` - Days worked, used by the `per_day` basis
/// * `policy` - The posting's pay policy, source of the defaults
/// * `overrides` - The caller's allowance overrides
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{AllowanceSource, allowances};
/// use payroll_engine::config::PayPolicy;
/// use payroll_engine::models::{AllowanceItem, AllowanceOverride, AllowanceOverrides};
/// use rust_decimal::Decimal;
///
/// let mut overrides = AllowanceOverrides::new();
/// overrides.insert(
///     "A_dealer".to_string(),
///     AllowanceOverride { meal: AllowanceItem::enabled(Decimal::from(9000)), ..Default::default() },
/// );
///
/// let resolution = allowances("A", "dealer", 2, &PayPolicy::default(), &overrides).unwrap();
/// assert_eq!(resolution.source, AllowanceSource::WorkerRoleOverride);
/// assert_eq!(resolution.allowances.meal, Decimal::from(9000));
/// assert_eq!(resolution.total, Decimal::from(9000));
/// ```
pub fn allowances(
    worker_id: &str,
    role: &str,
    total_days: u32,
    policy: &PayPolicy,
    overrides: &AllowanceOverrides,
) -> Option<AllowanceResolution> {
    let from_override = |over: &AllowanceOverride, source| {
        let allowances = over.to_allowance_set();
        Some(AllowanceResolution {
            total: allowances.total()?,
            allowances,
            source,
        })
    };

    if let Some(over) = overrides.get(&allowance_key(worker_id, role)) {
        return from_override(over, AllowanceSource::WorkerRoleOverride);
    }
    if let Some(over) = overrides.get(worker_id) {
        return from_override(over, AllowanceSource::WorkerOverride);
    }
    default_allowances(role, total_days, policy)
}

/// Which lines a bulk allowance update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplyTo {
    /// Every line.
    All,
    /// The lines whose allowance keys are listed.
    Selected,
    /// The lines whose role is listed.
    ByRole,
}

/// A request to write one allowance set to many lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAllowanceRequest {
    /// Which lines to update.
    pub apply_to: ApplyTo,
    /// The allowances to write.
    pub allowances: AllowanceOverride,
    /// Allowance keys, for [`ApplyTo::Selected`].
    #[serde(default)]
    pub selected_keys: Vec<String>,
    /// Roles, for [`ApplyTo::ByRole`].
    #[serde(default)]
    pub target_roles: Vec<String>,
}

/// Writes the request's allowances into the caller's override map for every
/// selected line.
///
/// Overrides of lines outside the selection are left untouched. Returns the
/// number of distinct keys written.
///
/// # Examples
///
/// ```no_run
/// use payroll_engine::calculation::{ApplyTo, BulkAllowanceRequest, apply_bulk_allowances};
/// use payroll_engine::models::{AllowanceOverride, AllowanceOverrides, PayrollLine};
///
/// # let lines: Vec<PayrollLine> = Vec::new();
/// let mut overrides = AllowanceOverrides::new();
/// let request = BulkAllowanceRequest {
///     apply_to: ApplyTo::ByRole,
///     allowances: AllowanceOverride::default(),
///     selected_keys: Vec::new(),
///     target_roles: vec!["dealer".to_string()],
/// };
/// let updated = apply_bulk_allowances(&mut overrides, &lines, &request);
/// println!("updated {} lines", updated);
/// ```
pub fn apply_bulk_allowances(
    overrides: &mut AllowanceOverrides,
    lines: &[PayrollLine],
    request: &BulkAllowanceRequest,
) -> usize {
    let selected: BTreeSet<&str> = request.selected_keys.iter().map(String::as_str).collect();
    let roles: BTreeSet<&str> = request.target_roles.iter().map(String::as_str).collect();

    let keys: BTreeSet<String> = lines
        .iter()
        .map(PayrollLine::allowance_key)
        .zip(lines)
        .filter(|(key, line)| match request.apply_to {
            ApplyTo::All => true,
            ApplyTo::Selected => selected.contains(key.as_str()),
            ApplyTo::ByRole => roles.contains(line.role.as_str()),
        })
        .map(|(key, _)| key)
        .collect();

    for key in &keys {
        overrides.insert(key.clone(), request.allowances.clone());
    }
    debug!(apply_to = ?request.apply_to, updated = keys.len(), "bulk allowances applied");
    keys.len()
}
