//! Payroll result models.
//!
//! This module contains the [`PayrollLine`] produced for every (worker, role)
//! pair and the [`PayrollSummary`] rolled up from those lines, along with the
//! pay-type and allowance types they are built from.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a base rate converts into base pay.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayType;
///
/// let pay_type: PayType = serde_json::from_str("\"daily\"").unwrap();
/// assert_eq!(pay_type, PayType::Daily);
///
/// let unknown: PayType = serde_json::from_str("\"weekly\"").unwrap();
/// assert_eq!(unknown, PayType::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayType {
    /// Rate × total hours.
    Hourly,
    /// Rate × total days.
    Daily,
    /// Flat rate for the period.
    Monthly,
    /// Custom day-rate: rate × total days.
    Other,
    /// A value no strategy understands; pays nothing.
    #[serde(other)]
    Unknown,
}

impl PayType {
    /// The wire name of the pay type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayType::Hourly => "hourly",
            PayType::Daily => "daily",
            PayType::Monthly => "monthly",
            PayType::Other => "other",
            PayType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pay type together with its rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSpec {
    /// How the rate is applied.
    pub pay_type: PayType,
    /// The rate amount.
    pub rate: Decimal,
}

impl RateSpec {
    /// Creates a rate spec.
    pub fn new(pay_type: PayType, rate: Decimal) -> Self {
        Self { pay_type, rate }
    }
}

/// The allowance breakdown of one payroll line.
///
/// `description` is only present when non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceSet {
    /// Meal allowance.
    pub meal: Decimal,
    /// Transportation allowance.
    pub transportation: Decimal,
    /// Accommodation (lodging) allowance.
    pub accommodation: Decimal,
    /// Bonus.
    pub bonus: Decimal,
    /// Any other allowance.
    pub other: Decimal,
    /// Free-text note attached to the allowances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AllowanceSet {
    /// Sum of the five numeric fields, or `None` if it does not fit in a
    /// `Decimal`.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::AllowanceSet;
    /// use rust_decimal::Decimal;
    ///
    /// let set = AllowanceSet {
    ///     meal: Decimal::from(9000),
    ///     bonus: Decimal::from(1000),
    ///     ..AllowanceSet::default()
    /// };
    /// assert_eq!(set.total(), Some(Decimal::from(10000)));
    ///
    /// let huge = AllowanceSet { meal: Decimal::MAX, bonus: Decimal::ONE, ..AllowanceSet::default() };
    /// assert_eq!(huge.total(), None);
    /// ```
    pub fn total(&self) -> Option<Decimal> {
        [self.transportation, self.accommodation, self.bonus, self.other]
            .into_iter()
            .try_fold(self.meal, Decimal::checked_add)
    }
}

/// One (worker, role) result for a period.
///
/// Built fresh on every run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollLine {
    /// Identifier of the worker.
    pub worker_id: String,
    /// Display name of the worker.
    pub worker_name: String,
    /// The role this line pays.
    pub role: String,
    /// Sum of the hours of every record in the line, 2 decimal places.
    pub total_hours: Decimal,
    /// Distinct dates with hours greater than zero.
    pub total_days: u32,
    /// Resolved pay type.
    pub pay_type: PayType,
    /// Resolved rate.
    pub base_rate: Decimal,
    /// Allowance breakdown.
    pub allowances: AllowanceSet,
    /// Pay from the rate alone.
    pub base_pay: Decimal,
    /// Sum of the allowances.
    pub allowance_total: Decimal,
    /// Base pay plus allowances.
    pub grand_total: Decimal,
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period.
    pub period_end: NaiveDate,
    /// Source record identifiers that fed this line.
    pub record_ids: Vec<String>,
    /// Name of the rate strategy that produced the rate.
    pub rate_source: String,
}

impl PayrollLine {
    /// The key used for allowance overrides of this line.
    pub fn allowance_key(&self) -> String {
        super::allowance_key(&self.worker_id, &self.role)
    }
}

/// Per-role totals within a summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    /// Number of lines for the role.
    pub count: u32,
    /// Total hours for the role.
    pub hours: Decimal,
    /// Total grand-total amount for the role.
    pub amount: Decimal,
}

/// Aggregate over all payroll lines of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollSummary {
    /// Distinct workers, counted once regardless of how many roles they hold.
    pub total_workers: u32,
    /// Sum of line hours.
    pub total_hours: Decimal,
    /// Sum of line days.
    pub total_days: u32,
    /// Sum of line grand totals.
    pub total_amount: Decimal,
    /// Totals keyed by role.
    pub by_role: BTreeMap<String, RoleSummary>,
    /// Grand-total amounts keyed by pay type.
    pub by_pay_type: BTreeMap<PayType, Decimal>,
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period.
    pub period_end: NaiveDate,
}
