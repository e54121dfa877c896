//! Caller-owned override maps.
//!
//! Overrides are session state that belongs to the caller. They are passed
//! into every calculation by value and read as immutable snapshots.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AllowanceSet, RateSpec};

/// Role → (pay type, rate) overrides.
pub type RoleRateOverrides = BTreeMap<String, RateSpec>;

/// Allowance-key → allowance overrides. Keys come from [`allowance_key`] or
/// are a bare worker id for a worker-wide override.
pub type AllowanceOverrides = BTreeMap<String, AllowanceOverride>;

/// Builds the override key for a (worker, role) pair.
///
/// # Example
///
/// ```
/// use payroll_engine::models::allowance_key;
///
/// assert_eq!(allowance_key("A", "dealer"), "A_dealer");
/// ```
pub fn allowance_key(worker_id: &str, role: &str) -> String {
    format!("{}_{}", worker_id, role)
}

/// One allowance field of an override; a disabled item pays nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceItem {
    /// Whether the allowance applies.
    #[serde(default)]
    pub enabled: bool,
    /// The amount paid when enabled.
    #[serde(default)]
    pub amount: Decimal,
}

impl AllowanceItem {
    /// An enabled item paying `amount`.
    pub fn enabled(amount: Decimal) -> Self {
        Self {
            enabled: true,
            amount,
        }
    }

    /// The amount this item contributes.
    pub fn value(&self) -> Decimal {
        if self.enabled { self.amount } else { Decimal::ZERO }
    }
}

/// A full allowance override for one key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceOverride {
    /// Meal allowance.
    #[serde(default)]
    pub meal: AllowanceItem,
    /// Transportation allowance.
    #[serde(default)]
    pub transportation: AllowanceItem,
    /// Accommodation allowance.
    #[serde(default)]
    pub accommodation: AllowanceItem,
    /// Bonus.
    #[serde(default)]
    pub bonus: AllowanceItem,
    /// Other allowance.
    #[serde(default)]
    pub other: AllowanceItem,
    /// Free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AllowanceOverride {
    /// Converts the override into the amounts it pays.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{AllowanceItem, AllowanceOverride};
    /// use rust_decimal::Decimal;
    ///
    /// let over = AllowanceOverride {
    ///     meal: AllowanceItem::enabled(Decimal::from(9000)),
    ///     transportation: AllowanceItem { enabled: false, amount: Decimal::from(5000) },
    ///     ..AllowanceOverride::default()
    /// };
    /// let set = over.to_allowance_set();
    /// assert_eq!(set.meal, Decimal::from(9000));
    /// assert_eq!(set.transportation, Decimal::ZERO);
    /// ```
    pub fn to_allowance_set(&self) -> AllowanceSet {
        AllowanceSet {
            meal: self.meal.value(),
            transportation: self.transportation.value(),
            accommodation: self.accommodation.value(),
            bonus: self.bonus.value(),
            other: self.other.value(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        }
    }
}
