//! Configuration types for payroll calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files or arrive as the pay-policy
//! part of a calculation request.

use std::collections::BTreeMap;

use chrono::{FixedOffset, Offset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::PayType;

/// Engine-wide settings loaded from `engine.yaml`.
///
/// # Example
///
/// ```
/// use payroll_engine::config::EngineSettings;
///
/// let settings = EngineSettings::default();
/// assert_eq!(settings.utc_offset_minutes, 0);
/// assert!(settings.is_undecided("Undecided"));
/// assert!(!settings.is_undecided("10:00-18:00"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineSettings {
    /// Offset from UTC, in minutes, of the wall clock the event runs on.
    /// Zone-qualified timestamps are converted to this offset.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Assignment time-range values meaning "not decided yet".
    #[serde(default = "default_undecided_sentinels")]
    pub undecided_sentinels: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            undecided_sentinels: default_undecided_sentinels(),
        }
    }
}

impl EngineSettings {
    /// The configured offset, or UTC when the minutes are out of range.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
    }

    /// Returns true if `value` is one of the undecided sentinels, ignoring
    /// case and surrounding whitespace.
    pub fn is_undecided(&self, value: &str) -> bool {
        let value = value.trim();
        self.undecided_sentinels
            .iter()
            .any(|sentinel| sentinel.trim().to_lowercase() == value.to_lowercase())
    }
}

fn default_undecided_sentinels() -> Vec<String> {
    ["undecided", "미정", "tbd", "tba", "추후공지"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// A pay type as written on a job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostedPayType {
    /// Paid by the hour.
    Hourly,
    /// Paid by the day.
    Daily,
    /// Flat amount for the period.
    Monthly,
    /// Rate agreed per worker; paid as a custom day-rate.
    Negotiable,
    /// Custom day-rate.
    Other,
    /// Any value the engine does not recognise.
    #[serde(other)]
    Unknown,
}

impl PostedPayType {
    /// Maps a posted pay type onto the pay type used for calculation.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::PostedPayType;
    /// use payroll_engine::models::PayType;
    ///
    /// assert_eq!(PostedPayType::Negotiable.to_pay_type(), PayType::Other);
    /// assert_eq!(PostedPayType::Hourly.to_pay_type(), PayType::Hourly);
    /// ```
    pub fn to_pay_type(self) -> PayType {
        match self {
            Self::Hourly => PayType::Hourly,
            Self::Daily => PayType::Daily,
            Self::Monthly => PayType::Monthly,
            Self::Negotiable | Self::Other => PayType::Other,
            Self::Unknown => PayType::Unknown,
        }
    }
}

/// A posted (pay type, rate) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedRate {
    /// How the rate is applied.
    pub pay_type: PostedPayType,
    /// The rate amount.
    #[serde(default)]
    pub rate: Decimal,
}

/// Default allowance amounts configured for one role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceDefaults {
    /// Meal allowance.
    #[serde(default)]
    pub meal: Decimal,
    /// Transportation allowance.
    #[serde(default)]
    pub transportation: Decimal,
    /// Accommodation allowance.
    #[serde(default)]
    pub accommodation: Decimal,
}

/// Benefit strings as written on the posting, e.g. `"10,000원"`.
///
/// Numbers are accepted as well and kept as their text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingBenefits {
    /// Meal benefit.
    #[serde(default, deserialize_with = "text_or_number")]
    pub meal: Option<String>,
    /// Transportation benefit.
    #[serde(default, deserialize_with = "text_or_number")]
    pub transportation: Option<String>,
    /// Accommodation benefit.
    #[serde(default, deserialize_with = "text_or_number")]
    pub accommodation: Option<String>,
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

/// How default allowances scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceBasis {
    /// One amount per payroll line.
    #[default]
    Fixed,
    /// Amount multiplied by the days worked.
    PerDay,
}

/// The pay policy of a job posting.
///
/// Every field is optional; an empty policy resolves every role through the
/// built-in fallback table.
///
/// # Example
///
/// ```
/// use payroll_engine::config::{AllowanceBasis, PayPolicy, PostedPayType};
///
/// let yaml = r#"
/// roleRates:
///   dealer: { payType: hourly, rate: 18000 }
///   floor: { payType: negotiable, rate: 150000 }
/// allowanceBasis: per_day
/// "#;
/// let policy: PayPolicy = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(policy.role_rates["floor"].pay_type, PostedPayType::Negotiable);
/// assert_eq!(policy.allowance_basis, AllowanceBasis::PerDay);
/// assert!(policy.default_rate.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayPolicy {
    /// Rate applied to roles without their own entry.
    #[serde(default)]
    pub default_rate: Option<PostedRate>,
    /// Per-role rates.
    #[serde(default)]
    pub role_rates: BTreeMap<String, PostedRate>,
    /// Per-role default allowances.
    #[serde(default)]
    pub role_allowances: BTreeMap<String, AllowanceDefaults>,
    /// Posting-level benefits, used when a role has no allowances of its own.
    #[serde(default)]
    pub benefits: PostingBenefits,
    /// Whether default allowances are per line or per day.
    #[serde(default)]
    pub allowance_basis: AllowanceBasis,
}
