//! Base pay calculation functionality.
//!
//! Base pay is what a line earns from its rate alone, before allowances.
//! Amounts are whole currency units, rounded half away from zero.

use rust_decimal::Decimal;
use tracing::error;

use crate::models::PayType;

use super::round_half_away;

/// Calculates base pay from a resolved rate.
///
/// Returns `None` when the product does not fit in a `Decimal`.
///
/// | Pay type  | Base pay              |
/// |-----------|-----------------------|
/// | `hourly`  | round(hours × rate)   |
/// | `daily`   | round(days × rate)    |
/// | `monthly` | rate                  |
/// | `other`   | round(days × rate)    |
/// | `unknown` | 0, logged as an error |
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::base_pay;
/// use payroll_engine::models::PayType;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let hours = Decimal::from_str("16.00").unwrap();
/// assert_eq!(base_pay(PayType::Hourly, Decimal::from(18000), hours, 2), Some(Decimal::from(288000)));
/// assert_eq!(base_pay(PayType::Daily, Decimal::from(150000), hours, 2), Some(Decimal::from(300000)));
/// assert_eq!(base_pay(PayType::Hourly, Decimal::MAX, hours, 2), None);
/// ```
pub fn base_pay(
    pay_type: PayType,
    rate: Decimal,
    total_hours: Decimal,
    total_days: u32,
) -> Option<Decimal> {
    let amount = match pay_type {
        PayType::Hourly => total_hours.checked_mul(rate),
        PayType::Daily | PayType::Other => Decimal::from(total_days).checked_mul(rate),
        PayType::Monthly => Some(rate),
        PayType::Unknown => {
            error!(rate = %rate, "base pay requested for an unknown pay type");
            Some(Decimal::ZERO)
        }
    };
    amount.map(|amount| round_half_away(amount, 0))
}
