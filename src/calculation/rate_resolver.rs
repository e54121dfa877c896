//! Rate resolution functionality.
//!
//! This module determines the (pay type, rate) a role is paid at. The lookup
//! runs through a fixed chain, most specific first:
//! 1. `role_override` - the caller's per-role override
//! 2. `role_policy` - the posting's rate for the role (`negotiable` is paid as `other`)
//! 3. `posting_default` - the posting's global default rate
//! 4. `fallback_table` - built-in rates for common event roles
//! 5. `generic_default` - hourly 10,000
//!
//! Resolution is total, deterministic and performs no I/O.

use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use crate::config::PayPolicy;
use crate::error::EngineError;
use crate::models::{PayType, RateSpec, RoleRateOverrides};

use super::strategy::Strategy;

/// Built-in rates for roles the posting does not price.
pub const FALLBACK_RATES: &[(&str, PayType, i64)] = &[
    ("dealer", PayType::Hourly, 15_000),
    ("floor", PayType::Hourly, 12_000),
    ("chip_runner", PayType::Hourly, 10_000),
    ("registration", PayType::Hourly, 10_000),
    ("staff", PayType::Hourly, 10_000),
];

/// Rate used when nothing else applies.
pub const GENERIC_DEFAULT_RATE: i64 = 10_000;

/// The outcome of resolving a role's rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateResolution {
    /// How the rate is applied.
    pub pay_type: PayType,
    /// The rate amount.
    pub rate: Decimal,
    /// Name of the strategy that produced the rate.
    pub strategy: &'static str,
    /// Strategies that produced an unusable pay type and were skipped.
    pub skipped: Vec<&'static str>,
}

/// What the rate strategies look at.
pub struct RateContext<'a> {
    /// The role being priced.
    pub role: &'a str,
    /// The posting's pay policy.
    pub policy: &'a PayPolicy,
    /// The caller's per-role overrides.
    pub overrides: &'a RoleRateOverrides,
}

fn from_role_override(ctx: &RateContext<'_>) -> Option<RateSpec> {
    ctx.overrides.get(ctx.role).copied()
}

fn from_role_policy(ctx: &RateContext<'_>) -> Option<RateSpec> {
    ctx.policy
        .role_rates
        .get(ctx.role)
        .map(|posted| RateSpec::new(posted.pay_type.to_pay_type(), posted.rate))
}

fn from_posting_default(ctx: &RateContext<'_>) -> Option<RateSpec> {
    ctx.policy
        .default_rate
        .map(|posted| RateSpec::new(posted.pay_type.to_pay_type(), posted.rate))
}

fn from_fallback_table(ctx: &RateContext<'_>) -> Option<RateSpec> {
    FALLBACK_RATES
        .iter()
        .find(|(role, _, _)| role.eq_ignore_ascii_case(ctx.role.trim()))
        .map(|(_, pay_type, rate)| RateSpec::new(*pay_type, Decimal::from(*rate)))
}

fn generic_default(_: &RateContext<'_>) -> Option<RateSpec> {
    Some(generic_default_rate())
}

fn generic_default_rate() -> RateSpec {
    RateSpec::new(PayType::Hourly, Decimal::from(GENERIC_DEFAULT_RATE))
}

fn rate_chain<'a>() -> [Strategy<RateContext<'a>, RateSpec>; 5] {
    [
        Strategy {
            name: "role_override",
            resolve: from_role_override,
        },
        Strategy {
            name: "role_policy",
            resolve: from_role_policy,
        },
        Strategy {
            name: "posting_default",
            resolve: from_posting_default,
        },
        Strategy {
            name: "fallback_table",
            resolve: from_fallback_table,
        },
        Strategy {
            name: "generic_default",
            resolve: generic_default,
        },
    ]
}

/// Resolves the pay type and rate for a role.
///
/// A strategy whose pay type is unknown is skipped and named in
/// [`RateResolution::skipped`]; the next strategy is tried.
///
/// # Arguments
///
/// * `role` - The role being priced
/// * `policy` - The posting's pay policy
/// * `role_overrides` - The caller's per-role overrides
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::resolve_rate;
/// use payroll_engine::config::PayPolicy;
/// use payroll_engine::models::{PayType, RateSpec, RoleRateOverrides};
/// use rust_decimal::Decimal;
///
/// let policy = PayPolicy::default();
/// let mut overrides = RoleRateOverrides::new();
///
/// let resolution = resolve_rate("dealer", &policy, &overrides);
/// assert_eq!(resolution.strategy, "fallback_table");
/// assert_eq!(resolution.rate, Decimal::from(15000));
///
/// overrides.insert("dealer".to_string(), RateSpec::new(PayType::Daily, Decimal::from(150000)));
/// let resolution = resolve_rate("dealer", &policy, &overrides);
/// assert_eq!(resolution.strategy, "role_override");
/// assert_eq!(resolution.pay_type, PayType::Daily);
/// ```
pub fn resolve_rate(role: &str, policy: &PayPolicy, role_overrides: &RoleRateOverrides) -> RateResolution {
    let context = RateContext {
        role,
        policy,
        overrides: role_overrides,
    };

    let mut skipped = Vec::new();
    for strategy in rate_chain() {
        let Some(spec) = (strategy.resolve)(&context) else {
            continue;
        };
        if spec.pay_type == PayType::Unknown {
            warn!(role = %role, strategy = strategy.name, "unknown pay type, trying next rate strategy");
            skipped.push(strategy.name);
            continue;
        }
        debug!(role = %role, strategy = strategy.name, pay_type = %spec.pay_type, rate = %spec.rate, "rate resolved");
        return RateResolution {
            pay_type: spec.pay_type,
            rate: spec.rate,
            strategy: strategy.name,
            skipped,
        };
    }

    let failure = EngineError::RateResolution {
        role: role.to_string(),
        message: "no strategy produced a usable pay type".to_string(),
    };
    error!(error = %failure, "substituting generic default rate");
    let spec = generic_default_rate();
    RateResolution {
        pay_type: spec.pay_type,
        rate: spec.rate,
        strategy: "generic_default",
        skipped,
    }
}
