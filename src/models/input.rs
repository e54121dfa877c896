//! The complete input of one payroll run.

use serde::{Deserialize, Serialize};

use super::{
    AllowanceOverrides, PayPeriod, RawRosterEntry, RawWorkRecord, RoleRateOverrides, RosterAssignment,
};
use crate::config::PayPolicy;

/// Everything a run reads: raw records, roster, policy, period and the
/// caller's override snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollInput {
    /// Raw work records as fetched.
    pub records: Vec<RawWorkRecord>,
    /// Roster entries for the event(s), as sent.
    pub roster: Vec<RawRosterEntry>,
    /// Posting pay policy.
    pub policy: PayPolicy,
    /// The inclusive period to pay.
    pub period: PayPeriod,
    /// Per-role rate overrides.
    #[serde(default)]
    pub role_overrides: RoleRateOverrides,
    /// Per-worker allowance overrides.
    #[serde(default)]
    pub allowance_overrides: AllowanceOverrides,
}

impl PayrollInput {
    /// Creates an input from typed roster assignments with empty override maps.
    pub fn new(
        records: Vec<RawWorkRecord>,
        roster: Vec<RosterAssignment>,
        policy: PayPolicy,
        period: PayPeriod,
    ) -> Self {
        Self {
            records,
            roster: roster.into_iter().map(RawRosterEntry::from).collect(),
            policy,
            period,
            role_overrides: RoleRateOverrides::new(),
            allowance_overrides: AllowanceOverrides::new(),
        }
    }
}
