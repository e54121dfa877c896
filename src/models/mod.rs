//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod diagnostics;
mod input;
mod overrides;
mod pay_period;
mod payroll;
mod roster;
mod work_record;

pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Severity};
pub use input::PayrollInput;
pub use overrides::{
    AllowanceItem, AllowanceOverride, AllowanceOverrides, RoleRateOverrides, allowance_key,
};
pub use pay_period::PayPeriod;
pub use payroll::{AllowanceSet, PayType, PayrollLine, PayrollSummary, RateSpec, RoleSummary};
pub use roster::{RawRosterEntry, RosterAssignment, RosterIndex};
pub use work_record::{Provenance, RawWorkRecord, RecordStatus, TimeBasis, WorkRecord};
