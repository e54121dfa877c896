//! Message protocol between a host and the execution context.
//!
//! Messages are JSON objects tagged by `type` with the body under `payload`:
//!
//! ```text
//! { "type": "CALCULATE_PAYROLL", "payload": { "workRecords": [...], ... } }
//! { "type": "PAYROLL_RESULT",    "payload": { "payrollLines": [...], ... } }
//! { "type": "PAYROLL_ERROR",     "payload": { "error": "...", "stack": "..." } }
//! ```

use serde::{Deserialize, Serialize};

use crate::calculation::PayrollOutcome;
use crate::config::PayPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AllowanceOverrides, Diagnostic, PayPeriod, PayrollInput, PayrollLine, PayrollSummary,
    RawRosterEntry, RawWorkRecord, RoleRateOverrides,
};

/// A request sent to the execution context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum WorkerRequest {
    /// Run the payroll pipeline.
    #[serde(rename = "CALCULATE_PAYROLL")]
    CalculatePayroll(CalculatePayrollPayload),
}

impl WorkerRequest {
    /// Decodes a request from JSON.
    ///
    /// # Errors
    ///
    /// Returns `MalformedMessage` when the text is not a valid request.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::dispatcher::WorkerRequest;
    ///
    /// let json = r#"{
    ///     "type": "CALCULATE_PAYROLL",
    ///     "payload": { "workRecords": [], "roster": [], "startDate": "2025-01-01", "endDate": "2025-01-31" }
    /// }"#;
    /// let WorkerRequest::CalculatePayroll(payload) = WorkerRequest::from_json(json).unwrap();
    /// assert_eq!(payload.start_date, "2025-01-01");
    ///
    /// assert!(WorkerRequest::from_json(r#"{"type":"SHUTDOWN"}"#).is_err());
    /// ```
    pub fn from_json(text: &str) -> EngineResult<Self> {
        serde_json::from_str(text).map_err(|e| EngineError::MalformedMessage {
            message: e.to_string(),
        })
    }
}

/// Body of a `CALCULATE_PAYROLL` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatePayrollPayload {
    /// Raw work records as fetched.
    #[serde(default)]
    pub work_records: Vec<RawWorkRecord>,
    /// Roster entries; each one is validated on its own.
    #[serde(default)]
    pub roster: Vec<RawRosterEntry>,
    /// The posting's pay policy.
    #[serde(default)]
    pub pay_policy: PayPolicy,
    /// First day of the period, `YYYY-MM-DD`.
    pub start_date: String,
    /// Last day of the period, `YYYY-MM-DD`.
    pub end_date: String,
    /// Per-role rate overrides.
    #[serde(default)]
    pub role_overrides: RoleRateOverrides,
    /// Per-worker allowance overrides.
    #[serde(default)]
    pub allowance_overrides: AllowanceOverrides,
}

impl TryFrom<CalculatePayrollPayload> for PayrollInput {
    type Error = EngineError;

    fn try_from(payload: CalculatePayrollPayload) -> EngineResult<Self> {
        let period = PayPeriod::from_iso(&payload.start_date, &payload.end_date)?;
        Ok(PayrollInput {
            records: payload.work_records,
            roster: payload.roster,
            policy: payload.pay_policy,
            period,
            role_overrides: payload.role_overrides,
            allowance_overrides: payload.allowance_overrides,
        })
    }
}

/// A response sent back by the execution context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum WorkerResponse {
    /// The calculation finished.
    #[serde(rename = "PAYROLL_RESULT")]
    PayrollResult(PayrollResultPayload),
    /// The calculation could not run or crashed.
    #[serde(rename = "PAYROLL_ERROR")]
    PayrollError(PayrollErrorPayload),
}

impl WorkerResponse {
    /// Wraps a pipeline outcome.
    pub fn result(outcome: PayrollOutcome, elapsed_ms: u64) -> Self {
        Self::PayrollResult(PayrollResultPayload {
            payroll_lines: outcome.lines,
            summary: outcome.summary,
            elapsed_ms,
            diagnostics: outcome.diagnostics,
        })
    }

    /// Wraps an engine error.
    pub fn error(error: &EngineError) -> Self {
        Self::PayrollError(PayrollErrorPayload {
            error: error.to_string(),
            stack: None,
        })
    }

    /// Returns true for `PAYROLL_RESULT`.
    pub fn is_result(&self) -> bool {
        matches!(self, Self::PayrollResult(_))
    }
}

/// Body of a `PAYROLL_RESULT` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollResultPayload {
    /// One line per (worker, role).
    pub payroll_lines: Vec<PayrollLine>,
    /// Aggregate over the lines.
    pub summary: PayrollSummary,
    /// Wall-clock time the pipeline took.
    pub elapsed_ms: u64,
    /// Dropped, excluded and fallback-resolved input.
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// Body of a `PAYROLL_ERROR` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollErrorPayload {
    /// What went wrong.
    pub error: String,
    /// Where it went wrong, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}
