//! The execution body run inside an execution context.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use tracing::error;

use crate::calculation::{PayrollOutcome, calculate_payroll};
use crate::config::EngineSettings;
use crate::models::PayrollInput;

use super::protocol::{PayrollErrorPayload, WorkerRequest, WorkerResponse};

/// Runs a payroll calculation.
///
/// The default is [`PipelineExecutor`]; hosts can substitute their own body,
/// for example to record metrics around the pipeline.
pub trait PayrollExecutor: Send + Sync + 'static {
    /// Computes the payroll for one input.
    fn execute(&self, input: &PayrollInput, settings: &EngineSettings) -> PayrollOutcome;
}

/// Runs [`calculate_payroll`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineExecutor;

impl PayrollExecutor for PipelineExecutor {
    fn execute(&self, input: &PayrollInput, settings: &EngineSettings) -> PayrollOutcome {
        calculate_payroll(input, settings)
    }
}

/// Handles one request end to end and always produces a response.
///
/// An invalid period becomes `PAYROLL_ERROR`; so does a panic inside the
/// executor, which is caught here.
pub fn handle_request(
    executor: &dyn PayrollExecutor,
    request: WorkerRequest,
    settings: &EngineSettings,
) -> WorkerResponse {
    let WorkerRequest::CalculatePayroll(payload) = request;
    let input = match PayrollInput::try_from(payload) {
        Ok(input) => input,
        Err(e) => return WorkerResponse::error(&e),
    };

    let started = Instant::now();
    match catch_unwind(AssertUnwindSafe(|| executor.execute(&input, settings))) {
        Ok(outcome) => {
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            WorkerResponse::result(outcome, elapsed_ms)
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(error = %message, "payroll calculation panicked");
            WorkerResponse::PayrollError(PayrollErrorPayload {
                error: message,
                stack: None,
            })
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "payroll calculation panicked".to_string()
    }
}
