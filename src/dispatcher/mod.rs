//! Off-thread execution of payroll calculations.
//!
//! A host submits a `CALCULATE_PAYROLL` request to a [`WorkerDispatcher`],
//! which runs the pipeline on a dedicated execution context and replies with
//! `PAYROLL_RESULT` or `PAYROLL_ERROR`. One calculation runs at a time; a
//! running calculation can be cancelled.

mod context;
mod executor;
mod protocol;
mod worker;

pub use executor::{PayrollExecutor, PipelineExecutor, handle_request};
pub use protocol::{
    CalculatePayrollPayload, PayrollErrorPayload, PayrollResultPayload, WorkerRequest,
    WorkerResponse,
};
pub use worker::{DispatchState, ExecutionCapability, PendingCalculation, WorkerDispatcher};
