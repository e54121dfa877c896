//! The worker dispatcher.
//!
//! Runs payroll requests off the caller's thread, one at a time, and lets the
//! caller cancel a request that is taking too long.
//!
//! ```text
//! Idle ──submit──▶ Running ──▶ Completed | Failed | Cancelled ──acknowledge──▶ Idle
//! ```
//!
//! A finished state also accepts the next `submit` directly.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, info, warn};

use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult};

use super::context::{Completion, ExecutionContext, Job};
use super::executor::{PayrollExecutor, PipelineExecutor, handle_request};
use super::protocol::{WorkerRequest, WorkerResponse};

/// Where the dispatcher is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DispatchState {
    /// Nothing submitted, or the last outcome was acknowledged.
    Idle,
    /// A calculation is in flight.
    Running,
    /// The last calculation produced a result.
    Completed {
        /// Time the pipeline took.
        elapsed_ms: u64,
    },
    /// The last calculation produced an error.
    Failed {
        /// The error message.
        error: String,
    },
    /// The last calculation was cancelled.
    Cancelled,
}

/// How requests are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionCapability {
    /// On a dedicated context thread.
    Isolated,
    /// Synchronously on the submitting thread.
    InProcess,
}

struct Shared {
    state: DispatchState,
    generation: u64,
    pending: Option<oneshot::Sender<WorkerResponse>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Delivers a response if it belongs to the current generation.
fn complete(shared: &Mutex<Shared>, generation: u64, response: WorkerResponse) {
    let mut shared = lock(shared);
    if shared.generation != generation {
        debug!(generation, current = shared.generation, "discarded output of a cancelled calculation");
        return;
    }
    let Some(reply) = shared.pending.take() else {
        return;
    };
    shared.state = match &response {
        WorkerResponse::PayrollResult(result) => DispatchState::Completed {
            elapsed_ms: result.elapsed_ms,
        },
        WorkerResponse::PayrollError(error) => DispatchState::Failed {
            error: error.error.clone(),
        },
    };
    if reply.send(response).is_err() {
        debug!(generation, "caller stopped waiting for the result");
    }
}

/// A submitted calculation.
#[derive(Debug)]
pub struct PendingCalculation {
    receiver: oneshot::Receiver<WorkerResponse>,
}

impl PendingCalculation {
    /// Waits for the response.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the calculation was cancelled first.
    pub async fn wait(self) -> EngineResult<WorkerResponse> {
        self.receiver.await.map_err(|_| EngineError::Cancelled)
    }

    /// Blocks the current thread until the response arrives.
    ///
    /// Must not be called from inside an async runtime.
    pub fn wait_blocking(self) -> EngineResult<WorkerResponse> {
        self.receiver.blocking_recv().map_err(|_| EngineError::Cancelled)
    }

    /// Returns the response if it has arrived, without waiting.
    pub fn try_result(&mut self) -> Option<EngineResult<WorkerResponse>> {
        match self.receiver.try_recv() {
            Ok(response) => Some(Ok(response)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(EngineError::Cancelled)),
        }
    }
}

/// Dispatches payroll requests to an execution context.
///
/// # Example
///
/// ```
/// use payroll_engine::config::EngineSettings;
/// use payroll_engine::dispatcher::{DispatchState, WorkerDispatcher, WorkerRequest};
///
/// # #[tokio::main]
/// # async fn main() {
/// let dispatcher = WorkerDispatcher::new(EngineSettings::default());
/// let request = WorkerRequest::from_json(
///     r#"{"type":"CALCULATE_PAYROLL","payload":{"startDate":"2025-01-01","endDate":"2025-01-31"}}"#,
/// )
/// .unwrap();
///
/// let response = dispatcher.run(request).await.unwrap();
/// assert!(response.is_result());
/// assert!(matches!(dispatcher.state(), DispatchState::Completed { .. }));
/// # }
/// ```
pub struct WorkerDispatcher {
    executor: Arc<dyn PayrollExecutor>,
    settings: EngineSettings,
    shared: Arc<Mutex<Shared>>,
    context: Mutex<Option<ExecutionContext>>,
}

impl WorkerDispatcher {
    /// Creates a dispatcher running the standard pipeline.
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_executor(settings, Arc::new(PipelineExecutor))
    }

    /// Creates a dispatcher running a custom executor on a context thread.
    ///
    /// Falls back to in-process execution when the thread cannot be started.
    pub fn with_executor(settings: EngineSettings, executor: Arc<dyn PayrollExecutor>) -> Self {
        let dispatcher = Self::in_process(settings, executor);
        let context = dispatcher.provision();
        *lock(&dispatcher.context) = context;
        dispatcher
    }

    /// Creates a dispatcher that runs every request on the submitting thread.
    pub fn in_process(settings: EngineSettings, executor: Arc<dyn PayrollExecutor>) -> Self {
        Self {
            executor,
            settings,
            shared: Arc::new(Mutex::new(Shared {
                state: DispatchState::Idle,
                generation: 0,
                pending: None,
            })),
            context: Mutex::new(None),
        }
    }

    fn provision(&self) -> Option<ExecutionContext> {
        let shared = Arc::clone(&self.shared);
        let on_complete: Completion = Arc::new(move |generation, response| {
            complete(&shared, generation, response);
        });
        match ExecutionContext::spawn(Arc::clone(&self.executor), self.settings.clone(), on_complete) {
            Ok(context) => {
                debug!(context = context.name(), "execution context provisioned");
                Some(context)
            }
            Err(e) => {
                warn!(error = %e, "could not start execution context, running in process");
                None
            }
        }
    }

    /// How requests are currently executed.
    pub fn capability(&self) -> ExecutionCapability {
        if lock(&self.context).is_some() {
            ExecutionCapability::Isolated
        } else {
            ExecutionCapability::InProcess
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> DispatchState {
        lock(&self.shared).state.clone()
    }

    /// Submits a request.
    ///
    /// # Errors
    ///
    /// Returns `CalculationInProgress` while another calculation is running.
    pub fn submit(&self, request: WorkerRequest) -> EngineResult<PendingCalculation> {
        let (reply, receiver) = oneshot::channel();
        let generation = {
            let mut shared = lock(&self.shared);
            if shared.state == DispatchState::Running {
                return Err(EngineError::CalculationInProgress);
            }
            shared.state = DispatchState::Running;
            shared.generation += 1;
            shared.pending = Some(reply);
            shared.generation
        };

        let job = Job { request, generation };
        let undelivered = match lock(&self.context).as_ref() {
            Some(context) => context.send(job).err(),
            None => Some(job),
        };

        if let Some(job) = undelivered {
            if self.capability() == ExecutionCapability::Isolated {
                warn!("execution context stopped, replacing it and running this request in process");
                let fresh = self.provision();
                *lock(&self.context) = fresh;
            }
            let response = handle_request(self.executor.as_ref(), job.request, &self.settings);
            complete(&self.shared, job.generation, response);
        }

        Ok(PendingCalculation { receiver })
    }

    /// Returns the current state and, if the last calculation has finished,
    /// moves the dispatcher back to `Idle`.
    ///
    /// A running calculation is left alone.
    pub fn acknowledge(&self) -> DispatchState {
        let mut shared = lock(&self.shared);
        match shared.state {
            DispatchState::Idle | DispatchState::Running => shared.state.clone(),
            _ => std::mem::replace(&mut shared.state, DispatchState::Idle),
        }
    }

    /// Submits a request and waits for its response.
    pub async fn run(&self, request: WorkerRequest) -> EngineResult<WorkerResponse> {
        self.submit(request)?.wait().await
    }

    /// Cancels the running calculation.
    ///
    /// The execution context is abandoned and a fresh one provisioned at
    /// once. The cancelled request's waiter receives `Cancelled`; output the
    /// abandoned context produces later is discarded. Returns false if
    /// nothing was running.
    pub fn cancel(&self) -> bool {
        {
            let mut shared = lock(&self.shared);
            if shared.state != DispatchState::Running {
                return false;
            }
            shared.pending = None;
            shared.generation += 1;
            shared.state = DispatchState::Cancelled;
        }

        let mut context = lock(&self.context);
        if context.is_some() {
            let abandoned = context.take();
            *context = self.provision();
            drop(abandoned);
        }
        info!("payroll calculation cancelled");
        true
    }
}

impl std::fmt::Debug for WorkerDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerDispatcher")
            .field("state", &self.state())
            .field("capability", &self.capability())
            .finish()
    }
}
