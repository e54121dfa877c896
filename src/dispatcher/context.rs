//! A dedicated OS thread that runs payroll requests.
//!
//! The thread pulls jobs from an unbounded channel and hands each response
//! to a completion callback. Dropping the [`ExecutionContext`] closes the
//! channel; the thread exits once any job it is running has finished.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use tokio::sync::mpsc;
use tracing::debug;

use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult};

use super::executor::{PayrollExecutor, handle_request};
use super::protocol::{WorkerRequest, WorkerResponse};

static NEXT_CONTEXT_ID: AtomicUsize = AtomicUsize::new(1);

/// Receives `(generation, response)` when a job finishes.
pub(crate) type Completion = Arc<dyn Fn(u64, WorkerResponse) + Send + Sync>;

/// One request, tagged with the dispatcher generation it belongs to.
pub(crate) struct Job {
    pub(crate) request: WorkerRequest,
    pub(crate) generation: u64,
}

pub(crate) struct ExecutionContext {
    sender: mpsc::UnboundedSender<Job>,
    name: String,
}

impl ExecutionContext {
    /// Starts a context thread.
    pub(crate) fn spawn(
        executor: Arc<dyn PayrollExecutor>,
        settings: EngineSettings,
        on_complete: Completion,
    ) -> EngineResult<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let name = format!(
            "payroll-context-{}",
            NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)
        );

        let thread_name = name.clone();
        thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                debug!(context = %thread_name, "execution context started");
                while let Some(job) = receiver.blocking_recv() {
                    let response = handle_request(executor.as_ref(), job.request, &settings);
                    on_complete(job.generation, response);
                }
                debug!(context = %thread_name, "execution context stopped");
            })
            .map_err(|e| EngineError::Execution {
                message: format!("could not start {}: {}", name, e),
            })?;

        Ok(Self { sender, name })
    }

    /// Queues a job; hands it back if the thread is gone.
    pub(crate) fn send(&self, job: Job) -> Result<(), Job> {
        self.sender.send(job).map_err(|rejected| rejected.0)
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}
