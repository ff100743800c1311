//! Job orchestration
//!
//! A job is one worker task plus the records it writes, keyed by a job id.
//! This module handles:
//! - Validating task requests before anything is submitted
//! - Dispatching tasks to a worker pool queue
//! - Polling task state until it is terminal
//! - Aggregating a job's records into an ordered report

mod aggregator;
mod dispatcher;
mod poller;
mod request;
mod service;

pub use aggregator::Aggregator;
pub use dispatcher::Dispatcher;
pub use poller::{PollPolicy, Poller};
pub use request::{ErrorTaskRequest, LinkTaskRequest, TaskRequest, WorkerKind, DEFAULT_LANGUAGE};
pub use service::JobService;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a dispatched task on a pool queue
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle {
    pub task_id: String,
    pub queue_name: String,
}

/// The outcome of a successful dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub job_id: Uuid,
    pub kind: WorkerKind,
    pub handle: TaskHandle,
}
