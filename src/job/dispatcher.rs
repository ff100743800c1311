//! Task submission

use crate::job::{LinkTaskRequest, Submission, TaskHandle, TaskRequest, WorkerKind};
use crate::pool::WorkerPool;
use crate::{JobError, JobResult};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Submits worker tasks to a pool queue
pub struct Dispatcher {
    pool: Arc<dyn WorkerPool>,
    queue: String,
}

impl Dispatcher {
    pub fn new(pool: Arc<dyn WorkerPool>, queue: impl Into<String>) -> Self {
        Self {
            pool,
            queue: queue.into(),
        }
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Enqueues a task and returns its handle
    ///
    /// Link requests without a job id are given a fresh one. Any pool
    /// failure becomes [`JobError::DispatchUnavailable`]; nothing is retried.
    pub async fn submit(&self, request: TaskRequest) -> JobResult<Submission> {
        let (job_id, request) = match request {
            TaskRequest::Links(r) => {
                let job_id = r.job_id.unwrap_or_else(Uuid::new_v4);
                let request = TaskRequest::Links(LinkTaskRequest {
                    job_id: Some(job_id),
                    ..r
                });
                (job_id, request)
            }
            TaskRequest::Errors(r) => (r.job_id, TaskRequest::Errors(r)),
        };
        let kind = request.kind();

        let task_id = self
            .pool
            .schedule(&self.queue, kind.task_name(), &request.to_params())
            .await
            .map_err(|e| {
                tracing::warn!("Failed to dispatch {} for {}: {}", kind, request.url(), e);
                JobError::DispatchUnavailable(e.to_string())
            })?;

        tracing::info!(
            "Dispatched {} task {} for {} (job {})",
            kind,
            task_id,
            request.url(),
            job_id
        );

        Ok(Submission {
            job_id,
            kind,
            handle: TaskHandle {
                task_id,
                queue_name: self.queue.clone(),
            },
        })
    }

    /// Validates untyped parameters, then submits
    ///
    /// Invalid parameters are rejected before the pool is contacted.
    pub async fn submit_params(
        &self,
        kind: WorkerKind,
        params: &HashMap<String, String>,
    ) -> JobResult<Submission> {
        let request = TaskRequest::from_params(kind, params)?;
        self.submit(request).await
    }
}
