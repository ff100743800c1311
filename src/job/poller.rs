//! Task state polling

use crate::config::PollingConfig;
use crate::job::TaskHandle;
use crate::pool::{PoolError, WorkerPool};
use crate::state::TaskState;
use crate::{JobError, JobResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How often, and for how long, to poll a task
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    /// `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(50),
            max_interval: Duration::from_secs(2),
            multiplier: 2.0,
            timeout: None,
        }
    }
}

impl PollPolicy {
    /// Polls back-to-back without sleeping
    pub fn tight() -> Self {
        Self {
            initial_interval: Duration::ZERO,
            max_interval: Duration::ZERO,
            multiplier: 1.0,
            timeout: None,
        }
    }

    pub fn from_config(config: &PollingConfig) -> Self {
        Self {
            initial_interval: Duration::from_millis(config.initial_interval_ms),
            max_interval: Duration::from_millis(config.max_interval_ms),
            multiplier: config.multiplier,
            timeout: config.timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Delay before poll number `attempt + 1`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.initial_interval.is_zero() {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX).min(64);
        let secs = self.initial_interval.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = secs.min(self.max_interval.as_secs_f64());
        if capped.is_finite() && capped > 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            self.max_interval
        }
    }
}

/// Queries a pool for task state
pub struct Poller {
    pool: Arc<dyn WorkerPool>,
}

impl Poller {
    pub fn new(pool: Arc<dyn WorkerPool>) -> Self {
        Self { pool }
    }

    /// Single status query
    ///
    /// A status the pool does not recognize, or a rejected query, means the
    /// handle is stale: [`JobError::UnknownTask`].
    pub async fn poll(&self, handle: &TaskHandle) -> JobResult<TaskState> {
        let raw = self
            .pool
            .status(&handle.queue_name, &handle.task_id)
            .await
            .map_err(|e| match e {
                PoolError::Rejected(_) => JobError::UnknownTask {
                    task_id: handle.task_id.clone(),
                },
                other => JobError::DispatchUnavailable(other.to_string()),
            })?;

        TaskState::from_backend(&raw).ok_or_else(|| {
            tracing::debug!("Task {} has unrecognized status {:?}", handle.task_id, raw);
            JobError::UnknownTask {
                task_id: handle.task_id.clone(),
            }
        })
    }

    /// Polls until the task is finished or failed
    pub async fn wait(&self, handle: &TaskHandle, policy: &PollPolicy) -> JobResult<TaskState> {
        let started = Instant::now();
        let mut attempt: u32 = 0;
        let mut last = None;

        loop {
            let state = self.poll(handle).await?;
            if last != Some(state) {
                tracing::debug!("Task {} is {}", handle.task_id, state);
                last = Some(state);
            }
            if state.is_terminal() {
                return Ok(state);
            }

            let mut delay = policy.delay_for(attempt);
            attempt = attempt.saturating_add(1);

            if let Some(timeout) = policy.timeout {
                let waited = started.elapsed();
                if waited >= timeout {
                    tracing::warn!(
                        "Gave up on task {} after {:?} ({})",
                        handle.task_id,
                        waited,
                        state
                    );
                    return Err(JobError::PollTimeout {
                        task_id: handle.task_id.clone(),
                        waited,
                    });
                }
                delay = delay.min(timeout - waited);
            }

            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
        }
    }
}
