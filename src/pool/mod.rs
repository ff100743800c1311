//! Worker pool backends
//!
//! A [`WorkerPool`] accepts named tasks on a queue and reports their state
//! as a raw backend string. Two backends exist:
//! - [`LocalPool`] runs tasks on the current tokio runtime
//! - [`ScrapydPool`] talks to a Scrapyd daemon over HTTP

mod local;
mod scrapyd;

pub use local::LocalPool;
pub use scrapyd::ScrapydPool;

use crate::config::{Config, PoolBackend};
use crate::storage::RecordStore;
use crate::worker::{build_http_client, WorkerContext};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Worker pool failures
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool could not be contacted
    #[error("Worker pool unreachable: {0}")]
    Unreachable(String),

    /// The pool answered but refused the request
    #[error("Worker pool rejected the request: {0}")]
    Rejected(String),

    /// The pool answered with something unparseable
    #[error("Unexpected worker pool response: {0}")]
    Protocol(String),
}

/// A queue-based task executor
#[async_trait]
pub trait WorkerPool: Send + Sync {
    /// Enqueues `task_name` with string parameters, returning the task id
    async fn schedule(
        &self,
        queue: &str,
        task_name: &str,
        params: &[(String, String)],
    ) -> Result<String, PoolError>;

    /// Returns the backend's status string for a task
    ///
    /// An empty string means the pool does not know the task.
    async fn status(&self, queue: &str, task_id: &str) -> Result<String, PoolError>;
}

/// Builds the configured pool backend
///
/// The local backend runs workers in-process and writes to `store`; the
/// Scrapyd backend's workers write wherever the daemon's project points them.
pub fn from_config(
    config: &Config,
    store: Arc<dyn RecordStore>,
) -> crate::Result<Arc<dyn WorkerPool>> {
    match config.pool.backend {
        PoolBackend::Local => {
            let context = WorkerContext::from_config(config, store)?;
            Ok(Arc::new(LocalPool::new(
                &config.pool.queue,
                Arc::new(context),
                config.pool.max_concurrent_tasks as usize,
                config.pool.task_retention,
            )))
        }
        PoolBackend::Scrapyd => {
            let client = build_http_client(
                &config.user_agent,
                Duration::from_secs(config.worker.request_timeout_secs),
            )?;
            let endpoint = Url::parse(&config.pool.endpoint)?;
            Ok(Arc::new(ScrapydPool::new(client, endpoint)))
        }
    }
}
