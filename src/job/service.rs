//! Job orchestration
//!
//! [`JobService`] wires a dispatcher, poller and aggregator around one pool
//! and one record store, and implements the two user-facing flows:
//! - blocking grammar checks (submit, wait, aggregate)
//! - decoupled link extraction (submit now, look up results later)

use crate::config::Config;
use crate::job::{
    Aggregator, Dispatcher, ErrorTaskRequest, LinkTaskRequest, PollPolicy, Poller, Submission,
    TaskHandle, TaskRequest, DEFAULT_LANGUAGE,
};
use crate::output::{ErrorReport, LinkReport};
use crate::pool::{self, WorkerPool};
use crate::state::TaskState;
use crate::storage::{RecordStore, SqliteStore};
use crate::{JobError, JobResult, SitelintError};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

pub struct JobService {
    dispatcher: Dispatcher,
    poller: Poller,
    aggregator: Aggregator,
    policy: PollPolicy,
    default_language: String,
}

impl JobService {
    pub fn new(
        pool: Arc<dyn WorkerPool>,
        queue: impl Into<String>,
        store: Arc<dyn RecordStore>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(Arc::clone(&pool), queue),
            poller: Poller::new(pool),
            aggregator: Aggregator::new(store),
            policy,
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Opens the configured database and builds the configured pool
    ///
    /// # Errors
    ///
    /// Fails if the database cannot be opened or the pool's HTTP client
    /// cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, SitelintError> {
        let store: Arc<dyn RecordStore> =
            Arc::new(SqliteStore::new(Path::new(&config.output.database_path))?);
        Self::with_store(config, store)
    }

    /// Like [`JobService::from_config`] with an already opened store
    pub fn with_store(config: &Config, store: Arc<dyn RecordStore>) -> Result<Self, SitelintError> {
        let pool = pool::from_config(config, Arc::clone(&store))?;
        tracing::info!(
            "Using {:?} worker pool, queue '{}'",
            config.pool.backend,
            config.pool.queue
        );

        Ok(Self::new(
            pool,
            config.pool.queue.clone(),
            store,
            PollPolicy::from_config(&config.polling),
        )
        .with_default_language(&config.checker.default_language))
    }

    pub fn with_default_language(mut self, language: &str) -> Self {
        self.default_language = language.to_string();
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Grammar-checks a page and returns its errors by line number
    ///
    /// Blocks until the task is terminal. A failed task becomes
    /// [`JobError::WorkerFailure`]; its partial records stay readable via
    /// [`Aggregator::error_report`].
    pub async fn check_page(&self, url: &str, language: Option<&str>) -> JobResult<ErrorReport> {
        let language = language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.default_language.as_str());
        let request = ErrorTaskRequest::new(url, Some(language), Uuid::new_v4())?;

        let submission = self.dispatcher.submit(TaskRequest::Errors(request)).await?;
        let state = self.await_success(&submission).await?;
        self.aggregator.error_report(submission.job_id, state)
    }

    /// Extracts a page's links, blocking until the task is terminal
    pub async fn extract_links(&self, url: &str) -> JobResult<LinkReport> {
        let submission = self.submit_links(url).await?;
        let state = self.await_success(&submission).await?;
        self.aggregator.link_report(submission.job_id, state)
    }

    /// Submits a link task without waiting for it
    pub async fn submit_links(&self, url: &str) -> JobResult<Submission> {
        let request = LinkTaskRequest::new(url)?;
        self.dispatcher.submit(TaskRequest::Links(request)).await
    }

    /// Polls once and returns whatever the job has to show
    ///
    /// Pending and running tasks yield an empty report with that status.
    pub async fn link_results(&self, handle: &TaskHandle, job_id: Uuid) -> JobResult<LinkReport> {
        let state = self.poller.poll(handle).await?;
        self.aggregator.link_report(job_id, state)
    }

    /// Single status query for a task on this service's queue
    pub async fn status(&self, task_id: &str) -> JobResult<TaskState> {
        let handle = TaskHandle {
            task_id: task_id.to_string(),
            queue_name: self.dispatcher.queue().to_string(),
        };
        self.poller.poll(&handle).await
    }

    async fn await_success(&self, submission: &Submission) -> JobResult<TaskState> {
        let state = self.poller.wait(&submission.handle, &self.policy).await?;
        if state == TaskState::Failed {
            return Err(JobError::WorkerFailure {
                task_id: submission.handle.task_id.clone(),
                job_id: submission.job_id,
            });
        }
        Ok(state)
    }
}
