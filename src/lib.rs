//! Sitelint: asynchronous link extraction and grammar checking for web pages
//!
//! This crate submits crawl/analysis jobs to a worker pool, polls them until
//! they reach a terminal state, and aggregates the records the workers wrote
//! (extracted hyperlinks or grammar/spelling matches) keyed by job identifier.

pub mod config;
pub mod job;
pub mod output;
pub mod pool;
pub mod robots;
pub mod server;
pub mod state;
pub mod storage;
pub mod worker;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Sitelint operations
#[derive(Debug, Error)]
pub enum SitelintError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Job error: {0}")]
    Job(#[from] JobError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Worker pool error: {0}")]
    Pool(#[from] pool::PoolError),

    #[error("Worker error: {0}")]
    Worker(#[from] worker::WorkerError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors surfaced by job dispatch, polling and aggregation
#[derive(Debug, Error)]
pub enum JobError {
    /// Missing or malformed input; nothing was submitted
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The worker pool could not be reached or refused the submission
    #[error("Worker pool unavailable: {0}")]
    DispatchUnavailable(String),

    /// The handle is stale or the pool has discarded the task
    #[error("Unknown task: {task_id}")]
    UnknownTask { task_id: String },

    /// The task reached the terminal failed state
    #[error("Task {task_id} for job {job_id} failed")]
    WorkerFailure { task_id: String, job_id: uuid::Uuid },

    /// The poll loop gave up before the task reached a terminal state
    #[error("Timed out after {waited:?} waiting for task {task_id}")]
    PollTimeout { task_id: String, waited: Duration },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Result type alias for Sitelint operations
pub type Result<T> = std::result::Result<T, SitelintError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for job operations
pub type JobResult<T> = std::result::Result<T, JobError>;

// Re-export commonly used types
pub use config::Config;
pub use job::{Aggregator, Dispatcher, JobService, PollPolicy, Poller, TaskHandle, TaskRequest};
pub use state::TaskState;
pub use storage::{ErrorRecord, LinkRecord, RecordStore, SqliteStore};
