//! Storage traits and error types
//!
//! This module defines the trait interface for record store backends and
//! associated error types.

use crate::storage::{ErrorRecord, LinkRecord, NewError, NewLink};
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for record store implementations
///
/// Workers for different jobs write concurrently and the aggregator reads,
/// so implementations must be shareable across threads. Writes are
/// append-only; there is no update-in-place.
pub trait RecordStore: Send + Sync {
    // ===== Writes =====

    /// Appends a link record, returning its row id
    fn insert_link(&self, link: &NewLink) -> StorageResult<i64>;

    /// Appends a grammar-error record, returning its row id
    ///
    /// Rejects `error_line_number == 0` and keeps at most
    /// [`MAX_CORRECTIONS`](crate::storage::MAX_CORRECTIONS) corrections.
    fn insert_error(&self, error: &NewError) -> StorageResult<i64>;

    // ===== Per-job reads =====

    /// Links written for a job, most recently inserted first
    fn links_for_job(&self, job_id: Uuid) -> StorageResult<Vec<LinkRecord>>;

    /// Errors written for a job, by ascending line number then insertion order
    fn errors_for_job(&self, job_id: Uuid) -> StorageResult<Vec<ErrorRecord>>;

    // ===== Statistics =====

    /// Counts all stored link records
    fn count_links(&self) -> StorageResult<u64>;

    /// Counts all stored error records
    fn count_errors(&self) -> StorageResult<u64>;

    /// Counts distinct job ids with at least one record
    fn count_jobs(&self) -> StorageResult<u64>;

    // ===== Garbage collection =====

    /// Deletes every record created before `cutoff`, returning how many went
    fn purge_before(&self, cutoff: DateTime<Utc>) -> StorageResult<usize>;
}
