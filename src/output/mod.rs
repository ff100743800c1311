//! Output module for presenting job results
//!
//! This module handles:
//! - The serialized per-job report returned to callers
//! - HTML views for the link-extraction pages
//! - Record store statistics for the CLI

pub mod html;
pub mod stats;

pub use stats::{load_statistics, print_statistics, StoreStatistics};

use crate::state::TaskState;
use crate::storage::{ErrorRecord, LinkRecord};
use serde::Serialize;
use uuid::Uuid;

/// Ordered records produced by one job
///
/// Serializes as `{ "job_id", "status", "results": [...], "size" }` where
/// `size` always equals the number of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report<T> {
    pub job_id: Uuid,
    pub status: TaskState,
    pub results: Vec<T>,
    pub size: usize,
}

pub type ErrorReport = Report<ErrorRecord>;
pub type LinkReport = Report<LinkRecord>;

impl<T: Serialize> Report<T> {
    pub fn new(job_id: Uuid, status: TaskState, results: Vec<T>) -> Self {
        let size = results.len();
        Self {
            job_id,
            status,
            results,
            size,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
