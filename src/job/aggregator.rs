//! Per-job result aggregation

use crate::output::{ErrorReport, LinkReport, Report};
use crate::state::TaskState;
use crate::storage::{ErrorRecord, LinkRecord, RecordStore};
use crate::JobResult;
use std::sync::Arc;
use uuid::Uuid;

/// Reads a job's records back out of the store
///
/// Reports are only filled in for terminal states; for a pending or running
/// task the report is empty so callers never see partial output.
pub struct Aggregator {
    store: Arc<dyn RecordStore>,
}

impl Aggregator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Grammar errors, by ascending line number
    pub fn errors(&self, job_id: Uuid) -> JobResult<Vec<ErrorRecord>> {
        Ok(self.store.errors_for_job(job_id)?)
    }

    /// Links, newest first
    pub fn links(&self, job_id: Uuid) -> JobResult<Vec<LinkRecord>> {
        Ok(self.store.links_for_job(job_id)?)
    }

    pub fn error_report(&self, job_id: Uuid, state: TaskState) -> JobResult<ErrorReport> {
        let results = if state.is_terminal() {
            self.errors(job_id)?
        } else {
            Vec::new()
        };
        Ok(Report::new(job_id, state, results))
    }

    pub fn link_report(&self, job_id: Uuid, state: TaskState) -> JobResult<LinkReport> {
        let results = if state.is_terminal() {
            self.links(job_id)?
        } else {
            Vec::new()
        };
        Ok(Report::new(job_id, state, results))
    }
}
