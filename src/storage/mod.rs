//! Storage module for persisting worker output
//!
//! This module handles all record persistence, including:
//! - SQLite database initialization and schema management
//! - Append-only link and grammar-error records tagged by job id
//! - Ordered per-job reads for aggregation
//! - Timestamp-based garbage collection of old jobs

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{RecordStore, StorageError, StorageResult};

use serde::Serialize;
use url::Url;
use uuid::Uuid;

/// Maximum number of suggested replacements kept per error
pub const MAX_CORRECTIONS: usize = 5;

/// A hyperlink extracted from a page, as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    #[serde(skip)]
    pub id: i64,
    pub text: String,
    /// Always absolute
    pub url: String,
    pub job_id: Uuid,
    #[serde(skip)]
    pub created_at: String,
}

/// A grammar or spelling match, as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    #[serde(skip)]
    pub id: i64,
    pub message: String,
    pub error_sentence: String,
    pub error_term: String,
    /// 1-indexed line of the fetched page the match was found on
    pub error_line_number: u32,
    pub page_url: String,
    pub possible_corrections: Vec<String>,
    pub job_id: Uuid,
    #[serde(skip)]
    pub created_at: String,
}

/// A link about to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub job_id: Uuid,
    pub text: String,
    pub url: Url,
}

/// A grammar match about to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewError {
    pub job_id: Uuid,
    pub message: String,
    pub error_sentence: String,
    pub error_term: String,
    pub error_line_number: u32,
    pub page_url: String,
    pub possible_corrections: Vec<String>,
}
