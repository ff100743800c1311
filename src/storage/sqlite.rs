//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use crate::storage::{ErrorRecord, LinkRecord, NewError, NewLink, MAX_CORRECTIONS};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// SQLite record store
///
/// The connection sits behind a mutex so one store can be shared by every
/// worker task and request handler.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a record store at the given path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Database opened with WAL enabled and the schema in place
    /// * `Err(StorageError)` - Failed to open the file or create the tables
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory record store
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("connection mutex poisoned".to_string()))
    }
}

/// Timestamps are fixed-width so they order correctly as text
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn job_id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn corrections_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl RecordStore for SqliteStore {
    // ===== Writes =====

    fn insert_link(&self, link: &NewLink) -> StorageResult<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO links (job_id, text, url, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                link.job_id.to_string(),
                link.text,
                link.url.as_str(),
                timestamp(Utc::now())
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn insert_error(&self, error: &NewError) -> StorageResult<i64> {
        if error.error_line_number < 1 {
            return Err(StorageError::ConstraintViolation(format!(
                "error_line_number must be >= 1 for job {}",
                error.job_id
            )));
        }

        let corrections: Vec<&String> = error
            .possible_corrections
            .iter()
            .take(MAX_CORRECTIONS)
            .collect();
        let corrections = serde_json::to_string(&corrections)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO matched_errors
             (job_id, message, error_term, possible_corrections, error_sentence,
              error_line_number, page_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                error.job_id.to_string(),
                error.message,
                error.error_term,
                corrections,
                error.error_sentence,
                error.error_line_number,
                error.page_url,
                timestamp(Utc::now())
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // ===== Per-job reads =====

    fn links_for_job(&self, job_id: Uuid) -> StorageResult<Vec<LinkRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, job_id, text, url, created_at FROM links
             WHERE job_id = ?1 ORDER BY id DESC",
        )?;

        let links = stmt
            .query_map(params![job_id.to_string()], |row| {
                Ok(LinkRecord {
                    id: row.get(0)?,
                    job_id: job_id_column(row, 1)?,
                    text: row.get(2)?,
                    url: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn errors_for_job(&self, job_id: Uuid) -> StorageResult<Vec<ErrorRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, job_id, message, error_term, possible_corrections, error_sentence,
             error_line_number, page_url, created_at
             FROM matched_errors WHERE job_id = ?1
             ORDER BY error_line_number ASC, id ASC",
        )?;

        let errors = stmt
            .query_map(params![job_id.to_string()], |row| {
                Ok(ErrorRecord {
                    id: row.get(0)?,
                    job_id: job_id_column(row, 1)?,
                    message: row.get(2)?,
                    error_term: row.get(3)?,
                    possible_corrections: corrections_column(row, 4)?,
                    error_sentence: row.get(5)?,
                    error_line_number: row.get(6)?,
                    page_url: row.get(7)?,
                    created_at: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(errors)
    }

    // ===== Statistics =====

    fn count_links(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_errors(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn()?
                .query_row("SELECT COUNT(*) FROM matched_errors", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_jobs(&self) -> StorageResult<u64> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM (
                SELECT job_id FROM links
                UNION
                SELECT job_id FROM matched_errors
            )",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Garbage collection =====

    fn purge_before(&self, cutoff: DateTime<Utc>) -> StorageResult<usize> {
        let cutoff = timestamp(cutoff);
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let links = tx.execute("DELETE FROM links WHERE created_at < ?1", params![cutoff])?;
        let errors = tx.execute(
            "DELETE FROM matched_errors WHERE created_at < ?1",
            params![cutoff],
        )?;
        tx.commit()?;
        Ok(links + errors)
    }
}
