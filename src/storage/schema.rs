//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Sitelint record store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Hyperlinks extracted by link tasks
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id TEXT NOT NULL,
    text TEXT NOT NULL DEFAULT '',
    url TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_links_job ON links(job_id);
CREATE INDEX IF NOT EXISTS idx_links_created ON links(created_at);

-- Grammar and spelling matches found by error-checking tasks
CREATE TABLE IF NOT EXISTS matched_errors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id TEXT NOT NULL,
    message TEXT NOT NULL DEFAULT '',
    error_term TEXT NOT NULL,
    possible_corrections TEXT NOT NULL DEFAULT '[]',
    error_sentence TEXT NOT NULL,
    error_line_number INTEGER NOT NULL CHECK (error_line_number >= 1),
    page_url TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_matched_errors_job_line
    ON matched_errors(job_id, error_line_number);
CREATE INDEX IF NOT EXISTS idx_matched_errors_created ON matched_errors(created_at);
"#;

/// Initializes the database schema
///
/// Safe to call on an existing database.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
