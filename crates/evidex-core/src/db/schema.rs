//! Case store schema and initialization

use crate::error::Result;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// Handle to a single case's SQLite store
pub struct CaseStore {
    pub(crate) conn: Connection,
}

const SCHEMA_VERSION: i32 = 1;

/// File name of the store inside a case directory
pub const CASE_DB_FILE: &str = "case.sqlite";

const CREATE_TABLES: &str = r#"
-- Case metadata (single row)
CREATE TABLE IF NOT EXISTS case_info (
    name TEXT PRIMARY KEY,
    description TEXT,
    investigator TEXT,
    created_at TEXT NOT NULL
);

-- Evidence sources added to the case
CREATE TABLE IF NOT EXISTS case_sources (
    path TEXT PRIMARY KEY,
    added_at TEXT NOT NULL
);

-- Bookmarked record ids
CREATE TABLE IF NOT EXISTS bookmarks (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
);

-- One tag per record id
CREATE TABLE IF NOT EXISTS tags (
    id TEXT PRIMARY KEY,
    tag TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Extracted records
CREATE TABLE IF NOT EXISTS records (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    source_file TEXT NOT NULL,
    parser TEXT NOT NULL,
    kind TEXT NOT NULL,
    subject TEXT,
    sender TEXT,
    recipients TEXT,
    sent_at TEXT,
    body TEXT NOT NULL DEFAULT '',
    metadata TEXT,
    indexed_at TEXT NOT NULL
);

-- Full-text search index over records
CREATE VIRTUAL TABLE IF NOT EXISTS records_fts USING fts5(
    subject,
    sender,
    recipients,
    body,
    tokenize='porter unicode61'
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_records_parser ON records(parser);
CREATE INDEX IF NOT EXISTS idx_records_source ON records(source_file);
CREATE INDEX IF NOT EXISTS idx_tags_tag ON tags(tag);
"#;

const CREATE_TRIGGERS: &str = r#"
CREATE TRIGGER IF NOT EXISTS records_ai
AFTER INSERT ON records
BEGIN
    INSERT INTO records_fts(rowid, subject, sender, recipients, body)
    VALUES (new.seq, new.subject, new.sender, new.recipients, new.body);
END;

CREATE TRIGGER IF NOT EXISTS records_ad
AFTER DELETE ON records
BEGIN
    DELETE FROM records_fts WHERE rowid = old.seq;
END;
"#;

impl CaseStore {
    /// Open store at path, creating if necessary
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Location of a case's store under `cases_dir`
    pub fn path_for(cases_dir: &Path, case_name: &str) -> PathBuf {
        cases_dir.join(case_name).join(CASE_DB_FILE)
    }

    /// Bootstrap the schema. Must run once before any parsing touches the case.
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        self.conn.execute_batch(CREATE_TABLES)?;
        self.conn.execute_batch(CREATE_TRIGGERS)?;

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let version = self
            .conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok();
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_creates_required_tables() {
        let store = CaseStore::open_in_memory().unwrap();
        store.initialize().unwrap();

        for table in ["bookmarks", "tags", "records", "records_fts", "case_info"] {
            let exists: bool = store
                .conn
                .query_row(
                    "SELECT COUNT(*) > 0 FROM sqlite_master WHERE name = ?1",
                    params![table],
                    |row| row.get(0),
                )
                .unwrap();
            assert!(exists, "{} should exist", table);
        }
        assert_eq!(store.schema_version().unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let store = CaseStore::open_in_memory().unwrap();
        store.initialize().unwrap();
        store.initialize().unwrap();
        assert_eq!(store.schema_version().unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_path_for() {
        let path = CaseStore::path_for(Path::new("/cases"), "acme");
        assert_eq!(path, PathBuf::from("/cases/acme/case.sqlite"));
    }
}
