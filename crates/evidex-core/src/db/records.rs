//! Record storage and full-text search

use super::CaseStore;
use crate::error::Result;
use crate::index::{Record, RecordKind};
use chrono::Utc;
use rusqlite::{params, Row};
use std::collections::BTreeMap;

/// Full-text search hit
#[derive(Debug, Clone, serde::Serialize)]
pub struct RecordHit {
    pub id: String,
    pub kind: String,
    pub parser: String,
    pub source_file: String,
    pub subject: Option<String>,
    pub sender: Option<String>,
    pub snippet: String,
    pub score: f64,
}

impl CaseStore {
    /// Insert records in one transaction, skipping ids that already exist.
    /// Returns the number of records actually inserted.
    pub fn insert_records(&self, records: &[Record]) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO records
                 (id, source_file, parser, kind, subject, sender, recipients, sent_at, body, metadata, indexed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for record in records {
                let metadata = if record.metadata.is_empty() {
                    None
                } else {
                    Some(serde_json::to_string(&record.metadata)?)
                };
                let recipients = if record.recipients.is_empty() {
                    None
                } else {
                    Some(record.recipients.join(", "))
                };
                inserted += stmt.execute(params![
                    record.id,
                    record.source_file,
                    record.parser,
                    record.kind.as_str(),
                    record.subject,
                    record.sender,
                    recipients,
                    record.sent_at,
                    record.body,
                    metadata,
                    now
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    pub fn record_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get a record by full id or unique id prefix
    pub fn get_record(&self, id: &str) -> Result<Option<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, source_file, parser, kind, subject, sender, recipients, sent_at, body, metadata
             FROM records WHERE id LIKE ?1 || '%' LIMIT 2",
        )?;
        let mut rows = stmt
            .query_map(params![id], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Ambiguous prefixes resolve to nothing
        if rows.len() == 1 {
            Ok(rows.pop())
        } else {
            Ok(None)
        }
    }

    /// BM25-ranked search over subject, sender, recipients and body
    pub fn search_records(&self, query: &str, limit: usize) -> Result<Vec<RecordHit>> {
        let fts_query = to_fts_query(query);
        if fts_query.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            "SELECT r.id, r.kind, r.parser, r.source_file, r.subject, r.sender,
                    snippet(records_fts, 3, '[', ']', '...', 12),
                    -bm25(records_fts) AS score
             FROM records_fts
             JOIN records r ON r.seq = records_fts.rowid
             WHERE records_fts MATCH ?1
             ORDER BY score DESC
             LIMIT ?2",
        )?;

        let results = stmt
            .query_map(params![fts_query, limit as i64], |row| {
                Ok(RecordHit {
                    id: row.get(0)?,
                    kind: row.get(1)?,
                    parser: row.get(2)?,
                    source_file: row.get(3)?,
                    subject: row.get(4)?,
                    sender: row.get(5)?,
                    snippet: row.get(6)?,
                    score: row.get(7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<Record> {
    let kind: String = row.get(3)?;
    let recipients: Option<String> = row.get(6)?;
    let metadata: Option<String> = row.get(9)?;

    Ok(Record {
        id: row.get(0)?,
        source_file: row.get(1)?,
        parser: row.get(2)?,
        kind: kind.parse().unwrap_or(RecordKind::Document),
        subject: row.get(4)?,
        sender: row.get(5)?,
        recipients: recipients
            .map(|r| r.split(", ").map(str::to_string).collect())
            .unwrap_or_default(),
        sent_at: row.get(7)?,
        body: row.get(8)?,
        metadata: metadata
            .and_then(|m| serde_json::from_str::<BTreeMap<String, String>>(&m).ok())
            .unwrap_or_default(),
    })
}

/// Quote each whitespace-separated term so user input never hits FTS5 syntax
fn to_fts_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}
