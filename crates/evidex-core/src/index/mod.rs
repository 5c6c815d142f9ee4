//! Shared record index
//!
//! Every parser running during a parse run appends into the same [`Index`].
//! Synchronization lives inside the index: callers share an `Arc<Index>` and
//! never lock anything themselves. The buffered records are written to the
//! case store in one transaction by [`Index::commit`].

mod record;

pub use record::{Record, RecordKind};

use crate::db::CaseStore;
use crate::error::Result;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Append-only, concurrently writable record sink for one parse run
#[derive(Debug)]
pub struct Index {
    case_name: String,
    records: Mutex<Vec<Record>>,
}

impl Index {
    pub fn new(case_name: impl Into<String>) -> Self {
        Self {
            case_name: case_name.into(),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn case_name(&self) -> &str {
        &self.case_name
    }

    /// Append a record
    pub fn add(&self, record: Record) {
        self.lock().push(record);
    }

    /// Append several records under one lock acquisition
    pub fn extend(&self, records: impl IntoIterator<Item = Record>) {
        self.lock().extend(records);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of everything appended so far
    pub fn snapshot(&self) -> Vec<Record> {
        self.lock().clone()
    }

    /// Record counts keyed by parser name
    pub fn records_by_parser(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in self.lock().iter() {
            *counts.entry(record.parser.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Write all buffered records to the store, returns how many were new
    pub fn commit(&self, store: &CaseStore) -> Result<usize> {
        let records = self.snapshot();
        let written = store.insert_records(&records)?;
        tracing::info!(
            "Committed {} of {} record(s) to case '{}'",
            written,
            records.len(),
            self.case_name
        );
        Ok(written)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Record>> {
        // A panicking writer leaves a valid Vec behind; keep the data.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    fn record(parser: &str, key: &str) -> Record {
        Record::new(parser, Path::new("/e/x"), key, RecordKind::Document).with_body(key)
    }

    #[test]
    fn test_add_and_counts() {
        let index = Index::new("acme");
        assert!(index.is_empty());

        index.add(record("eml", "1"));
        index.extend(vec![record("text", "1"), record("text", "2")]);

        assert_eq!(index.len(), 3);
        let counts = index.records_by_parser();
        assert_eq!(counts.get("eml"), Some(&1));
        assert_eq!(counts.get("text"), Some(&2));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_are_not_lost() {
        let index = Arc::new(Index::new("acme"));
        let mut handles = Vec::new();

        for writer in 0..8 {
            let index = index.clone();
            handles.push(tokio::spawn(async move {
                for n in 0..250 {
                    index.add(record("text", &format!("{}-{}", writer, n)));
                    if n % 50 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(index.len(), 2000);
    }

    #[test]
    fn test_commit_writes_to_store() {
        let store = CaseStore::open_in_memory().unwrap();
        store.initialize().unwrap();

        let index = Index::new("acme");
        index.add(record("eml", "1"));
        index.add(record("eml", "2"));

        assert_eq!(index.commit(&store).unwrap(), 2);
        // Committing again does not duplicate
        assert_eq!(index.commit(&store).unwrap(), 0);
        assert_eq!(store.record_count().unwrap(), 2);
    }
}
