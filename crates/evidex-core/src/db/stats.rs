//! Case statistics

use super::CaseStore;
use crate::error::Result;
use std::collections::BTreeMap;

/// Case stats
#[derive(Debug, Clone, serde::Serialize)]
pub struct CaseStats {
    pub record_count: usize,
    pub bookmark_count: usize,
    pub tag_count: usize,
    pub source_count: usize,
    pub by_parser: BTreeMap<String, usize>,
}

impl CaseStore {
    /// Get case statistics
    pub fn stats(&self) -> Result<CaseStats> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        let mut stmt = self
            .conn
            .prepare("SELECT parser, COUNT(*) FROM records GROUP BY parser ORDER BY parser")?;
        let by_parser = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;

        Ok(CaseStats {
            record_count: count("SELECT COUNT(*) FROM records")?,
            bookmark_count: count("SELECT COUNT(*) FROM bookmarks")?,
            tag_count: count("SELECT COUNT(*) FROM tags")?,
            source_count: count("SELECT COUNT(*) FROM case_sources")?,
            by_parser,
        })
    }

    /// Vacuum the store
    pub fn vacuum(&self) -> Result<()> {
        self.conn.execute("VACUUM", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Record, RecordKind};
    use std::path::Path;

    #[test]
    fn test_stats() {
        let store = CaseStore::open_in_memory().unwrap();
        store.initialize().unwrap();

        store
            .insert_records(&[
                Record::new("eml", Path::new("/a.eml"), "0", RecordKind::Email),
                Record::new("mbox", Path::new("/b.mbox"), "0", RecordKind::Email),
                Record::new("mbox", Path::new("/b.mbox"), "1", RecordKind::Email),
            ])
            .unwrap();
        store.add_bookmark("x").unwrap();
        store.set_tag("y", "hot").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.record_count, 3);
        assert_eq!(stats.bookmark_count, 1);
        assert_eq!(stats.tag_count, 1);
        assert_eq!(stats.source_count, 0);
        assert_eq!(stats.by_parser.get("mbox"), Some(&2));
    }
}
