//! Bookmark and tag operations

use super::CaseStore;
use crate::error::Result;
use chrono::Utc;
use rusqlite::params;

/// A tagged record id
#[derive(Debug, Clone, serde::Serialize)]
pub struct TagInfo {
    pub id: String,
    pub tag: String,
    pub created_at: String,
}

impl CaseStore {
    /// Bookmark a record, returns false if it was already bookmarked
    pub fn add_bookmark(&self, id: &str) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let rows = self.conn.execute(
            "INSERT OR IGNORE INTO bookmarks (id, created_at) VALUES (?1, ?2)",
            params![id, now],
        )?;
        Ok(rows > 0)
    }

    /// Remove a bookmark
    pub fn remove_bookmark(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn is_bookmarked(&self, id: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM bookmarks WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// List bookmarked ids, oldest first
    pub fn list_bookmarks(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM bookmarks ORDER BY created_at, id")?;
        let results = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(results)
    }

    /// Tag a record (replaces any previous tag)
    pub fn set_tag(&self, id: &str, tag: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR REPLACE INTO tags (id, tag, created_at) VALUES (?1, ?2, ?3)",
            params![id, tag, now],
        )?;
        Ok(())
    }

    pub fn remove_tag(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM tags WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Get the tag of a record
    pub fn tag_for(&self, id: &str) -> Result<Option<String>> {
        let result = self
            .conn
            .query_row("SELECT tag FROM tags WHERE id = ?1", params![id], |row| {
                row.get(0)
            });
        match result {
            Ok(tag) => Ok(Some(tag)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all tags
    pub fn list_tags(&self) -> Result<Vec<TagInfo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, tag, created_at FROM tags ORDER BY tag, id")?;
        let results = stmt
            .query_map([], |row| {
                Ok(TagInfo {
                    id: row.get(0)?,
                    tag: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CaseStore {
        let store = CaseStore::open_in_memory().unwrap();
        store.initialize().unwrap();
        store
    }

    #[test]
    fn test_bookmarks() {
        let store = store();
        assert!(store.add_bookmark("abc").unwrap());
        assert!(!store.add_bookmark("abc").unwrap());
        assert!(store.is_bookmarked("abc").unwrap());
        assert_eq!(store.list_bookmarks().unwrap(), vec!["abc"]);

        assert!(store.remove_bookmark("abc").unwrap());
        assert!(!store.remove_bookmark("abc").unwrap());
        assert!(!store.is_bookmarked("abc").unwrap());
    }

    #[test]
    fn test_tags_replace() {
        let store = store();
        store.set_tag("abc", "relevant").unwrap();
        store.set_tag("abc", "privileged").unwrap();

        assert_eq!(store.tag_for("abc").unwrap().as_deref(), Some("privileged"));
        assert_eq!(store.list_tags().unwrap().len(), 1);

        assert!(store.remove_tag("abc").unwrap());
        assert_eq!(store.tag_for("abc").unwrap(), None);
    }
}
