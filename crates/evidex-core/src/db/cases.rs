//! Case metadata and source operations

use super::CaseStore;
use crate::error::{EvidexError, Result};
use chrono::Utc;
use rusqlite::params;
use std::path::{Path, PathBuf};

/// Case metadata
#[derive(Debug, Clone, serde::Serialize)]
pub struct CaseInfo {
    pub name: String,
    pub description: Option<String>,
    pub investigator: Option<String>,
    pub created_at: String,
}

impl CaseInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            investigator: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_investigator(mut self, investigator: Option<String>) -> Self {
        self.investigator = investigator;
        self
    }
}

impl CaseStore {
    /// Create a new case on disk and bootstrap its store
    pub fn create(cases_dir: &Path, info: &CaseInfo) -> Result<Self> {
        validate_case_name(&info.name)?;
        let path = Self::path_for(cases_dir, &info.name);
        if path.exists() {
            return Err(EvidexError::CaseExists(info.name.clone()));
        }

        let store = Self::open(&path)?;
        store.initialize()?;
        store.insert_case_info(info)?;
        Ok(store)
    }

    /// Open an existing case
    pub fn open_case(cases_dir: &Path, name: &str) -> Result<Self> {
        validate_case_name(name)?;
        let path = Self::path_for(cases_dir, name);
        if !path.exists() {
            return Err(EvidexError::CaseNotFound(name.to_string()));
        }
        let store = Self::open(&path)?;
        store.initialize()?;
        Ok(store)
    }

    /// Record case metadata (fails if the case already has metadata)
    pub fn insert_case_info(&self, info: &CaseInfo) -> Result<()> {
        if self.case_info()?.is_some() {
            return Err(EvidexError::CaseExists(info.name.clone()));
        }
        self.conn.execute(
            "INSERT INTO case_info (name, description, investigator, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                info.name,
                info.description,
                info.investigator,
                info.created_at
            ],
        )?;
        Ok(())
    }

    /// Get case metadata
    pub fn case_info(&self) -> Result<Option<CaseInfo>> {
        let result = self.conn.query_row(
            "SELECT name, description, investigator, created_at FROM case_info LIMIT 1",
            [],
            |row| {
                Ok(CaseInfo {
                    name: row.get(0)?,
                    description: row.get(1)?,
                    investigator: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        );
        match result {
            Ok(info) => Ok(Some(info)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Register evidence sources, returning how many were new
    pub fn add_sources(&self, sources: &[PathBuf]) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let mut added = 0;
        for source in sources {
            added += self.conn.execute(
                "INSERT OR IGNORE INTO case_sources (path, added_at) VALUES (?1, ?2)",
                params![source.to_string_lossy(), now],
            )?;
        }
        Ok(added)
    }

    /// List registered evidence sources
    pub fn list_sources(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path FROM case_sources ORDER BY path")?;
        let results = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(results)
    }
}

/// List case names under `cases_dir`
pub fn list_cases(cases_dir: &Path) -> Result<Vec<String>> {
    if !cases_dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(cases_dir)? {
        let entry = entry?;
        if entry.path().join(super::schema::CASE_DB_FILE).is_file() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Delete a case directory
pub fn remove_case(cases_dir: &Path, name: &str) -> Result<()> {
    validate_case_name(name)?;
    let dir = cases_dir.join(name);
    if !dir.join(super::schema::CASE_DB_FILE).is_file() {
        return Err(EvidexError::CaseNotFound(name.to_string()));
    }
    std::fs::remove_dir_all(dir)?;
    Ok(())
}

fn validate_case_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' '));
    if valid {
        Ok(())
    } else {
        Err(EvidexError::InvalidInput(format!(
            "invalid case name '{}'",
            name
        )))
    }
}
