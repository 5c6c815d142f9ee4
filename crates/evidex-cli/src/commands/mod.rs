//! CLI command handlers

pub mod bookmark;
pub mod case;
pub mod parse;
pub mod parsers;
pub mod search;
pub mod status;
pub mod tag;

use anyhow::{bail, Result};
use evidex_core::{CaseStore, Config};

/// Open an existing case from the configured cases directory
pub(crate) fn open_case(config: &Config, name: &str) -> Result<CaseStore> {
    Ok(CaseStore::open_case(&config.cases_dir, name)?)
}

/// Resolve a full record id or unique prefix to the full id
pub(crate) fn resolve_record(store: &CaseStore, id: &str) -> Result<String> {
    match store.get_record(id)? {
        Some(record) => Ok(record.id),
        None => bail!("No record matches '{}' (unknown or ambiguous id)", id),
    }
}
