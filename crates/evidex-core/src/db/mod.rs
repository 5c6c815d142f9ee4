//! Case store
//!
//! One SQLite database per case holding:
//! - case metadata and registered evidence sources
//! - bookmarks and tags
//! - extracted records with an FTS5 index

mod bookmarks;
mod cases;
mod records;
mod schema;
mod stats;

pub use bookmarks::TagInfo;
pub use cases::{list_cases, remove_case, CaseInfo};
pub use records::RecordHit;
pub use schema::{CaseStore, CASE_DB_FILE};
pub use stats::CaseStats;
