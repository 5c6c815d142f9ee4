//! Evidex Core Library
//!
//! Concurrent parsing of forensic evidence into a searchable case index.
//!
//! # Features
//! - Parser registry mapping file extensions to parser capabilities
//! - Per-file completion tracking across concurrently running parsers
//! - Sequential orchestration over a file set with cancellation
//! - SQLite case store with FTS5 full-text search over extracted records

pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod orchestrator;
pub mod parser;

pub use config::{Config, ParsersConfig, ScanConfig};
pub use db::{list_cases, remove_case, CaseInfo, CaseStats, CaseStore, RecordHit, TagInfo};
pub use error::{EvidexError, Error, Result};
pub use index::{Index, Record, RecordKind};
pub use orchestrator::{
    progress_channel, CompletionSignal, CompletionTracker, DoneMessage, DoneStatus, FileSet,
    Orchestrator, ParseFinished, ProgressEvent, ProgressReceiver, ProgressSender, RunSummary,
    SignalOutcome, TaskId, TaskRegistry,
};
pub use parser::{
    EmlParser, ExtractionContext, MboxParser, ParserCapability, ParserRegistry, TextParser,
};

/// Default data directory name
pub const DATA_DIR_NAME: &str = "evidex";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "evidex";
