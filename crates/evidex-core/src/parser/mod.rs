//! Parser capabilities
//!
//! A parser declares the file extensions it understands and extracts records
//! from one file per invocation. Built-in parsers:
//! - `eml`: single RFC 822 messages
//! - `mbox`: Unix mailboxes
//! - `text`: plain text documents
//!
//! Every invocation must end with exactly one completion signal, delivered
//! through [`ExtractionContext::report_complete`] or, failing that, when the
//! context is dropped.

use crate::error::Result;
use std::path::Path;

mod context;
pub mod eml;
pub mod mbox;
mod registry;
pub mod text;

pub use context::ExtractionContext;
pub use eml::EmlParser;
pub use mbox::MboxParser;
pub use registry::ParserRegistry;
pub use text::TextParser;

/// Capability trait - all parsers must implement this
#[async_trait::async_trait]
pub trait ParserCapability: Send + Sync {
    /// Parser name, unique within a registry (e.g. "eml", "mbox")
    fn name(&self) -> &str;

    /// Extensions without leading dot, matched case-insensitively
    fn supported_extensions(&self) -> &[&str];

    /// Extract records from `file` into the context's index.
    ///
    /// `expected_files` is the number of files in the current run this parser
    /// will be invoked on, for parsers that batch work across files.
    /// Errors are logged by the caller and still count as completion.
    async fn parse(&self, file: &Path, ctx: ExtractionContext, expected_files: usize)
        -> Result<()>;
}

/// Read a file on the blocking pool
pub(crate) async fn read_file(path: &Path) -> Result<Vec<u8>> {
    let path = path.to_path_buf();
    let bytes = tokio::task::spawn_blocking(move || std::fs::read(path))
        .await
        .map_err(|e| anyhow::anyhow!("file read task failed: {}", e))??;
    Ok(bytes)
}
