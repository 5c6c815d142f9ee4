//! Plain text document parser

use super::{read_file, ExtractionContext, ParserCapability};
use crate::error::Result;
use crate::index::{Record, RecordKind};
use std::path::Path;

/// One document record per file
pub struct TextParser;

impl TextParser {
    pub fn new() -> Self {
        Self
    }

    /// Keep printable ASCII from binary data
    fn extract_printable(bytes: &[u8]) -> String {
        bytes
            .iter()
            .filter(|&&b| b.is_ascii_graphic() || b.is_ascii_whitespace())
            .map(|&b| b as char)
            .collect()
    }
}

impl Default for TextParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ParserCapability for TextParser {
    fn name(&self) -> &str {
        "text"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "log", "csv", "md"]
    }

    async fn parse(
        &self,
        file: &Path,
        ctx: ExtractionContext,
        _expected_files: usize,
    ) -> Result<()> {
        let bytes = read_file(file).await?;

        let is_utf8 = std::str::from_utf8(&bytes).is_ok();
        let body = if is_utf8 {
            String::from_utf8_lossy(&bytes).into_owned()
        } else {
            Self::extract_printable(&bytes)
        };

        let title = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let record = Record::new(self.name(), file, "0", RecordKind::Document)
            .with_subject(title)
            .with_metadata("size_bytes", bytes.len().to_string())
            .with_metadata("line_count", body.lines().count().to_string())
            .with_metadata("utf8", is_utf8.to_string())
            .with_body(body);

        ctx.add_record(record);
        ctx.report_complete()?;
        Ok(())
    }
}
