//! RFC 822 message parser (`.eml`)

use super::{read_file, ExtractionContext, ParserCapability};
use crate::error::{EvidexError, Result};
use crate::index::{Record, RecordKind};
use std::path::Path;

/// Single message per file
pub struct EmlParser;

impl EmlParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ParserCapability for EmlParser {
    fn name(&self) -> &str {
        "eml"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["eml"]
    }

    async fn parse(
        &self,
        file: &Path,
        ctx: ExtractionContext,
        _expected_files: usize,
    ) -> Result<()> {
        let bytes = read_file(file).await?;
        let text = String::from_utf8_lossy(&bytes);

        let message = Message::parse(&text);
        if message.headers.is_empty() {
            return Err(EvidexError::parse(
                self.name(),
                file,
                "no message headers found",
            ));
        }

        ctx.add_record(message.into_record(self.name(), file, "0"));
        ctx.report_complete()?;
        Ok(())
    }
}

/// Parsed header block and body of one message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Message {
    /// Split `raw` into headers and body. Folded header lines are unfolded.
    pub fn parse(raw: &str) -> Self {
        let mut headers: Vec<(String, String)> = Vec::new();
        let mut lines = raw.lines();
        let mut body_lines = Vec::new();

        for line in lines.by_ref() {
            if line.trim().is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                // Continuation of the previous header
                if let Some((_, value)) = headers.last_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                    continue;
                }
            }

            match line.split_once(':') {
                Some((name, value)) if is_header_name(name) => {
                    headers.push((name.to_string(), value.trim().to_string()));
                }
                _ => {
                    // Malformed header block: the rest is body
                    body_lines.push(line);
                    break;
                }
            }
        }

        body_lines.extend(lines);
        Self {
            headers,
            body: body_lines.join("\n").trim_end().to_string(),
        }
    }

    /// First value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Addresses from To and Cc
    pub fn recipients(&self) -> Vec<String> {
        ["To", "Cc"]
            .iter()
            .filter_map(|h| self.header(h))
            .flat_map(|v| v.split(','))
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect()
    }

    /// Convert into an email record
    pub fn into_record(self, parser: &str, file: &Path, local_key: &str) -> Record {
        let mut record = Record::new(parser, file, local_key, RecordKind::Email)
            .with_recipients(self.recipients());

        if let Some(subject) = self.header("Subject") {
            record = record.with_subject(subject);
        }
        if let Some(from) = self.header("From") {
            record = record.with_sender(from);
        }
        if let Some(date) = self.header("Date") {
            record = record.with_sent_at(date);
        }
        if let Some(id) = self.header("Message-ID") {
            record = record.with_metadata("message_id", id);
        }
        if let Some(reply_to) = self.header("In-Reply-To") {
            record = record.with_metadata("in_reply_to", reply_to);
        }

        record.with_body(self.body)
    }
}

fn is_header_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && b != b':')
}
