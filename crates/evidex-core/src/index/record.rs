//! Extracted record type

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What a record represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Email,
    Attachment,
    Document,
    Folder,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Email => "email",
            RecordKind::Attachment => "attachment",
            RecordKind::Document => "document",
            RecordKind::Folder => "folder",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = crate::error::EvidexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(RecordKind::Email),
            "attachment" => Ok(RecordKind::Attachment),
            "document" => Ok(RecordKind::Document),
            "folder" => Ok(RecordKind::Folder),
            other => Err(crate::error::EvidexError::InvalidInput(format!(
                "unknown record kind '{}'",
                other
            ))),
        }
    }
}

/// A single record extracted from an evidence file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable id derived from parser, source file and the parser's local key
    pub id: String,
    pub source_file: String,
    pub parser: String,
    pub kind: RecordKind,
    pub subject: Option<String>,
    pub sender: Option<String>,
    pub recipients: Vec<String>,
    /// Date as found in the source (RFC 2822 for mail)
    pub sent_at: Option<String>,
    pub body: String,
    pub metadata: BTreeMap<String, String>,
}

impl Record {
    /// Create a record. `local_key` must be unique within (parser, source file).
    pub fn new(parser: &str, source_file: &Path, local_key: &str, kind: RecordKind) -> Self {
        let source_file = source_file.display().to_string();
        Self {
            id: record_id(parser, &source_file, local_key),
            source_file,
            parser: parser.to_string(),
            kind,
            subject: None,
            sender: None,
            recipients: Vec::new(),
            sent_at: None,
            body: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_recipients(mut self, recipients: Vec<String>) -> Self {
        self.recipients = recipients;
        self
    }

    pub fn with_sent_at(mut self, sent_at: impl Into<String>) -> Self {
        self.sent_at = Some(sent_at.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Short id for display (first 8 chars)
    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(8)]
    }
}

fn record_id(parser: &str, source_file: &str, local_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(parser.as_bytes());
    hasher.update([0]);
    hasher.update(source_file.as_bytes());
    hasher.update([0]);
    hasher.update(local_key.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_is_stable_and_scoped() {
        let a = Record::new("eml", Path::new("/e/a.eml"), "0", RecordKind::Email);
        let b = Record::new("eml", Path::new("/e/a.eml"), "0", RecordKind::Email);
        let c = Record::new("text", Path::new("/e/a.eml"), "0", RecordKind::Document);
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(a.id.len(), 64);
        assert_eq!(a.short_id().len(), 8);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("email".parse::<RecordKind>().unwrap(), RecordKind::Email);
        assert!("mailbox".parse::<RecordKind>().is_err());
    }
}
