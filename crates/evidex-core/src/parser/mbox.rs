//! Unix mailbox parser (`.mbox`, `.mbx`)

use super::eml::Message;
use super::{read_file, ExtractionContext, ParserCapability};
use crate::error::Result;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One email record per message in the mailbox.
///
/// Keeps a running tally across the mailboxes of one run and logs it once
/// the last expected mailbox is done.
pub struct MboxParser {
    mailboxes: AtomicUsize,
    messages: AtomicUsize,
}

impl MboxParser {
    pub fn new() -> Self {
        Self {
            mailboxes: AtomicUsize::new(0),
            messages: AtomicUsize::new(0),
        }
    }

    /// Mailboxes parsed since the last batch was flushed
    pub fn pending_mailboxes(&self) -> usize {
        self.mailboxes.load(Ordering::Acquire)
    }

    /// Count one finished mailbox; flush the tally when it is the last one
    /// expected in this run. Returns the flushed totals.
    fn finish_mailbox(&self, messages: usize, expected_files: usize) -> Option<(usize, usize)> {
        let total_messages = self.messages.fetch_add(messages, Ordering::AcqRel) + messages;
        let seen = self.mailboxes.fetch_add(1, Ordering::AcqRel) + 1;
        if seen < expected_files {
            return None;
        }
        self.mailboxes.store(0, Ordering::Release);
        self.messages.store(0, Ordering::Release);
        Some((seen, total_messages))
    }
}

impl Default for MboxParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ParserCapability for MboxParser {
    fn name(&self) -> &str {
        "mbox"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["mbox", "mbx"]
    }

    async fn parse(
        &self,
        file: &Path,
        ctx: ExtractionContext,
        expected_files: usize,
    ) -> Result<()> {
        let bytes = read_file(file).await?;
        let text = String::from_utf8_lossy(&bytes);

        let mut count = 0;
        for (position, entry) in split_mailbox(&text).into_iter().enumerate() {
            if ctx.is_cancelled() {
                tracing::debug!(
                    "Stopping mbox parse of {} after {} message(s): cancelled",
                    file.display(),
                    count
                );
                break;
            }

            let record = Message::parse(&entry.raw)
                .into_record(self.name(), file, &position.to_string())
                .with_metadata("mbox_index", position.to_string());
            let record = match entry.envelope {
                Some(envelope) => record.with_metadata("envelope", envelope),
                None => record,
            };
            ctx.add_record(record);
            count += 1;
        }

        tracing::debug!("Extracted {} message(s) from {}", count, file.display());
        if let Some((mailboxes, messages)) = self.finish_mailbox(count, expected_files) {
            tracing::info!(
                "Parsed {} mailbox(es) into '{}': {} message(s)",
                mailboxes,
                ctx.case_name(),
                messages
            );
        }
        ctx.report_complete()?;
        Ok(())
    }
}

/// One message cut out of a mailbox
#[derive(Debug, Clone, PartialEq)]
pub struct MailboxEntry {
    /// The `From ` separator line, without the leading "From "
    pub envelope: Option<String>,
    pub raw: String,
}

/// Split mailbox text on `From ` separator lines. `>From ` quoting in bodies
/// is undone.
pub fn split_mailbox(text: &str) -> Vec<MailboxEntry> {
    let mut entries = Vec::new();
    let mut current: Option<MailboxEntry> = None;
    let mut previous_blank = true;

    for line in text.lines() {
        if previous_blank && line.starts_with("From ") {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            current = Some(MailboxEntry {
                envelope: Some(line["From ".len()..].trim().to_string()),
                raw: String::new(),
            });
            previous_blank = false;
            continue;
        }

        previous_blank = line.trim().is_empty();
        let entry = current.get_or_insert_with(|| MailboxEntry {
            envelope: None,
            raw: String::new(),
        });
        let unquoted = match line.strip_prefix('>') {
            Some(rest) if rest.trim_start_matches('>').starts_with("From ") => rest,
            _ => line,
        };
        entry.raw.push_str(unquoted);
        entry.raw.push('\n');
    }

    if let Some(entry) = current {
        if entry.envelope.is_some() || !entry.raw.trim().is_empty() {
            entries.push(entry);
        }
    }

    entries
}
