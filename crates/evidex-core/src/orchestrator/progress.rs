//! Progress events emitted during a parse run

use super::DoneStatus;
use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Events describing a run as it happens. Rendering is up to the receiver.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    RunStarted {
        total: usize,
    },
    FileStarted {
        /// 1-based position in the run
        position: usize,
        total: usize,
        path: PathBuf,
        parsers: usize,
    },
    NoParser {
        path: PathBuf,
    },
    ParserDispatched {
        path: PathBuf,
        parser: String,
        expected_files: usize,
    },
    ParserDone {
        path: PathBuf,
        parser: String,
        failed: bool,
    },
    FileFinished {
        position: usize,
        path: PathBuf,
    },
    RunFinished {
        processed: usize,
        records: usize,
        cancelled: bool,
    },
}

impl ProgressEvent {
    pub(crate) fn parser_done(path: PathBuf, parser: String, status: &DoneStatus) -> Self {
        ProgressEvent::ParserDone {
            path,
            parser,
            failed: matches!(status, DoneStatus::Failed(_)),
        }
    }
}

pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;
pub type ProgressReceiver = mpsc::UnboundedReceiver<ProgressEvent>;

/// Channel for progress events
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}
