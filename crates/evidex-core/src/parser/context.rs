//! Per-invocation extraction context

use crate::error::{EvidexError, Result};
use crate::index::{Index, Record};
use crate::orchestrator::{
    CompletionSignal, DoneMessage, DoneStatus, SignalOutcome, TaskId, TaskRegistry,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Everything a parser invocation gets besides the file itself.
///
/// Not `Clone`: a parser that hands work to spawned sub-tasks moves the
/// context into the task that finishes last. Dropping the context without
/// calling [`report_complete`](Self::report_complete) still delivers one
/// completion signal, marked as unreported.
pub struct ExtractionContext {
    case_name: String,
    index: Arc<Index>,
    cancel: CancellationToken,
    expected_files: usize,
    slot: Arc<CompletionSlot>,
}

impl ExtractionContext {
    pub fn new(
        case_name: impl Into<String>,
        index: Arc<Index>,
        file: &Path,
        parser: &str,
        expected_files: usize,
        signal: CompletionSignal,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            case_name: case_name.into(),
            index,
            cancel,
            expected_files,
            slot: Arc::new(CompletionSlot {
                parser: parser.to_string(),
                file: file.to_path_buf(),
                reported: AtomicBool::new(false),
                failure: Mutex::new(None),
                signal,
                task: None,
            }),
        }
    }

    /// Tie the invocation to a task registry entry, removed on completion
    pub(crate) fn with_task(mut self, tasks: Arc<TaskRegistry>, id: TaskId) -> Self {
        if let Some(slot) = Arc::get_mut(&mut self.slot) {
            slot.task = Some((tasks, id));
        }
        self
    }

    /// Handle used by the dispatcher to record failures
    pub(crate) fn slot(&self) -> Arc<CompletionSlot> {
        self.slot.clone()
    }

    pub fn case_name(&self) -> &str {
        &self.case_name
    }

    pub fn index(&self) -> &Arc<Index> {
        &self.index
    }

    /// Append a record to the shared index
    pub fn add_record(&self, record: Record) {
        self.index.add(record);
    }

    pub fn expected_files(&self) -> usize {
        self.expected_files
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn has_reported(&self) -> bool {
        self.slot.reported.load(Ordering::Acquire)
    }

    /// Signal that this parser is done with the file. Calling it twice is an
    /// over-signal and returns an error without counting down again.
    pub fn report_complete(&self) -> Result<SignalOutcome> {
        self.slot.report(DoneStatus::Completed)
    }
}

/// Shared between the context and the dispatcher; the last owner to let go
/// delivers the signal if nobody reported.
pub(crate) struct CompletionSlot {
    parser: String,
    file: PathBuf,
    reported: AtomicBool,
    failure: Mutex<Option<String>>,
    signal: CompletionSignal,
    task: Option<(Arc<TaskRegistry>, TaskId)>,
}

impl CompletionSlot {
    fn report(&self, status: DoneStatus) -> Result<SignalOutcome> {
        if self.reported.swap(true, Ordering::AcqRel) {
            tracing::error!(
                "Parser '{}' reported completion more than once for {}",
                self.parser,
                self.file.display()
            );
            return Err(EvidexError::OverSignal {
                parser: self.parser.clone(),
                file: self.file.display().to_string(),
            });
        }
        self.deliver(status)
    }

    /// Remember why the invocation failed; sent with the final signal
    pub(crate) fn record_failure(&self, message: String) {
        if self.reported.load(Ordering::Acquire) {
            tracing::warn!(
                "Parser '{}' failed on {} after reporting completion: {}",
                self.parser,
                self.file.display(),
                message
            );
            return;
        }
        let mut failure = self.failure.lock().unwrap_or_else(|e| e.into_inner());
        failure.get_or_insert(message);
    }

    fn deliver(&self, status: DoneStatus) -> Result<SignalOutcome> {
        if let Some((tasks, id)) = &self.task {
            tasks.remove(id);
        }
        self.signal.signal(DoneMessage {
            parser: self.parser.clone(),
            status,
        })
    }
}

impl Drop for CompletionSlot {
    fn drop(&mut self) {
        if self.reported.swap(true, Ordering::AcqRel) {
            return;
        }

        let failure = self
            .failure
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let status = match failure {
            Some(message) => DoneStatus::Failed(message),
            None => {
                tracing::warn!(
                    "Parser '{}' finished {} without reporting completion",
                    self.parser,
                    self.file.display()
                );
                DoneStatus::Unreported
            }
        };

        if let Err(e) = self.deliver(status) {
            tracing::error!("Failed to deliver completion: {}", e);
        }
    }
}
