//! Parse run orchestration
//!
//! Files are processed strictly one after another. For each file every
//! matching parser is dispatched as its own tokio task, and the orchestrator
//! waits on that file's [`CompletionTracker`] before moving on. Files with no
//! matching parser are skipped without arming anything. When the last file is
//! done (or the run is cancelled) the finished callback receives the index,
//! including whatever was extracted before a cancellation.

mod files;
mod progress;
mod tasks;
mod tracker;

pub use files::FileSet;
pub use progress::{progress_channel, ProgressEvent, ProgressReceiver, ProgressSender};
pub use tasks::{TaskId, TaskRegistry};
pub use tracker::{
    CompletionSignal, CompletionTracker, DoneMessage, DoneStatus, ReleaseReport, SignalOutcome,
};

use crate::index::Index;
use crate::parser::{ExtractionContext, ParserCapability, ParserRegistry};
use futures::FutureExt;
use serde::Serialize;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files_total: usize,
    /// Files whose parsers all finished
    pub files_processed: usize,
    /// Files no parser matched
    pub files_without_parser: usize,
    pub dispatched: usize,
    pub completed: usize,
    pub failed: usize,
    pub unreported: usize,
    pub records: usize,
    pub cancelled: bool,
    pub duration_ms: u64,
}

/// Payload of the finished callback
#[derive(Debug)]
pub struct ParseFinished {
    pub case_name: String,
    pub index: Arc<Index>,
    pub summary: RunSummary,
}

/// How waiting on one file's parsers ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    /// Every dispatched parser signalled, or none matched
    Released,
    /// The run was cancelled while parsers were still outstanding
    Interrupted,
}

/// Sequential per-file driver with concurrent parsers per file
pub struct Orchestrator {
    case_name: String,
    registry: Arc<ParserRegistry>,
    tasks: Arc<TaskRegistry>,
    cancel: CancellationToken,
    progress: Option<ProgressSender>,
}

impl Orchestrator {
    pub fn new(case_name: impl Into<String>, registry: Arc<ParserRegistry>) -> Self {
        Self {
            case_name: case_name.into(),
            registry,
            tasks: Arc::new(TaskRegistry::new()),
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// Send progress events to `sender`
    pub fn with_progress(mut self, sender: ProgressSender) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Use an externally owned cancellation token
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that interrupts the run when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// In-flight parser invocations
    pub fn tasks(&self) -> &Arc<TaskRegistry> {
        &self.tasks
    }

    pub fn registry(&self) -> &Arc<ParserRegistry> {
        &self.registry
    }

    /// Start a run in the background. Completion is only signalled through
    /// `on_finished`.
    pub fn spawn<F>(
        self: Arc<Self>,
        files: FileSet,
        index: Arc<Index>,
        on_finished: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(ParseFinished) + Send + 'static,
    {
        tokio::spawn(async move { self.run(&files, index, on_finished).await })
    }

    /// Process every file, then call `on_finished` exactly once
    pub async fn run<F>(&self, files: &FileSet, index: Arc<Index>, on_finished: F)
    where
        F: FnOnce(ParseFinished),
    {
        let started = Instant::now();
        let total = files.len();
        let mut summary = RunSummary {
            files_total: total,
            ..Default::default()
        };

        info!("Parsing {} file(s) for case '{}'", total, self.case_name);
        self.emit(ProgressEvent::RunStarted { total });

        // Computed from the full set once per run
        let expected = files.expected_counts(&self.registry);

        for (n, file) in files.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("Parsing cancelled before {}", file.display());
                summary.cancelled = true;
                break;
            }

            match self
                .process_file(n + 1, total, file, &expected, &index, &mut summary)
                .await
            {
                FileOutcome::Released => {}
                FileOutcome::Interrupted => {
                    warn!(
                        "Interrupted while waiting for parsers on {}; {} task(s) left running",
                        file.display(),
                        self.tasks.len()
                    );
                    self.tasks.cancel_all();
                    summary.cancelled = true;
                    break;
                }
            }
        }

        summary.records = index.len();
        summary.duration_ms = started.elapsed().as_millis() as u64;

        info!(
            "Finished parsing for case '{}': {}/{} file(s), {} record(s), {} failure(s){}",
            self.case_name,
            summary.files_processed,
            summary.files_total,
            summary.records,
            summary.failed,
            if summary.cancelled { " (cancelled)" } else { "" }
        );
        self.emit(ProgressEvent::RunFinished {
            processed: summary.files_processed,
            records: summary.records,
            cancelled: summary.cancelled,
        });

        on_finished(ParseFinished {
            case_name: self.case_name.clone(),
            index,
            summary,
        });
    }

    async fn process_file(
        &self,
        position: usize,
        total: usize,
        file: &Path,
        expected: &HashMap<String, usize>,
        index: &Arc<Index>,
        summary: &mut RunSummary,
    ) -> FileOutcome {
        let parsers = self.registry.parsers_for_path(file);
        self.emit(ProgressEvent::FileStarted {
            position,
            total,
            path: file.to_path_buf(),
            parsers: parsers.len(),
        });

        if parsers.is_empty() {
            debug!("No parser for {}", file.display());
            summary.files_without_parser += 1;
            self.emit(ProgressEvent::NoParser {
                path: file.to_path_buf(),
            });
            return FileOutcome::Released;
        }

        let mut tracker = CompletionTracker::arm_for(file, parsers.len());
        for parser in parsers {
            let expected_files = expected.get(parser.name()).copied().unwrap_or(1);
            debug!(
                "The '{}' parser is expecting {} file(s)",
                parser.name(),
                expected_files
            );
            self.dispatch(parser.clone(), file, index, expected_files, tracker.signaller());
            summary.dispatched += 1;
        }

        debug!("Waiting for parsers to finish with {}...", file.display());
        loop {
            let done = tokio::select! {
                done = tracker.next_done() => done,
                _ = self.cancel.cancelled() => return FileOutcome::Interrupted,
            };
            let Some(done) = done else { break };

            match &done.status {
                DoneStatus::Completed => summary.completed += 1,
                DoneStatus::Failed(_) => summary.failed += 1,
                DoneStatus::Unreported => summary.unreported += 1,
            }
            self.emit(ProgressEvent::parser_done(
                file.to_path_buf(),
                done.parser,
                &done.status,
            ));
        }

        summary.files_processed += 1;
        self.emit(ProgressEvent::FileFinished {
            position,
            path: file.to_path_buf(),
        });
        FileOutcome::Released
    }

    /// Run one parser on one file as an independent task. Errors and panics
    /// stay inside the task and become the invocation's completion signal.
    fn dispatch(
        &self,
        parser: Arc<dyn ParserCapability>,
        file: &Path,
        index: &Arc<Index>,
        expected_files: usize,
        signal: CompletionSignal,
    ) {
        let name = parser.name().to_string();
        let task_id = TaskId::new(file, &name);
        let token = self.tasks.insert(task_id.clone(), &self.cancel);

        let ctx = ExtractionContext::new(
            self.case_name.clone(),
            index.clone(),
            file,
            &name,
            expected_files,
            signal,
            token,
        )
        .with_task(self.tasks.clone(), task_id);
        let slot = ctx.slot();

        self.emit(ProgressEvent::ParserDispatched {
            path: file.to_path_buf(),
            parser: name.clone(),
            expected_files,
        });

        let file: PathBuf = file.to_path_buf();
        tokio::spawn(async move {
            let outcome = AssertUnwindSafe(parser.parse(&file, ctx, expected_files))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("Parser '{}' failed on {}: {}", name, file.display(), e);
                    slot.record_failure(e.to_string());
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!("Parser '{}' panicked on {}: {}", name, file.display(), message);
                    slot.record_failure(format!("panicked: {}", message));
                }
            }
            // Dropping the last slot handle signals if the parser never did
        });
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(sender) = &self.progress {
            // A closed receiver just means nobody is rendering progress
            let _ = sender.send(event);
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Stuck;

    #[async_trait::async_trait]
    impl ParserCapability for Stuck {
        fn name(&self) -> &str {
            "stuck"
        }

        fn supported_extensions(&self) -> &[&str] {
            &["bin"]
        }

        async fn parse(
            &self,
            _file: &Path,
            _ctx: ExtractionContext,
            _expected_files: usize,
        ) -> crate::error::Result<()> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }

    #[tokio::test]
    async fn test_empty_file_set_finishes_immediately() {
        let orchestrator = Orchestrator::new("acme", Arc::new(ParserRegistry::with_defaults()));
        let index = Arc::new(Index::new("acme"));
        let mut calls = 0;

        orchestrator
            .run(&FileSet::new(), index, |finished| {
                calls += 1;
                assert!(finished.index.is_empty());
                assert_eq!(finished.summary.files_total, 0);
                assert!(!finished.summary.cancelled);
            })
            .await;

        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let orchestrator = Orchestrator::new("acme", Arc::new(ParserRegistry::with_defaults()));
        orchestrator.cancel_token().cancel();

        let files = FileSet::from_paths(["/e/a.eml"]).unwrap();
        let mut summary = None;
        orchestrator
            .run(&files, Arc::new(Index::new("acme")), |f| summary = Some(f.summary))
            .await;

        let summary = summary.unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.dispatched, 0);
    }

    #[tokio::test]
    async fn test_file_outcomes() {
        let mut registry = ParserRegistry::new();
        registry.register(Arc::new(Stuck));
        let orchestrator = Orchestrator::new("acme", Arc::new(registry));
        let index = Arc::new(Index::new("acme"));
        let expected = HashMap::from([("stuck".to_string(), 1)]);
        let mut summary = RunSummary::default();

        let outcome = orchestrator
            .process_file(1, 2, Path::new("/e/a.txt"), &expected, &index, &mut summary)
            .await;
        assert_eq!(outcome, FileOutcome::Released);
        assert_eq!(summary.files_without_parser, 1);

        let cancel = orchestrator.cancel_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });
        let outcome = orchestrator
            .process_file(2, 2, Path::new("/e/b.bin"), &expected, &index, &mut summary)
            .await;
        assert_eq!(outcome, FileOutcome::Interrupted);
        assert_eq!(summary.dispatched, 1);
        assert_eq!(summary.files_processed, 0);
    }
}
