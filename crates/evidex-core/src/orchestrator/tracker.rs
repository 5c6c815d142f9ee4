//! Per-file completion barrier
//!
//! A [`CompletionTracker`] is armed with the number of parsers dispatched for
//! one file. Each parser invocation holds a [`CompletionSignal`] and sends
//! exactly one [`DoneMessage`] through it. The remaining count is decremented
//! with a compare-and-swap loop, so extra signals are rejected instead of
//! wrapping or releasing twice. Done messages travel over an mpsc channel to
//! the single consumer waiting in [`CompletionTracker::await_release`].

use crate::error::{EvidexError, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// How a parser invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoneStatus {
    /// The parser reported completion itself
    Completed,
    /// The parser returned an error or panicked
    Failed(String),
    /// The parser dropped its context without reporting completion
    Unreported,
}

/// Typed completion message sent from a parser task to the waiting orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoneMessage {
    pub parser: String,
    pub status: DoneStatus,
}

impl DoneMessage {
    pub fn completed(parser: impl Into<String>) -> Self {
        Self {
            parser: parser.into(),
            status: DoneStatus::Completed,
        }
    }
}

/// Result of a successful signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// Other parsers are still running
    Pending { remaining: usize },
    /// This signal was the last one the tracker was armed for
    Released,
    /// Nobody is waiting on this tracker any more (the run was cancelled)
    Discarded,
}

struct TrackerState {
    file: Option<PathBuf>,
    remaining: AtomicUsize,
    tx: mpsc::UnboundedSender<DoneMessage>,
}

impl TrackerState {
    fn label(&self) -> String {
        self.file
            .as_ref()
            .map(|f| f.display().to_string())
            .unwrap_or_default()
    }
}

/// Single-use countdown barrier for one file
pub struct CompletionTracker {
    armed: usize,
    received: usize,
    state: Arc<TrackerState>,
    rx: mpsc::UnboundedReceiver<DoneMessage>,
}

/// Sending half handed to each parser invocation
#[derive(Clone)]
pub struct CompletionSignal {
    state: Arc<TrackerState>,
}

/// Messages collected while waiting for release
#[derive(Debug, Clone, Default)]
pub struct ReleaseReport {
    pub messages: Vec<DoneMessage>,
}

impl ReleaseReport {
    pub fn count(&self, pred: impl Fn(&DoneStatus) -> bool) -> usize {
        self.messages.iter().filter(|m| pred(&m.status)).count()
    }
}

impl CompletionTracker {
    /// Arm a tracker requiring `k` signals
    pub fn arm(k: usize) -> Self {
        Self::build(None, k)
    }

    /// Arm a tracker for `file`, used in log and error messages
    pub fn arm_for(file: &Path, k: usize) -> Self {
        Self::build(Some(file.to_path_buf()), k)
    }

    fn build(file: Option<PathBuf>, k: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            armed: k,
            received: 0,
            state: Arc::new(TrackerState {
                file,
                remaining: AtomicUsize::new(k),
                tx,
            }),
            rx,
        }
    }

    /// Number of signals this tracker was armed with
    pub fn armed(&self) -> usize {
        self.armed
    }

    /// Signals still outstanding
    pub fn remaining(&self) -> usize {
        self.state.remaining.load(Ordering::Acquire)
    }

    pub fn is_released(&self) -> bool {
        self.received >= self.armed
    }

    /// New sending handle for a parser invocation
    pub fn signaller(&self) -> CompletionSignal {
        CompletionSignal {
            state: self.state.clone(),
        }
    }

    /// Signal directly on the tracker
    pub fn signal(&self, message: DoneMessage) -> Result<SignalOutcome> {
        self.signaller().signal(message)
    }

    /// Wait for the next done message. Returns `None` once released.
    ///
    /// Cancel safe: dropping the future loses no message.
    pub async fn next_done(&mut self) -> Option<DoneMessage> {
        if self.is_released() {
            return None;
        }
        // The tracker holds a sender itself, so the channel never closes early
        let message = self.rx.recv().await?;
        self.received += 1;
        Some(message)
    }

    /// Block until every armed signal arrived. Returns at once when armed with 0.
    pub async fn await_release(&mut self) -> ReleaseReport {
        let mut report = ReleaseReport::default();
        while let Some(message) = self.next_done().await {
            report.messages.push(message);
        }
        report
    }
}

impl CompletionSignal {
    /// Count down by one and deliver `message` to the waiter.
    ///
    /// Signalling a tracker that already reached zero is an over-signal: it is
    /// logged, rejected, and never causes a second release.
    pub fn signal(&self, message: DoneMessage) -> Result<SignalOutcome> {
        let previous = self
            .state
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        let remaining = match previous {
            Ok(previous) => previous - 1,
            Err(_) => {
                tracing::error!(
                    "Parser '{}' signalled completion for {} after the tracker was released",
                    message.parser,
                    self.state.label()
                );
                return Err(EvidexError::OverSignal {
                    parser: message.parser,
                    file: self.state.label(),
                });
            }
        };

        if self.state.tx.send(message).is_err() {
            tracing::debug!(
                "Discarding completion for {}: no longer awaited",
                self.state.label()
            );
            return Ok(SignalOutcome::Discarded);
        }

        if remaining == 0 {
            Ok(SignalOutcome::Released)
        } else {
            Ok(SignalOutcome::Pending { remaining })
        }
    }
}
