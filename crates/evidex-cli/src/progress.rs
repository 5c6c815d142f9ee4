//! Progress reporting on stderr

use evidex_core::ProgressEvent;
use std::io::{self, Write};

/// Renders parse progress events as a single updating status line
pub struct ProgressReporter {
    total: usize,
    processed: usize,
    failed: usize,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self {
            total: 0,
            processed: 0,
            failed: 0,
            enabled,
        }
    }

    pub fn handle(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RunStarted { total } => {
                self.total = *total;
                self.set_message(&format!("Parsing {} file(s)", total));
            }
            ProgressEvent::FileStarted {
                position, path, ..
            } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                self.set_message(&format!("[{}/{}] {}", position, self.total, name));
            }
            ProgressEvent::ParserDone { failed: true, .. } => self.failed += 1,
            ProgressEvent::FileFinished { .. } | ProgressEvent::NoParser { .. } => {
                self.increment()
            }
            ProgressEvent::RunFinished { .. } => self.finish(),
            _ => {}
        }
    }

    pub fn set_message(&self, msg: &str) {
        if !self.enabled {
            return;
        }
        eprint!("\r{:<60}", truncate(msg, 60));
        io::stderr().flush().ok();
    }

    pub fn increment(&mut self) {
        self.processed += 1;
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        if self.failed > 0 {
            eprintln!(
                "\rDone ({}/{}, {} parser failure(s))                    ",
                self.processed, self.total, self.failed
            );
        } else {
            eprintln!("\rDone ({}/{})                    ", self.processed, self.total);
        }
    }
}

fn truncate(msg: &str, max: usize) -> String {
    let len = msg.chars().count();
    if len <= max {
        msg.to_string()
    } else {
        let tail: String = msg.chars().skip(len - (max - 3)).collect();
        format!("...{}", tail)
    }
}
