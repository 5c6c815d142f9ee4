//! Registry of in-flight parser invocations
//!
//! Each dispatched (file, parser) pair is inserted with its own cancellation
//! token, derived from the run's token, and removed again when it delivers
//! its completion signal. Cancelling an entry only asks the parser to stop;
//! nothing is force-killed.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// Stable identifier of one parser invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    pub file: PathBuf,
    pub parser: String,
}

impl TaskId {
    pub fn new(file: &Path, parser: &str) -> Self {
        Self {
            file: file.to_path_buf(),
            parser: parser.to_string(),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.parser, self.file.display())
    }
}

/// Active task ids mapped to their cancellation handles
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Mutex<HashMap<TaskId, CancellationToken>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task, returning its token (a child of `parent`)
    pub fn insert(&self, id: TaskId, parent: &CancellationToken) -> CancellationToken {
        let token = parent.child_token();
        if let Some(previous) = self.lock().insert(id.clone(), token.clone()) {
            tracing::warn!("Task {} was registered twice; cancelling the older entry", id);
            previous.cancel();
        }
        token
    }

    /// Forget a task, returns false when it was not registered
    pub fn remove(&self, id: &TaskId) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Request cancellation of one task
    pub fn cancel(&self, id: &TaskId) -> bool {
        match self.lock().remove(id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Request cancellation of every registered task, returns how many there were
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = self.lock().drain().collect();
        for (_, token) in &drained {
            token.cancel();
        }
        drained.len()
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.lock().contains_key(id)
    }

    /// Ids of registered tasks, sorted
    pub fn active(&self) -> Vec<TaskId> {
        let mut ids: Vec<_> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TaskId, CancellationToken>> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove() {
        let registry = TaskRegistry::new();
        let run = CancellationToken::new();
        let id = TaskId::new(Path::new("/e/a.mbox"), "mbox");

        registry.insert(id.clone(), &run);
        assert!(registry.contains(&id));
        assert_eq!(registry.active(), vec![id.clone()]);

        assert!(registry.remove(&id));
        assert!(!registry.remove(&id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_cancel_by_id() {
        let registry = TaskRegistry::new();
        let run = CancellationToken::new();
        let a = TaskId::new(Path::new("/e/a.mbox"), "mbox");
        let b = TaskId::new(Path::new("/e/b.mbox"), "mbox");

        let token_a = registry.insert(a.clone(), &run);
        let token_b = registry.insert(b.clone(), &run);

        assert!(registry.cancel(&a));
        assert!(token_a.is_cancelled());
        assert!(!token_b.is_cancelled());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_run_cancellation_reaches_tasks() {
        let registry = TaskRegistry::new();
        let run = CancellationToken::new();
        let token = registry.insert(TaskId::new(Path::new("/e/a.eml"), "eml"), &run);

        run.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancel_all() {
        let registry = TaskRegistry::new();
        let run = CancellationToken::new();
        let tokens: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|n| registry.insert(TaskId::new(Path::new(n), "text"), &run))
            .collect();

        assert_eq!(registry.cancel_all(), 3);
        assert!(tokens.iter().all(|t| t.is_cancelled()));
        assert!(registry.is_empty());
        assert!(!run.is_cancelled());
    }

    #[test]
    fn test_display() {
        let id = TaskId::new(Path::new("/e/a.eml"), "eml");
        assert_eq!(id.to_string(), "eml:/e/a.eml");
    }
}
