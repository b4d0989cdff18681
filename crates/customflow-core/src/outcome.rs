//! Outcome of a lenient batch operation.

use serde::Serialize;

/// An item that could not be processed and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failed {
    pub item: String,
    pub reason: String,
}

/// Explicit `(succeeded, failed)` split of a batch where individual failures
/// do not abort the whole operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partitioned<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<Failed>,
}

impl<T> Default for Partitioned<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> Partitioned<T> {
    pub fn push_ok(&mut self, value: T) {
        self.succeeded.push(value);
    }

    pub fn push_failed(&mut self, item: impl Into<String>, reason: impl Into<String>) {
        self.failed.push(Failed {
            item: item.into(),
            reason: reason.into(),
        });
    }

    pub fn is_all_failed(&self) -> bool {
        self.succeeded.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}
