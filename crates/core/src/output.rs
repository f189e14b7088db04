//! User-visible output.
//!
//! Hook and resolver progress lines go through the `Logger` collaborator so
//! embedders decide where they end up. Internal diagnostics use `tracing`
//! directly and never go through this trait.

use std::cell::RefCell;

/// Fire-and-forget sink for user-visible progress lines.
pub trait Logger {
    fn printout(&self, message: &str);
}

/// Routes progress lines to `tracing::info!`.
#[derive(Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn printout(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Collects progress lines in memory, for assertions in tests.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: RefCell<Vec<String>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|line| line.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn printout(&self, message: &str) {
        self.lines.borrow_mut().push(message.to_string());
    }
}
