//! Console surface used for step tracing and pass/fail reporting

use std::sync::Mutex;

/// Sink for user-facing output
///
/// The terminal implementation lives in `cli::terminal_output`; tests use
/// [`MemoryConsole`].
pub trait Console: Send + Sync {
    /// Write a plain line
    fn write(&self, line: &str);

    /// Informational message
    fn info(&self, message: &str);

    /// Success message
    fn ok(&self, message: &str);

    /// Error message
    fn error(&self, message: &str);

    /// Clear the screen
    fn clear(&self);
}

/// Kind of a captured line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Write,
    Info,
    Ok,
    Error,
    Clear,
}

/// Console that records everything written to it
#[derive(Debug, Default)]
pub struct MemoryConsole {
    lines: Mutex<Vec<(LineKind, String)>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, kind: LineKind, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((kind, console::strip_ansi_codes(line).into_owned()));
    }

    /// All captured lines with their kind
    pub fn entries(&self) -> Vec<(LineKind, String)> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Captured text, ANSI codes stripped
    pub fn lines(&self) -> Vec<String> {
        self.entries().into_iter().map(|(_, line)| line).collect()
    }

    /// Captured lines of one kind
    pub fn lines_of(&self, kind: LineKind) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, line)| line)
            .collect()
    }

    /// Whether any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    /// Number of times the screen was cleared
    pub fn clear_count(&self) -> usize {
        self.lines_of(LineKind::Clear).len()
    }
}

impl Console for MemoryConsole {
    fn write(&self, line: &str) {
        self.push(LineKind::Write, line);
    }

    fn info(&self, message: &str) {
        self.push(LineKind::Info, message);
    }

    fn ok(&self, message: &str) {
        self.push(LineKind::Ok, message);
    }

    fn error(&self, message: &str) {
        self.push(LineKind::Error, message);
    }

    fn clear(&self) {
        self.push(LineKind::Clear, "");
    }
}
