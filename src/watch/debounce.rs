//! Event filtering and time-window debouncing

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default window in which repeated events for a path are dropped
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(250);

/// Suppresses events for a path within `window` after an accepted one
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    accepted: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            accepted: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether an event for `path` observed at `at` should trigger
    pub fn accept(&mut self, path: &Path, at: Instant) -> bool {
        if let Some(last) = self.accepted.get(path) {
            if at.saturating_duration_since(*last) < self.window {
                return false;
            }
        }
        self.accepted.insert(path.to_path_buf(), at);
        true
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

/// Restricts events to one file name, or lets everything through
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    file_name: Option<String>,
}

impl EventFilter {
    pub fn new(file_name: Option<String>) -> Self {
        Self { file_name }
    }

    pub fn accepts(&self, path: &Path) -> bool {
        match &self.file_name {
            None => true,
            Some(name) => path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n == name),
        }
    }
}
