//! Watch event types, options and debounce state

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Debounce quiet window in milliseconds
pub const DEBOUNCE_MS: u64 = 500;

/// Watch options for one registration
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Directory under observation (watched recursively)
    pub directory: PathBuf,
    /// Extension filter scoping file events; directory events always pass
    pub ext_filter: Vec<String>,
    /// Quiet window before a burst of events collapses into one change
    pub debounce: Duration,
}

impl WatchOptions {
    pub fn new(directory: PathBuf, ext_filter: Vec<String>) -> Self {
        Self {
            directory,
            ext_filter,
            debounce: Duration::from_millis(DEBOUNCE_MS),
        }
    }
}

/// Watch events for structured (NDJSON) host logging
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    WatchStarted { directory: String },
    Changed { paths: Vec<String> },
    Shutdown,
}

impl WatchEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Debounce state owned by one watch registration
///
/// Coalesces a burst of filesystem events into a single change notification
/// after the quiet window elapses.
#[derive(Debug)]
pub struct WatcherState {
    pending_changes: HashSet<PathBuf>,
    last_change: Option<Instant>,
    debounce: Duration,
}

impl WatcherState {
    pub fn new() -> Self {
        Self::with_debounce(Duration::from_millis(DEBOUNCE_MS))
    }

    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            pending_changes: HashSet::new(),
            last_change: None,
            debounce,
        }
    }

    /// Record an event and rearm the quiet window
    pub fn add_change(&mut self, path: PathBuf) {
        self.pending_changes.insert(path);
        self.last_change = Some(Instant::now());
    }

    /// Whether the quiet window has elapsed with changes pending
    pub fn should_rebuild(&self) -> bool {
        match self.last_change {
            Some(last) => !self.pending_changes.is_empty() && last.elapsed() >= self.debounce,
            None => false,
        }
    }

    /// Drain the pending set and disarm
    pub fn take_changes(&mut self) -> Vec<PathBuf> {
        let changes: Vec<_> = self.pending_changes.drain().collect();
        self.last_change = None;
        changes
    }
}

impl Default for WatcherState {
    fn default() -> Self {
        Self::new()
    }
}
