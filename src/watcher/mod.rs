//! Change watcher for development sessions
//!
//! Observes a module's directory, debounces event bursts (500ms) and drives
//! rebuild plus client notification through a callback. Registrations are
//! deduplicated per (directory, sorted extension filter) by the session.

mod event;
mod watch;

pub use event::{WatchEvent, WatchOptions, WatcherState, DEBOUNCE_MS};
pub use watch::watch;
