//! Filesystem observation loop

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;

use notify::event::{EventKind, ModifyKind};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{Dir2jsonError, Dir2jsonResult};
use crate::walk::{is_file_name, is_supported_ext};

use super::event::{WatchEvent, WatchOptions, WatcherState};

/// Observe a directory until `running` clears
///
/// Emits `WatchStarted` once, then a debounced `Changed` per burst of
/// relevant add/remove/rename events, then `Shutdown`. The callback re-runs
/// the build pipeline; this loop never aborts an in-flight rebuild, the
/// debounce just guarantees at most one queued change per quiet period.
pub fn watch(
    options: WatchOptions,
    running: Arc<AtomicBool>,
    callback: impl Fn(WatchEvent),
) -> Dir2jsonResult<()> {
    callback(WatchEvent::WatchStarted {
        directory: options.directory.display().to_string(),
    });

    let (tx, rx) = channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                if is_shape_event(&event.kind) {
                    for path in event.paths {
                        let _ = tx.send(path);
                    }
                }
            }
        },
        Config::default(),
    )
    .map_err(|e| Dir2jsonError::Io(std::io::Error::other(e.to_string())))?;

    watcher
        .watch(&options.directory, RecursiveMode::Recursive)
        .map_err(|e| Dir2jsonError::Io(std::io::Error::other(e.to_string())))?;

    let mut state = WatcherState::with_debounce(options.debounce);

    while running.load(Ordering::SeqCst) {
        if let Ok(path) = rx.recv_timeout(Duration::from_millis(50)) {
            if is_relevant(&path, &options.ext_filter) {
                state.add_change(path);
            }
        }

        if state.should_rebuild() {
            let changes = state.take_changes();
            callback(WatchEvent::Changed {
                paths: changes
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect(),
            });
        }
    }

    callback(WatchEvent::Shutdown);
    Ok(())
}

/// Only events that can change the tree shape feed the debounce
fn is_shape_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_))
    )
}

/// File events are scoped to the extension filter; directory events always
/// pass (a new subdirectory may later contain matching files)
pub(super) fn is_relevant(path: &Path, ext_filter: &[String]) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) if is_file_name(name) => is_supported_ext(name, ext_filter),
        _ => true,
    }
}
