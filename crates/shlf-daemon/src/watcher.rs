//! File system watcher that signals when the watched folder changes.
//!
//! Uses [`notify`] with debouncing to detect changes in one directory
//! (non-recursive) and tell the coordinator to re-list it. The watcher never
//! says *what* changed; the coordinator always re-enumerates the folder.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify_debouncer_mini::{new_debouncer, DebouncedEventKind, Debouncer};
use shlf_core::{CoreError, CoreResult};
use tokio::sync::mpsc::UnboundedSender;

/// How long notify events are gathered before one signal is sent.
pub const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// Messages from the watcher to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchMessage {
    /// The watched directory contents changed.
    Changed,
    /// The backend reported an error while watching.
    Error(String),
}

/// One live OS-level watch. Dropping it releases the watch descriptor.
struct WatchSubscription {
    debouncer: Debouncer<notify::RecommendedWatcher>,
    dir: PathBuf,
}

/// Watches at most one directory at a time and signals changes through `tx`.
///
/// `Idle` until [`ChangeWatcher::start`], `Watching` until
/// [`ChangeWatcher::stop`] (or drop). A directory that cannot be watched
/// leaves it `Idle`; callers fall back to manual refresh.
pub struct ChangeWatcher {
    tx: UnboundedSender<WatchMessage>,
    subscription: Option<WatchSubscription>,
}

impl ChangeWatcher {
    /// Creates an idle watcher that will report through `tx`.
    pub fn new(tx: UnboundedSender<WatchMessage>) -> Self {
        Self {
            tx,
            subscription: None,
        }
    }

    /// Starts watching `dir`, replacing any previous subscription.
    ///
    /// Failure is logged and leaves the watcher idle.
    pub fn start(&mut self, dir: &Path) {
        if let Err(e) = self.try_start(dir) {
            tracing::warn!("{e}; auto-refresh disabled for {}", dir.display());
        }
    }

    /// Like [`ChangeWatcher::start`], but reports why the watch failed.
    ///
    /// # Errors
    ///
    /// [`CoreError::WatchUnavailable`] if the backend cannot be created or
    /// the directory cannot be watched (missing, permission denied).
    pub fn try_start(&mut self, dir: &Path) -> CoreResult<()> {
        self.stop();

        let tx = self.tx.clone();
        let mut debouncer = new_debouncer(
            WATCH_DEBOUNCE,
            move |result: Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>| {
                match result {
                    Ok(events) => {
                        let has_change = events
                            .iter()
                            .any(|e| matches!(e.kind, DebouncedEventKind::Any));
                        if has_change {
                            let _ = tx.send(WatchMessage::Changed);
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(WatchMessage::Error(format!("{e}")));
                    }
                }
            },
        )
        .map_err(|e| CoreError::WatchUnavailable(e.to_string()))?;

        // Non-recursive: only direct children
        debouncer
            .watcher()
            .watch(dir, notify::RecursiveMode::NonRecursive)
            .map_err(|e| CoreError::WatchUnavailable(format!("{}: {e}", dir.display())))?;

        tracing::info!("watching {}", dir.display());
        self.subscription = Some(WatchSubscription {
            debouncer,
            dir: dir.to_path_buf(),
        });
        Ok(())
    }

    /// Stops watching. Safe to call when idle or more than once.
    pub fn stop(&mut self) {
        if let Some(mut sub) = self.subscription.take() {
            let _ = sub.debouncer.watcher().unwatch(&sub.dir);
            tracing::debug!("stopped watching {}", sub.dir.display());
        }
    }

    pub fn is_watching(&self) -> bool {
        self.subscription.is_some()
    }

    /// The directory currently watched, if any.
    pub fn watched_dir(&self) -> Option<&Path> {
        self.subscription.as_ref().map(|s| s.dir.as_path())
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
