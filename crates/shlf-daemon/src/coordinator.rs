//! The single task that owns the [`ViewStore`].
//!
//! Watcher signals, finished thumbnail fetches and presentation commands
//! all arrive here as channel messages and are applied one at a time.

use std::time::Duration;

use shlf_core::{Command, CoreResult, Event, ThumbnailResult, ViewStore};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

use crate::watcher::{ChangeWatcher, WatchMessage};

/// Delay between the first change signal of a burst and the refresh it triggers.
pub const REFRESH_DEBOUNCE: Duration = Duration::from_millis(100);

/// Single-slot pending refresh.
///
/// The first signal arms a deadline; further signals are absorbed until the
/// deadline fires and the slot is cleared.
#[derive(Debug)]
struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arms the deadline unless it is already armed. Returns `true` if armed now.
    fn signal(&mut self) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(Instant::now() + self.delay);
        true
    }

    fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    fn clear(&mut self) {
        self.deadline = None;
    }
}

/// Wires the [`ChangeWatcher`] to [`ViewStore::refresh`] and applies commands.
///
/// It is the only component that starts and stops the watcher: watching
/// begins when [`Coordinator::run`] starts and ends when it returns (on
/// [`Command::Shutdown`] or once every command sender is gone) or when the
/// coordinator is dropped.
pub struct Coordinator {
    store: ViewStore,
    watcher: ChangeWatcher,
    watch_rx: UnboundedReceiver<WatchMessage>,
    thumb_rx: UnboundedReceiver<ThumbnailResult>,
    commands: UnboundedReceiver<Command>,
    events: UnboundedSender<Event>,
    debounce: Debounce,
}

impl Coordinator {
    /// Creates a coordinator around `store`.
    ///
    /// `thumb_rx` is the receiving end of the channel the store's thumbnail
    /// cache reports on. Operation outcomes are sent on `events`; snapshot
    /// and thumbnail events come from the store's own sender.
    pub fn new(
        store: ViewStore,
        thumb_rx: UnboundedReceiver<ThumbnailResult>,
        commands: UnboundedReceiver<Command>,
        events: UnboundedSender<Event>,
    ) -> Self {
        let (watch_tx, watch_rx) = mpsc::unbounded_channel();
        Self {
            store,
            watcher: ChangeWatcher::new(watch_tx),
            watch_rx,
            thumb_rx,
            commands,
            events,
            debounce: Debounce::new(REFRESH_DEBOUNCE),
        }
    }

    /// Overrides [`REFRESH_DEBOUNCE`].
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce = Debounce::new(delay);
        self
    }

    /// Starts watching, publishes the initial snapshot and processes
    /// messages until shutdown.
    pub async fn run(mut self) {
        let folder = self.store.folder().to_path_buf();
        self.watcher.start(&folder);
        if !self.watcher.is_watching() {
            tracing::info!("no change notifications for {}; manual refresh only", folder.display());
        }
        if !self.store.refresh() {
            // An empty first listing is still a snapshot the UI should see.
            let _ = self.events.send(Event::SnapshotChanged { items: Vec::new() });
        }

        loop {
            let deadline = self.debounce.deadline();
            tokio::select! {
                Some(msg) = self.watch_rx.recv() => self.handle_watch(msg),
                Some(result) = self.thumb_rx.recv() => self.store.apply_thumbnail(result),
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.debounce.clear();
                    self.store.refresh();
                }
            }
        }

        if let Some(dir) = self.watcher.watched_dir() {
            tracing::debug!("releasing watch on {}", dir.display());
        }
        self.watcher.stop();
        tracing::info!("coordinator for {} stopped", folder.display());
    }

    fn handle_watch(&mut self, msg: WatchMessage) {
        match msg {
            WatchMessage::Changed => {
                if self.debounce.signal() {
                    tracing::trace!("refresh scheduled");
                }
            }
            WatchMessage::Error(e) => tracing::warn!("watch error: {e}"),
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Refresh => {
                self.debounce.clear();
                self.store.refresh();
            }
            Command::Delete(item) => {
                let result = self.store.delete(&item);
                self.report(format!("delete {}", item.name()), result);
            }
            Command::Rename(item, new_name) => {
                let result = self.store.rename(&item, &new_name);
                self.report(
                    format!("rename {} => {}", item.name(), new_name.trim()),
                    result,
                );
            }
            Command::CopyReference(item) => {
                let result = self.store.copy_reference(&item);
                self.report(format!("copy {}", item.name()), result);
            }
            Command::Shutdown => {}
        }
    }

    fn report(&self, operation: String, result: CoreResult<()>) {
        let event = match result {
            Ok(()) => Event::OperationComplete { operation },
            Err(e) => {
                tracing::warn!("{operation} failed: {e}");
                Event::OperationFailed {
                    operation,
                    error: e.to_string(),
                }
            }
        };
        let _ = self.events.send(event);
    }
}
