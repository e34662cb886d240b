//! The view store: single owner of the snapshot and thumbnail cache.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc::UnboundedSender;

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::event::Event;
use crate::fs::entry::Item;
use crate::fs::ops::{list_directory, validate_new_name, FileOperations, SystemFileOperations};
use crate::fs::preview::Thumbnail;
use crate::view::snapshot::Snapshot;
use crate::view::thumbnail::{ThumbnailCache, ThumbnailResult};

/// Owns the current [`Snapshot`] of the watched folder and its thumbnails.
///
/// All methods take `&mut self`; the store is meant to live on a single
/// task (see the daemon's coordinator) that applies refreshes, mutations
/// and finished thumbnail fetches one at a time.
///
/// Mutations only change the snapshot through a full [`ViewStore::refresh`]
/// after the filesystem call succeeded, so the view never shows a removal
/// or rename that did not happen on disk.
pub struct ViewStore {
    config: Config,
    folder: PathBuf,
    ops: Box<dyn FileOperations>,
    snapshot: Snapshot,
    thumbnails: ThumbnailCache,
    events: Option<UnboundedSender<Event>>,
}

impl ViewStore {
    /// Creates a store for `config` with an empty snapshot.
    ///
    /// Uses [`SystemFileOperations`] and no thumbnails. Call
    /// [`ViewStore::refresh`] to populate it.
    pub fn new(config: Config) -> Self {
        let folder = config.resolved_folder();
        Self {
            config,
            folder,
            ops: Box::new(SystemFileOperations),
            snapshot: Snapshot::default(),
            thumbnails: ThumbnailCache::disabled(),
            events: None,
        }
    }

    /// Replaces the file operations used for delete, rename and copy.
    pub fn with_file_operations(self, ops: impl FileOperations + 'static) -> Self {
        Self {
            ops: Box::new(ops),
            ..self
        }
    }

    /// Replaces the thumbnail cache.
    pub fn with_thumbnails(self, thumbnails: ThumbnailCache) -> Self {
        Self { thumbnails, ..self }
    }

    /// Sends [`Event`]s for snapshot and thumbnail changes to `tx`.
    pub fn with_events(self, tx: UnboundedSender<Event>) -> Self {
        Self {
            events: Some(tx),
            ..self
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The watched folder, with `~` expanded.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// The current items, newest first.
    pub fn items(&self) -> &[Item] {
        self.snapshot.items()
    }

    pub fn count(&self) -> usize {
        self.snapshot.len()
    }

    /// Looks up a current item by identity.
    pub fn find(&self, path: &Path) -> Option<&Item> {
        self.snapshot.find(path)
    }

    /// Returns the resolved thumbnail for `item`, if any.
    pub fn thumbnail(&self, item: &Item) -> Option<&Thumbnail> {
        self.thumbnails.get(item)
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        &self.thumbnails
    }

    /// Re-lists the folder and swaps in a new snapshot.
    ///
    /// An unavailable folder yields an empty snapshot. Thumbnails are
    /// requested for keys that entered the view and evicted for keys that
    /// left it; this never waits for a fetch. Returns `true` if the
    /// snapshot changed, in which case [`Event::SnapshotChanged`] is sent.
    pub fn refresh(&mut self) -> bool {
        let listing = match list_directory(&self.folder, self.config.show_hidden_files) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("{e}; showing an empty view");
                Vec::new()
            }
        };

        let next = Snapshot::from_listing(listing, self.config.max_items);
        let diff = self.snapshot.diff(&next);
        let changed = next != self.snapshot;
        self.snapshot = next;

        for key in &diff.removed {
            self.thumbnails.evict(key);
        }
        for item in &diff.added {
            self.thumbnails.request(item);
        }

        if changed {
            tracing::debug!(
                "snapshot of {} now has {} items (+{} -{})",
                self.folder.display(),
                self.snapshot.len(),
                diff.added.len(),
                diff.removed.len()
            );
            self.emit(Event::SnapshotChanged {
                items: self.snapshot.items().to_vec(),
            });
        }
        changed
    }

    /// Moves `item` to the trash, then refreshes.
    ///
    /// # Errors
    ///
    /// The trash failure (wrapped as [`CoreError::OperationFailed`] unless it
    /// is already [`CoreError::NotFound`]). The snapshot is left untouched.
    pub fn delete(&mut self, item: &Item) -> CoreResult<()> {
        self.ops
            .trash(item.path())
            .map_err(|e| operation_failed("delete", e))?;
        tracing::info!("trashed {}", item.path().display());
        self.refresh();
        Ok(())
    }

    /// Renames `item` to `new_name` (trimmed) in the same folder, then refreshes.
    ///
    /// Renaming to the current name succeeds without touching the disk.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Validation`] if the trimmed name is empty or not a
    ///   plain file name. No filesystem call is made.
    /// - [`CoreError::AlreadyExists`], [`CoreError::NotFound`] or
    ///   [`CoreError::OperationFailed`] if the move fails. The snapshot is
    ///   left untouched.
    pub fn rename(&mut self, item: &Item, new_name: &str) -> CoreResult<()> {
        let new_name = validate_new_name(new_name)?;
        let parent = item
            .path()
            .parent()
            .ok_or_else(|| CoreError::Validation("item has no parent directory".to_string()))?;
        let dest = parent.join(new_name);

        if dest == item.path() {
            return Ok(());
        }

        self.ops
            .move_item(item.path(), &dest)
            .map_err(|e| operation_failed("rename", e))?;
        tracing::info!("renamed {} -> {}", item.path().display(), dest.display());
        self.refresh();
        Ok(())
    }

    /// Puts a reference to `item` on the clipboard. Does not touch the snapshot.
    ///
    /// # Errors
    ///
    /// [`CoreError::OperationFailed`] if no clipboard is reachable.
    pub fn copy_reference(&self, item: &Item) -> CoreResult<()> {
        self.ops
            .copy_reference(item.path())
            .map_err(|e| operation_failed("copy", e))
    }

    /// Applies a finished thumbnail fetch, sending [`Event::ThumbnailReady`]
    /// if it was stored.
    pub fn apply_thumbnail(&mut self, result: ThumbnailResult) {
        let path = result.key.path().to_path_buf();
        if let Some(thumbnail) = self.thumbnails.complete(result) {
            self.emit(Event::ThumbnailReady { path, thumbnail });
        }
    }

    fn emit(&self, event: Event) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

/// Keeps specific failure kinds; wraps everything else.
fn operation_failed(operation: &str, err: CoreError) -> CoreError {
    match err {
        e @ (CoreError::OperationFailed { .. }
        | CoreError::AlreadyExists(_)
        | CoreError::NotFound(_)) => e,
        other => CoreError::operation(operation, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::preview::PreviewGenerator;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    /// Trashes by deleting and renames for real; records every call.
    #[derive(Clone, Default)]
    struct RecordingOps {
        calls: Arc<Mutex<Vec<String>>>,
        fail_trash: bool,
    }

    impl RecordingOps {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl FileOperations for RecordingOps {
        fn trash(&self, path: &Path) -> CoreResult<()> {
            self.calls.lock().unwrap().push(format!("trash {}", path.display()));
            if self.fail_trash {
                return Err(CoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "denied",
                )));
            }
            fs::remove_file(path)?;
            Ok(())
        }

        fn move_item(&self, src: &Path, dest: &Path) -> CoreResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("move {} {}", src.display(), dest.display()));
            SystemFileOperations.move_item(src, dest)
        }

        fn copy_reference(&self, path: &Path) -> CoreResult<()> {
            self.calls.lock().unwrap().push(format!("copy {}", path.display()));
            Ok(())
        }
    }

    struct OnePixel;

    #[async_trait]
    impl PreviewGenerator for OnePixel {
        async fn generate_preview(&self, _path: &Path, _size: u32) -> CoreResult<Thumbnail> {
            Ok(Thumbnail {
                width: 1,
                height: 1,
                bytes: Arc::from(&b"px"[..]),
            })
        }
    }

    /// Creates `count` files whose mtimes increase with their index.
    fn make_files(tmp: &TempDir, count: usize) {
        let base = SystemTime::now() - Duration::from_secs(3600);
        for i in 0..count {
            let path = tmp.path().join(format!("file{i}.txt"));
            fs::write(&path, format!("content {i}")).unwrap();
            let file = fs::File::options().write(true).open(&path).unwrap();
            file.set_modified(base + Duration::from_secs(i as u64 * 10))
                .unwrap();
        }
    }

    fn config_for(tmp: &TempDir, max_items: usize) -> Config {
        Config {
            watched_folder: tmp.path().to_string_lossy().into_owned(),
            show_hidden_files: false,
            max_items,
        }
    }

    fn store_for(tmp: &TempDir, max_items: usize) -> (ViewStore, RecordingOps) {
        let ops = RecordingOps::default();
        let mut store = ViewStore::new(config_for(tmp, max_items)).with_file_operations(ops.clone());
        store.refresh();
        (store, ops)
    }

    fn names(store: &ViewStore) -> Vec<String> {
        store.items().iter().map(|i| i.name().to_string()).collect()
    }

    #[test]
    fn files_sorted_newest_first() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 3);

        let (store, _) = store_for(&tmp, 50);

        assert_eq!(names(&store), vec!["file2.txt", "file1.txt", "file0.txt"]);
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn max_items_keeps_most_recent() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 10);

        let (store, _) = store_for(&tmp, 3);

        assert_eq!(store.count(), 3);
        assert_eq!(names(&store), vec!["file9.txt", "file8.txt", "file7.txt"]);
    }

    #[test]
    fn empty_folder_shows_no_items() {
        let tmp = TempDir::new().unwrap();

        let (store, _) = store_for(&tmp, 50);

        assert!(store.items().is_empty());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn missing_folder_shows_empty_view() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 2);
        let (mut store, _) = store_for(&tmp, 50);
        assert_eq!(store.count(), 2);

        let path = tmp.path().to_path_buf();
        drop(tmp);
        assert!(!path.exists());

        assert!(store.refresh());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn refresh_picks_up_new_file() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 2);
        let (mut store, _) = store_for(&tmp, 50);

        fs::write(tmp.path().join("new.txt"), "new").unwrap();

        assert!(store.refresh());
        assert_eq!(store.count(), 3);
        assert_eq!(store.items()[0].name(), "new.txt");
    }

    #[test]
    fn refresh_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 4);
        let (mut store, _) = store_for(&tmp, 50);
        let before = store.snapshot().clone();

        assert!(!store.refresh());
        assert_eq!(store.snapshot(), &before);
    }

    #[test]
    fn hidden_files_follow_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".secret"), "").unwrap();
        fs::write(tmp.path().join("shown.txt"), "").unwrap();

        let (store, _) = store_for(&tmp, 50);
        assert_eq!(names(&store), vec!["shown.txt"]);

        let mut config = config_for(&tmp, 50);
        config.show_hidden_files = true;
        let mut with_hidden = ViewStore::new(config);
        with_hidden.refresh();
        assert_eq!(with_hidden.count(), 2);
    }

    #[test]
    fn rename_updates_item_list() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 1);
        let (mut store, _) = store_for(&tmp, 50);
        let original = store.items()[0].clone();

        store.rename(&original, "renamed.txt").unwrap();

        assert_eq!(names(&store), vec!["renamed.txt"]);
        assert!(store.find(original.path()).is_none());
    }

    #[test]
    fn rename_trims_whitespace() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 1);
        let (mut store, _) = store_for(&tmp, 50);
        let original = store.items()[0].clone();

        store.rename(&original, "  newname.txt  ").unwrap();

        assert_eq!(names(&store), vec!["newname.txt"]);
    }

    #[test]
    fn rename_to_same_name_is_noop() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 1);
        let (mut store, ops) = store_for(&tmp, 50);
        let original = store.items()[0].clone();

        store.rename(&original, original.name()).unwrap();
        store.rename(&original, &format!("  {}\t", original.name())).unwrap();

        assert!(ops.calls().is_empty());
        assert_eq!(store.items()[0].name(), original.name());
    }

    #[test]
    fn rename_blank_name_fails_validation() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 1);
        let (mut store, ops) = store_for(&tmp, 50);
        let original = store.items()[0].clone();

        for blank in ["", "   ", "\t\n  "] {
            let result = store.rename(&original, blank);
            assert!(matches!(result, Err(CoreError::Validation(_))));
        }

        assert!(ops.calls().is_empty());
        assert_eq!(store.items()[0].name(), original.name());
    }

    #[test]
    fn rename_onto_existing_file_fails() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 2);
        let (mut store, _) = store_for(&tmp, 50);
        let target = store.items()[0].clone();
        let other = store.items()[1].clone();
        let before = store.snapshot().clone();

        let result = store.rename(&target, other.name());

        assert!(matches!(result, Err(CoreError::AlreadyExists(_))));
        assert_eq!(store.snapshot(), &before);
        store.refresh();
        assert!(store.find(target.path()).is_some());
        assert_eq!(fs::read_to_string(other.path()).unwrap(), "content 0");
    }

    #[test]
    fn rename_vanished_file_fails() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 1);
        let (mut store, _) = store_for(&tmp, 50);
        let ghost = Item::from_parts(tmp.path().join("ghost.txt"), 0, SystemTime::now(), false);

        let result = store.rename(&ghost, "new.txt");

        assert!(matches!(result, Err(CoreError::NotFound(_))));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn delete_removes_item() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 3);
        let (mut store, ops) = store_for(&tmp, 50);
        let victim = store.items()[1].clone();

        store.delete(&victim).unwrap();

        assert_eq!(store.count(), 2);
        assert!(store.find(victim.path()).is_none());
        store.refresh();
        assert!(store.find(victim.path()).is_none());
        assert_eq!(ops.calls().len(), 1);
    }

    #[test]
    fn failed_delete_leaves_snapshot() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 2);
        let ops = RecordingOps {
            fail_trash: true,
            ..RecordingOps::default()
        };
        let mut store = ViewStore::new(config_for(&tmp, 50)).with_file_operations(ops);
        store.refresh();
        let before = store.snapshot().clone();
        let victim = store.items()[0].clone();

        let result = store.delete(&victim);

        assert!(matches!(result, Err(CoreError::OperationFailed { .. })));
        assert_eq!(store.snapshot(), &before);
        assert!(victim.path().exists());
    }

    #[test]
    fn copy_reference_passes_path_through() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 1);
        let (store, ops) = store_for(&tmp, 50);
        let item = store.items()[0].clone();

        store.copy_reference(&item).unwrap();

        assert_eq!(ops.calls(), vec![format!("copy {}", item.path().display())]);
    }

    #[test]
    fn refresh_emits_snapshot_changed_once() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 2);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut store = ViewStore::new(config_for(&tmp, 50)).with_events(tx);

        store.refresh();
        store.refresh();

        match rx.try_recv() {
            Ok(Event::SnapshotChanged { items }) => assert_eq!(items.len(), 2),
            other => panic!("expected SnapshotChanged, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn thumbnails_follow_snapshot() {
        let tmp = TempDir::new().unwrap();
        make_files(&tmp, 3);
        let (thumb_tx, mut thumb_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let mut store = ViewStore::new(config_for(&tmp, 2))
            .with_file_operations(RecordingOps::default())
            .with_thumbnails(ThumbnailCache::new(Arc::new(OnePixel), 64, thumb_tx))
            .with_events(event_tx);

        store.refresh();
        assert_eq!(store.thumbnails().len(), 2);

        for _ in 0..2 {
            let result = thumb_rx.recv().await.unwrap();
            store.apply_thumbnail(result);
        }
        let newest = store.items()[0].clone();
        assert!(store.thumbnail(&newest).is_some());

        let mut ready = 0;
        while let Ok(event) = event_rx.try_recv() {
            if matches!(event, Event::ThumbnailReady { .. }) {
                ready += 1;
            }
        }
        assert_eq!(ready, 2);

        store.delete(&newest).unwrap();

        // the dropped item is evicted, the item that slid into view is requested
        assert!(store.thumbnail(&newest).is_none());
        assert_eq!(store.thumbnails().len(), 2);
        assert!(store.thumbnails().is_pending(&store.items()[1]));
    }
}
