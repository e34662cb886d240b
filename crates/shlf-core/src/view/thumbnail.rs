//! Thumbnail acquisition and caching.
//!
//! Fetches run as tokio tasks through a [`PreviewGenerator`]. Their results
//! come back to the owner of the view store as [`ThumbnailResult`] messages
//! and are applied there with [`ThumbnailCache::complete`], so the cache
//! itself is only ever touched from one place.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;

use crate::error::CoreResult;
use crate::fs::entry::Item;
use crate::fs::preview::{PreviewGenerator, Thumbnail};

/// Cache key: item identity + modification time.
///
/// Including the time means a path reused by a different file (or a file
/// rewritten in place) never gets served the old preview.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbnailKey {
    path: PathBuf,
    modified: SystemTime,
}

impl ThumbnailKey {
    pub fn of(item: &Item) -> Self {
        Self {
            path: item.path().to_path_buf(),
            modified: item.modified(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A finished fetch, sent from the fetch task back to the cache owner.
#[derive(Debug)]
pub struct ThumbnailResult {
    pub key: ThumbnailKey,
    pub outcome: CoreResult<Thumbnail>,
}

#[derive(Debug)]
enum Entry {
    Pending(AbortHandle),
    Ready(Thumbnail),
}

struct Fetcher {
    generator: Arc<dyn PreviewGenerator>,
    target_size: u32,
    tx: UnboundedSender<ThumbnailResult>,
}

/// Maps item keys to pending or resolved thumbnails.
///
/// A key is either absent, pending (exactly one fetch in flight) or
/// resolved. Failed fetches leave the key absent; it is not retried until
/// it leaves the view and comes back or its modification time changes.
pub struct ThumbnailCache {
    entries: HashMap<ThumbnailKey, Entry>,
    fetcher: Option<Fetcher>,
}

impl Default for ThumbnailCache {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ThumbnailCache {
    /// A cache that never fetches. Lookups always miss.
    pub fn disabled() -> Self {
        Self {
            entries: HashMap::new(),
            fetcher: None,
        }
    }

    /// A cache that fetches through `generator` and reports on `tx`.
    pub fn new(
        generator: Arc<dyn PreviewGenerator>,
        target_size: u32,
        tx: UnboundedSender<ThumbnailResult>,
    ) -> Self {
        Self {
            entries: HashMap::new(),
            fetcher: Some(Fetcher {
                generator,
                target_size,
                tx,
            }),
        }
    }

    /// Starts a fetch for `item` unless its key is already pending or resolved.
    ///
    /// Returns `true` if a new fetch was spawned. Directories, disabled
    /// caches and calls made outside a tokio runtime spawn nothing.
    pub fn request(&mut self, item: &Item) -> bool {
        let Some(fetcher) = &self.fetcher else {
            return false;
        };
        if item.is_dir() {
            return false;
        }
        let key = ThumbnailKey::of(item);
        if self.entries.contains_key(&key) {
            return false;
        }
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!("no runtime for thumbnail fetch: {e}");
                return false;
            }
        };

        let generator = Arc::clone(&fetcher.generator);
        let tx = fetcher.tx.clone();
        let target_size = fetcher.target_size;
        let task_key = key.clone();
        let task = handle.spawn(async move {
            let outcome = generator
                .generate_preview(task_key.path(), target_size)
                .await;
            let _ = tx.send(ThumbnailResult {
                key: task_key,
                outcome,
            });
        });

        self.entries.insert(key, Entry::Pending(task.abort_handle()));
        true
    }

    /// Applies a finished fetch. Returns the thumbnail if it was stored.
    ///
    /// Results for keys that are no longer pending (evicted, or already
    /// resolved) are discarded.
    pub fn complete(&mut self, result: ThumbnailResult) -> Option<Thumbnail> {
        if !matches!(self.entries.get(&result.key), Some(Entry::Pending(_))) {
            tracing::trace!("dropping stale thumbnail for {}", result.key.path.display());
            return None;
        }
        match result.outcome {
            Ok(thumbnail) => {
                self.entries
                    .insert(result.key, Entry::Ready(thumbnail.clone()));
                Some(thumbnail)
            }
            Err(e) => {
                tracing::debug!("no thumbnail for {}: {e}", result.key.path.display());
                self.entries.remove(&result.key);
                None
            }
        }
    }

    /// Removes `key`, aborting its fetch if one is in flight.
    pub fn evict(&mut self, key: &ThumbnailKey) {
        if let Some(Entry::Pending(task)) = self.entries.remove(key) {
            task.abort();
        }
    }

    /// Returns the resolved thumbnail for `item`, if any.
    pub fn get(&self, item: &Item) -> Option<&Thumbnail> {
        match self.entries.get(&ThumbnailKey::of(item)) {
            Some(Entry::Ready(thumbnail)) => Some(thumbnail),
            _ => None,
        }
    }

    /// Returns `true` if a fetch for `item` is in flight.
    pub fn is_pending(&self, item: &Item) -> bool {
        matches!(
            self.entries.get(&ThumbnailKey::of(item)),
            Some(Entry::Pending(_))
        )
    }

    /// Number of pending plus resolved entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evicts everything, aborting in-flight fetches.
    pub fn clear(&mut self) {
        for (_, entry) in self.entries.drain() {
            if let Entry::Pending(task) = entry {
                task.abort();
            }
        }
    }
}

impl Drop for ThumbnailCache {
    fn drop(&mut self) {
        self.clear();
    }
}
