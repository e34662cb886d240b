//! Ordered, size-bounded snapshots of the watched directory.

use std::collections::HashSet;
use std::path::Path;

use crate::fs::entry::Item;
use crate::view::thumbnail::ThumbnailKey;

/// The items currently shown, newest first, at most `max_items` long.
///
/// Immutable: a refresh builds a new `Snapshot` and swaps it in whole, so
/// readers never observe a partially-updated list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    items: Vec<Item>,
}

/// Keys that entered and left the view between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// Items of the newer snapshot whose key was absent before, in snapshot order.
    pub added: Vec<Item>,
    /// Keys of the older snapshot that are gone from the newer one.
    pub removed: Vec<ThumbnailKey>,
}

impl Snapshot {
    /// Builds a snapshot from an unsorted directory listing.
    ///
    /// Sorts by modification time, newest first, then truncates to
    /// `max_items`. The sort is stable: items with equal times keep
    /// their enumeration order. There is no secondary key.
    pub fn from_listing(mut items: Vec<Item>, max_items: usize) -> Self {
        items.sort_by(|a, b| b.modified().cmp(&a.modified()));
        items.truncate(max_items);
        Self { items }
    }

    /// Returns the items, newest first.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Looks up an item by identity.
    pub fn find(&self, path: &Path) -> Option<&Item> {
        self.items.iter().find(|item| item.path() == path)
    }

    /// Computes which keys `newer` adds and which it drops relative to `self`.
    ///
    /// Keys are path + modification time, so a file rewritten in place
    /// counts as both removed (old version) and added (new version).
    pub fn diff(&self, newer: &Snapshot) -> SnapshotDiff {
        let old_keys: HashSet<ThumbnailKey> = self.items.iter().map(ThumbnailKey::of).collect();
        let new_keys: HashSet<ThumbnailKey> = newer.items.iter().map(ThumbnailKey::of).collect();

        let added = newer
            .items
            .iter()
            .filter(|item| !old_keys.contains(&ThumbnailKey::of(item)))
            .cloned()
            .collect();
        let removed = self
            .items
            .iter()
            .map(ThumbnailKey::of)
            .filter(|key| !new_keys.contains(key))
            .collect();

        SnapshotDiff { added, removed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, UNIX_EPOCH};

    fn item(name: &str, secs: u64) -> Item {
        Item::from_parts(
            PathBuf::from("/watched").join(name),
            0,
            UNIX_EPOCH + Duration::from_secs(secs),
            false,
        )
    }

    fn names(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.items().iter().map(|i| i.name()).collect()
    }

    #[test]
    fn sorts_newest_first() {
        let snapshot = Snapshot::from_listing(vec![item("a", 60), item("b", 120), item("c", 0)], 50);
        assert_eq!(names(&snapshot), vec!["b", "a", "c"]);
    }

    #[test]
    fn truncates_to_max_items() {
        let listing: Vec<Item> = (0..10).map(|i| item(&format!("f{i}"), i)).collect();

        let snapshot = Snapshot::from_listing(listing, 3);

        assert_eq!(snapshot.len(), 3);
        assert_eq!(names(&snapshot), vec!["f9", "f8", "f7"]);
    }

    #[test]
    fn equal_times_keep_enumeration_order() {
        let snapshot = Snapshot::from_listing(
            vec![item("z", 5), item("a", 5), item("m", 9), item("b", 5)],
            50,
        );
        assert_eq!(names(&snapshot), vec!["m", "z", "a", "b"]);
    }

    #[test]
    fn order_is_non_increasing() {
        let listing: Vec<Item> = [7, 3, 9, 3, 1, 9, 4]
            .iter()
            .enumerate()
            .map(|(i, s)| item(&format!("f{i}"), *s))
            .collect();

        let snapshot = Snapshot::from_listing(listing, 50);

        for pair in snapshot.items().windows(2) {
            assert!(pair[0].modified() >= pair[1].modified());
        }
    }

    #[test]
    fn empty_listing_gives_empty_snapshot() {
        let snapshot = Snapshot::from_listing(Vec::new(), 50);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn find_by_identity() {
        let snapshot = Snapshot::from_listing(vec![item("a", 1), item("b", 2)], 50);
        assert_eq!(
            snapshot.find(Path::new("/watched/a")).map(|i| i.name()),
            Some("a")
        );
        assert!(snapshot.find(Path::new("/watched/zzz")).is_none());
    }

    #[test]
    fn diff_reports_added_and_removed() {
        let old = Snapshot::from_listing(vec![item("keep", 1), item("gone", 2)], 50);
        let new = Snapshot::from_listing(vec![item("keep", 1), item("fresh", 3)], 50);

        let diff = old.diff(&new);

        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].name(), "fresh");
        assert_eq!(diff.removed, vec![ThumbnailKey::of(&item("gone", 2))]);
    }

    #[test]
    fn diff_treats_rewritten_file_as_new_key() {
        let old = Snapshot::from_listing(vec![item("doc", 1)], 50);
        let new = Snapshot::from_listing(vec![item("doc", 2)], 50);

        let diff = old.diff(&new);

        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.removed.len(), 1);
        assert_ne!(ThumbnailKey::of(&diff.added[0]), diff.removed[0]);
    }

    #[test]
    fn diff_of_identical_snapshots_is_empty() {
        let snapshot = Snapshot::from_listing(vec![item("a", 1), item("b", 2)], 50);
        assert_eq!(snapshot.diff(&snapshot.clone()), SnapshotDiff::default());
    }
}
