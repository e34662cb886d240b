//! Directory item representation.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use unicode_normalization::UnicodeNormalization;

/// File extensions classified as video.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "avi", "mkv", "webm", "wmv", "flv", "mpg", "mpeg", "3gp", "ts", "mts",
    "m2ts", "ogv",
];

/// A single entry of the watched directory.
///
/// `Item` is immutable. Each refresh builds fresh values, so a file that
/// changed on disk shows up as a new `Item` at the same [`Item::path`].
/// The path is the item's identity: it keys the snapshot and, together
/// with [`Item::modified`], the thumbnail cache.
///
/// # Examples
///
/// ```no_run
/// use shlf_core::Item;
/// use std::fs;
///
/// let metadata = fs::metadata("Cargo.toml").unwrap();
/// let item = Item::new("Cargo.toml".into(), &metadata);
/// assert_eq!(item.name(), "Cargo.toml");
/// assert!(!item.is_video());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    path: PathBuf,
    name: String,
    size: u64,
    modified: SystemTime,
    is_dir: bool,
}

impl Item {
    /// Creates a new `Item` from a path and its metadata.
    ///
    /// Directory sizes are set to `0`. A missing modification time is
    /// reported as the Unix epoch, which sorts the item last.
    pub fn new(path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        let name = display_name(&path);
        Self {
            path,
            name,
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            modified: metadata.modified().unwrap_or(UNIX_EPOCH),
            is_dir: metadata.is_dir(),
        }
    }

    /// Creates an `Item` from explicit attribute values.
    ///
    /// Useful for callers that already hold metadata, and for items that
    /// may no longer exist on disk.
    pub fn from_parts(path: PathBuf, size: u64, modified: SystemTime, is_dir: bool) -> Self {
        let name = display_name(&path);
        Self {
            path,
            name,
            size: if is_dir { 0 } else { size },
            modified,
            is_dir,
        }
    }

    /// Returns the full path, which is also the item's identity.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the display name (last path component, NFC-normalised).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the file size in bytes. Always `0` for directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the last-modified time.
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Returns `true` if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Returns `true` if the name starts with `.`.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// Returns `true` if the extension names a video container.
    pub fn is_video(&self) -> bool {
        !self.is_dir && is_video(&self.path)
    }
}

/// Returns `true` if the path has a recognised video extension.
pub fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Formats how long ago `time` was, relative to `now`, in abbreviated form.
///
/// Times in the future (clock skew) are reported as "just now".
pub fn format_relative_age(time: SystemTime, now: SystemTime) -> String {
    let elapsed = match now.duration_since(time) {
        Ok(d) => d,
        Err(_) => return "just now".to_owned(),
    };

    let secs = elapsed.as_secs();
    if secs < 60 {
        return format!("{secs}s ago");
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{mins}m ago");
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    let days = hours / 24;
    format!("{days}d ago")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().nfc().collect::<String>())
        .unwrap_or_default()
}
