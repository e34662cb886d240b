//! Directory listing and the file operations the view store delegates to.

use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::fs::clipboard;
use crate::fs::entry::Item;

/// Lists the immediate children of `path` as [`Item`] values.
///
/// The directory path is canonicalised once, so every returned item's
/// path is canonical and usable as an identity. Entries are returned in
/// enumeration order (**unsorted**). Hidden entries (leading `.`) are
/// skipped unless `include_hidden` is set. Entries whose metadata cannot
/// be read (vanished mid-listing, broken permissions) are silently skipped.
///
/// # Errors
///
/// - [`CoreError::DirectoryUnavailable`]: the path does not exist, is not
///   a directory, or cannot be read.
///
/// # Examples
///
/// ```no_run
/// use shlf_core::list_directory;
/// use std::path::Path;
///
/// let items = list_directory(Path::new("/home/user/Desktop"), false).unwrap();
/// for item in &items {
///     println!("{}", item.name());
/// }
/// ```
pub fn list_directory(path: &Path, include_hidden: bool) -> CoreResult<Vec<Item>> {
    let unavailable = || CoreError::DirectoryUnavailable(path.to_path_buf());

    let dir = std::fs::canonicalize(path).map_err(|_| unavailable())?;
    if !dir.is_dir() {
        return Err(unavailable());
    }

    let read_dir = std::fs::read_dir(&dir).map_err(|e| {
        tracing::debug!("read_dir failed for {}: {e}", dir.display());
        unavailable()
    })?;

    let mut items = Vec::new();
    for dir_entry in read_dir {
        let dir_entry = match dir_entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !include_hidden && dir_entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let metadata = match dir_entry.metadata() {
            Ok(m) => m,
            Err(_) => continue,
        };
        items.push(Item::new(dir_entry.path(), &metadata));
    }

    Ok(items)
}

/// OS-level operations the view store performs on behalf of the user.
///
/// The store never touches the filesystem for mutations directly; it goes
/// through this trait so that trash, move and clipboard integrations can be
/// swapped (for tests or other platforms).
pub trait FileOperations: Send + Sync {
    /// Moves `path` to the OS trash / recycle bin.
    fn trash(&self, path: &Path) -> CoreResult<()>;

    /// Moves `src` to `dest`. Must fail if `dest` already exists.
    fn move_item(&self, src: &Path, dest: &Path) -> CoreResult<()>;

    /// Places a reference to `path` on the system clipboard.
    fn copy_reference(&self, path: &Path) -> CoreResult<()>;
}

/// [`FileOperations`] backed by the real OS: the `trash` crate, `rename(2)`
/// and whichever clipboard tool is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFileOperations;

impl FileOperations for SystemFileOperations {
    fn trash(&self, path: &Path) -> CoreResult<()> {
        // symlink_metadata: does NOT follow symlinks
        if std::fs::symlink_metadata(path).is_err() {
            return Err(CoreError::NotFound(path.to_path_buf()));
        }
        trash::delete(path).map_err(|e| CoreError::operation("trash", e))
    }

    fn move_item(&self, src: &Path, dest: &Path) -> CoreResult<()> {
        if std::fs::symlink_metadata(src).is_err() {
            return Err(CoreError::NotFound(src.to_path_buf()));
        }
        // rename(2) silently replaces an existing destination
        if std::fs::symlink_metadata(dest).is_ok() && !is_same_file(src, dest) {
            return Err(CoreError::AlreadyExists(dest.to_path_buf()));
        }
        std::fs::rename(src, dest)?;
        Ok(())
    }

    fn copy_reference(&self, path: &Path) -> CoreResult<()> {
        clipboard::copy_to_clipboard(&path.to_string_lossy())
            .map_err(|reason| CoreError::operation("copy", reason))
    }
}

/// Validates a user-supplied rename target and returns it trimmed.
///
/// # Errors
///
/// [`CoreError::Validation`] if the trimmed name is empty, is `.` or `..`,
/// or contains a path separator or NUL byte.
pub fn validate_new_name(new_name: &str) -> CoreResult<&str> {
    let trimmed = new_name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("name is empty".to_string()));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(CoreError::Validation(trimmed.to_string()));
    }
    if trimmed.contains('/') || trimmed.contains('\0') {
        return Err(CoreError::Validation(trimmed.to_string()));
    }
    #[cfg(windows)]
    if trimmed.contains('\\') || trimmed.contains(':') {
        return Err(CoreError::Validation(trimmed.to_string()));
    }
    Ok(trimmed)
}

/// Case-only renames on case-insensitive filesystems resolve `dest` to `src`.
fn is_same_file(src: &Path, dest: &Path) -> bool {
    match (std::fs::canonicalize(src), std::fs::canonicalize(dest)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
