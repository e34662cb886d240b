//! shlf core library: UI-agnostic logic for a live view of one folder.
//!
//! `shlf-core` keeps a bounded, newest-first list of a directory's entries
//! consistent with disk, caches their thumbnails, and performs the
//! mutations (trash, rename, copy reference) a frontend asks for. It does
//! not watch the filesystem itself; the daemon feeds it refresh requests.
//!
//! # Modules
//!
//! - [`fs`]: [`Item`], directory listing, file operations, preview generation.
//! - [`view`]: [`ViewStore`], [`Snapshot`] and the [`ThumbnailCache`].
//! - [`config`]: User-facing configuration (TOML).
//! - [`event`]: Command and event types for UI ↔ Core communication.
//! - [`error`]: Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod config;
pub mod error;
pub mod event;
pub mod fs;
pub mod view;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use event::{Command, Event};
pub use fs::entry::{format_relative_age, Item};
pub use fs::ops::{list_directory, FileOperations, SystemFileOperations};
pub use fs::preview::{ImagePreviewGenerator, PreviewGenerator, Thumbnail, DEFAULT_THUMBNAIL_SIZE};
pub use view::{Snapshot, ThumbnailCache, ThumbnailKey, ThumbnailResult, ViewStore};
