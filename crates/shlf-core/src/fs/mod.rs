//! File system abstractions for shlf.
//!
//! This module provides the [`entry::Item`] type, directory listing
//! ([`ops::list_directory`]), the [`ops::FileOperations`] seam for trash,
//! move and clipboard, and preview generation ([`preview::PreviewGenerator`]).

pub mod clipboard;
pub mod entry;
pub mod ops;
pub mod preview;

pub use entry::{format_relative_age, is_video, Item};
pub use ops::{list_directory, validate_new_name, FileOperations, SystemFileOperations};
pub use preview::{ImagePreviewGenerator, PreviewGenerator, Thumbnail, DEFAULT_THUMBNAIL_SIZE};
