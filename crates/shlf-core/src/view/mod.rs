//! The live view of the watched folder.
//!
//! [`store::ViewStore`] owns the current [`snapshot::Snapshot`] and the
//! [`thumbnail::ThumbnailCache`], and is the only place either changes.

pub mod snapshot;
pub mod store;
pub mod thumbnail;

pub use snapshot::{Snapshot, SnapshotDiff};
pub use store::ViewStore;
pub use thumbnail::{ThumbnailCache, ThumbnailKey, ThumbnailResult};
