//! Event system for communication between the presentation layer and core.
//!
//! The presentation layer translates user input into [`Command`]s, which
//! the single owner of the view store applies in order and answers with
//! [`Event`]s. This decoupling allows any frontend to drive the same core.

use std::path::PathBuf;

use crate::fs::entry::Item;
use crate::fs::preview::Thumbnail;

/// An action the presentation layer requests the core to perform.
///
/// Commands flow **UI → Core**. The core never creates commands itself.
#[derive(Debug, Clone)]
pub enum Command {
    /// Re-read the watched directory now.
    Refresh,
    /// Move the item to the trash.
    Delete(Item),
    /// Rename the item within its directory.
    Rename(Item, String),
    /// Put a reference to the item on the clipboard.
    CopyReference(Item),
    /// Stop watching and shut the owner down.
    Shutdown,
}

/// A notification the core sends back to the presentation layer.
///
/// Events flow **Core → UI**. The UI uses these to update its display state.
#[derive(Debug, Clone)]
pub enum Event {
    /// The snapshot was replaced.
    SnapshotChanged {
        /// The new snapshot, newest first.
        items: Vec<Item>,
    },
    /// A thumbnail finished generating for the item at `path`.
    ThumbnailReady {
        path: PathBuf,
        thumbnail: Thumbnail,
    },
    /// A mutation completed successfully.
    OperationComplete {
        /// Human-readable description of the operation.
        operation: String,
    },
    /// A mutation failed. The snapshot was left untouched.
    OperationFailed {
        /// Human-readable description of the operation.
        operation: String,
        /// The error message.
        error: String,
    },
}
