//! Line-oriented rendering of core events for stdout.

use std::path::Path;
use std::time::SystemTime;

use serde::Serialize;
use shlf_core::{format_relative_age, Event, Item};

/// How events are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A human-readable table per snapshot.
    Table,
    /// One JSON object per line.
    Json,
}

#[derive(Serialize)]
struct JsonItem<'a> {
    name: &'a str,
    path: &'a Path,
    size: u64,
    /// Seconds since the Unix epoch.
    modified: u64,
    is_dir: bool,
    is_video: bool,
}

impl<'a> From<&'a Item> for JsonItem<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            name: item.name(),
            path: item.path(),
            size: item.size(),
            modified: item
                .modified()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            is_dir: item.is_dir(),
            is_video: item.is_video(),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonEvent<'a> {
    Snapshot { items: Vec<JsonItem<'a>> },
    Thumbnail { path: &'a Path, width: u32, height: u32 },
    Done { operation: &'a str },
    Failed { operation: &'a str, error: &'a str },
}

impl<'a> From<&'a Event> for JsonEvent<'a> {
    fn from(event: &'a Event) -> Self {
        match event {
            Event::SnapshotChanged { items } => JsonEvent::Snapshot {
                items: items.iter().map(JsonItem::from).collect(),
            },
            Event::ThumbnailReady { path, thumbnail } => JsonEvent::Thumbnail {
                path,
                width: thumbnail.width,
                height: thumbnail.height,
            },
            Event::OperationComplete { operation } => JsonEvent::Done { operation },
            Event::OperationFailed { operation, error } => JsonEvent::Failed { operation, error },
        }
    }
}

/// Renders `event` for stdout. Returns `None` for events not shown in
/// this format.
pub fn render_event(event: &Event, format: OutputFormat, now: SystemTime) -> Option<String> {
    match format {
        OutputFormat::Json => match serde_json::to_string(&JsonEvent::from(event)) {
            Ok(line) => Some(line),
            Err(e) => {
                tracing::error!("failed to serialize event: {e}");
                None
            }
        },
        OutputFormat::Table => match event {
            Event::SnapshotChanged { items } => Some(render_table(items, now)),
            // thumbnails have no textual representation
            Event::ThumbnailReady { .. } => None,
            Event::OperationComplete { operation } => Some(format!("ok: {operation}")),
            Event::OperationFailed { operation, error } => {
                Some(format!("error: {operation}: {error}"))
            }
        },
    }
}

/// Formats a snapshot as aligned columns of name, size and age.
pub fn render_table(items: &[Item], now: SystemTime) -> String {
    if items.is_empty() {
        return "(empty)".to_string();
    }

    let rows: Vec<(String, String, String)> = items
        .iter()
        .map(|item| {
            let name = if item.is_dir() {
                format!("{}/", item.name())
            } else {
                item.name().to_string()
            };
            let size = if item.is_dir() {
                "-".to_string()
            } else {
                format_size(item.size())
            };
            (name, size, format_relative_age(item.modified(), now))
        })
        .collect();

    let name_width = rows.iter().map(|(n, _, _)| n.chars().count()).max().unwrap_or(0);
    let size_width = rows.iter().map(|(_, s, _)| s.len()).max().unwrap_or(0);

    rows.iter()
        .map(|(name, size, age)| format!("{name:<name_width$}  {size:>size_width$}  {age}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats a byte count into a human-readable string.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
