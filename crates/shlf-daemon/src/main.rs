//! shlf — a live view of the newest files in one folder.
//!
//! This binary loads the configuration, starts the coordinator that keeps
//! the view in sync with disk, prints every snapshot to stdout and reads
//! commands from stdin until `quit`, Ctrl-C or shutdown.

mod coordinator;
mod input;
mod output;
mod watcher;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use anyhow::Context;
use shlf_core::{
    Command, Config, Event, ImagePreviewGenerator, Item, ThumbnailCache, ViewStore,
    DEFAULT_THUMBNAIL_SIZE,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::coordinator::Coordinator;
use crate::input::{parse_line, resolve_action, Resolved};
use crate::output::{render_event, OutputFormat};

const USAGE: &str = "usage: shlf [--config <path>] [--json] [--verbose] [folder]";

/// Command-line options.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    json: bool,
    verbose: bool,
    folder: Option<String>,
    help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--json" => parsed.json = true,
            "--verbose" | "-v" => parsed.verbose = true,
            "--help" | "-h" => parsed.help = true,
            flag if flag.starts_with('-') => anyhow::bail!("unknown option {flag}\n{USAGE}"),
            _ if parsed.folder.is_some() => anyhow::bail!("only one folder can be watched\n{USAGE}"),
            _ => parsed.folder = Some(arg),
        }
    }
    Ok(parsed)
}

/// Logs go to a file so they never interleave with the snapshot output.
fn init_tracing(verbose: bool) -> anyhow::Result<PathBuf> {
    let log_path = std::env::temp_dir().join("shlf.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(log_path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }
    let log_path = init_tracing(args.verbose)?;

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path);
    if let Some(folder) = args.folder {
        config.watched_folder = folder;
    }
    tracing::info!(
        "shlf starting: folder={}, max_items={}, config={}",
        config.resolved_folder().display(),
        config.max_items,
        config_path.display()
    );
    eprintln!(
        "watching {} (logs: {})",
        config.resolved_folder().display(),
        log_path.display()
    );

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (thumb_tx, thumb_rx) = mpsc::unbounded_channel();

    let thumbnails = ThumbnailCache::new(
        Arc::new(ImagePreviewGenerator),
        DEFAULT_THUMBNAIL_SIZE,
        thumb_tx,
    );
    let store = ViewStore::new(config)
        .with_thumbnails(thumbnails)
        .with_events(event_tx.clone());
    let coordinator = Coordinator::new(store, thumb_rx, command_rx, event_tx);
    let task = tokio::spawn(coordinator.run());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut shutting_down = false;
    let mut items: Vec<Item> = Vec::new();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                // every sender is gone once the coordinator has stopped
                let Some(event) = event else { break };
                if let Event::SnapshotChanged { items: latest } = &event {
                    items = latest.clone();
                }
                if let Some(text) = render_event(&event, format, SystemTime::now()) {
                    println!("{text}");
                    if format == OutputFormat::Table && matches!(event, Event::SnapshotChanged { .. }) {
                        println!();
                    }
                }
            }
            line = lines.next_line(), if stdin_open && !shutting_down => match line {
                Ok(Some(line)) => match parse_line(&line) {
                    Ok(None) => {}
                    Ok(Some(action)) => match resolve_action(action, &items) {
                        Ok(Resolved::Command(command)) => {
                            let _ = command_tx.send(command);
                        }
                        Ok(Resolved::Quit) => {
                            shutting_down = true;
                            let _ = command_tx.send(Command::Shutdown);
                        }
                        Err(e) => eprintln!("{e}"),
                    },
                    Err(e) => eprintln!("{e}"),
                },
                Ok(None) => {
                    tracing::debug!("stdin closed; running until interrupted");
                    stdin_open = false;
                }
                Err(e) => {
                    tracing::warn!("failed to read stdin: {e}");
                    stdin_open = false;
                }
            },
            _ = &mut ctrl_c, if !shutting_down => {
                shutting_down = true;
                let _ = command_tx.send(Command::Shutdown);
            }
        }
    }

    task.await.context("coordinator task failed")?;
    tracing::info!("shlf stopped");
    Ok(())
}
