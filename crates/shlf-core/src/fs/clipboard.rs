//! System clipboard access through whichever command-line tool is installed.

use std::io::Write;
use std::process::{Command, Stdio};

/// Clipboard tools tried in order, with the arguments that make them read stdin.
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
];

/// Copies `text` to the system clipboard.
///
/// `wl-copy` is only attempted under Wayland.
///
/// # Errors
///
/// Returns a message when no clipboard tool accepted the text.
pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let wayland = std::env::var("WAYLAND_DISPLAY").is_ok();

    for (cmd, args) in CLIPBOARD_TOOLS {
        if *cmd == "wl-copy" && !wayland {
            continue;
        }
        if pipe_to(cmd, args, text) {
            tracing::debug!("copied {} bytes to clipboard via {cmd}", text.len());
            return Ok(());
        }
    }

    Err("no clipboard tool available".to_string())
}

fn pipe_to(cmd: &str, args: &[&str], text: &str) -> bool {
    let mut child = match Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(c) => c,
        Err(_) => return false,
    };

    let written = child
        .stdin
        .take()
        .map(|mut stdin| stdin.write_all(text.as_bytes()).is_ok())
        .unwrap_or(false);

    match child.wait() {
        Ok(status) => written && status.success(),
        Err(_) => false,
    }
}
