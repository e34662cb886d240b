//! Parses stdin command lines into core [`Command`]s.

use shlf_core::{Command, Item};

/// Separator between the current and the new name in a `rename` line.
const RENAME_SEPARATOR: &str = " => ";

/// A parsed input line, before item names are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Refresh,
    Delete(String),
    Rename { name: String, new_name: String },
    Copy(String),
    Quit,
}

/// Parses one input line.
///
/// Returns `Ok(None)` for blank lines. Names are taken verbatim after the
/// keyword, so they may contain spaces.
pub fn parse_line(line: &str) -> Result<Option<InputAction>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    let action = match keyword {
        "refresh" | "r" => InputAction::Refresh,
        "quit" | "q" | "exit" => InputAction::Quit,
        "delete" | "rm" => InputAction::Delete(required_name(keyword, rest)?),
        "copy" | "cp" => InputAction::Copy(required_name(keyword, rest)?),
        "rename" | "mv" => {
            let (name, new_name) = rest
                .split_once(RENAME_SEPARATOR)
                .ok_or_else(|| format!("usage: {keyword} <name>{RENAME_SEPARATOR}<new name>"))?;
            // the new name is passed untrimmed; the core trims and validates it
            InputAction::Rename {
                name: required_name(keyword, name)?,
                new_name: new_name.to_string(),
            }
        }
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(action))
}

fn required_name(keyword: &str, rest: &str) -> Result<String, String> {
    let name = rest.trim();
    if name.is_empty() {
        return Err(format!("usage: {keyword} <name>"));
    }
    Ok(name.to_string())
}

/// What the main loop should do with a parsed action.
#[derive(Debug)]
pub enum Resolved {
    /// Forward to the coordinator.
    Command(Command),
    /// Shut down.
    Quit,
}

/// Resolves item names in `action` against the last snapshot seen.
pub fn resolve_action(action: InputAction, items: &[Item]) -> Result<Resolved, String> {
    let find = |name: &str| {
        items
            .iter()
            .find(|item| item.name() == name)
            .cloned()
            .ok_or_else(|| format!("no item named {name:?} in view"))
    };

    let command = match action {
        InputAction::Refresh => Command::Refresh,
        InputAction::Quit => return Ok(Resolved::Quit),
        InputAction::Delete(name) => Command::Delete(find(&name)?),
        InputAction::Copy(name) => Command::CopyReference(find(&name)?),
        InputAction::Rename { name, new_name } => Command::Rename(find(&name)?, new_name),
    };
    Ok(Resolved::Command(command))
}
