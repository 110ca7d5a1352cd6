//! Shared styling helpers for CLI output.

use std::io::IsTerminal;

use owo_colors::OwoColorize;
use pocket_console::EntryKind;

fn should_color() -> bool {
    std::io::stdout().is_terminal()
}

pub fn error(text: impl AsRef<str>) -> String {
    let text = text.as_ref();
    if should_color() {
        format!("{}", text.red())
    } else {
        text.to_string()
    }
}

pub fn accent(text: impl AsRef<str>) -> String {
    let text = text.as_ref();
    if should_color() {
        format!("{}", text.cyan())
    } else {
        text.to_string()
    }
}

pub fn heading(text: impl AsRef<str>) -> String {
    let text = text.as_ref();
    if should_color() {
        format!("{}", text.bold())
    } else {
        text.to_string()
    }
}

/// Transcript line colored by entry kind.
pub fn entry(kind: EntryKind, text: &str) -> String {
    match kind {
        EntryKind::Input => accent(text),
        EntryKind::Output => text.to_string(),
        EntryKind::Error => error(text),
    }
}
