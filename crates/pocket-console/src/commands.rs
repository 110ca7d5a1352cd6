//! Command table and evaluation.
//!
//! Commands are matched on the trimmed, lower-cased line. Exact names come
//! from [`COMMANDS`]; `echo ` is the only prefix command. Adding a canned
//! command means adding a row to the table.

use time::macros::format_description;
use time::OffsetDateTime;

use crate::TERMINAL_VERSION;

const ECHO_PREFIX: &str = "echo ";
const DEMO_LISTING: &str = "index.html  style.css  script.js  README.md";
const DEMO_CWD: &str = "/home/developer/projects/ai-ide";
const DEMO_USER: &str = "developer";
const ENGINE_NOTE: &str = "Node.js simulator";

/// Outcome of evaluating one non-empty line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Text for an `output` entry.
    Output(String),
    /// Text for an `error` entry.
    Error(String),
    /// Replace the whole transcript with the startup banner.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Help,
    Reset,
    Now,
    Text(&'static str),
    Version,
    /// Listed in help, resolved by prefix rather than exact name.
    Echo,
}

/// One row of the command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Command key as typed (lower case).
    pub name: &'static str,
    /// One-line description for `help`.
    pub description: &'static str,
    action: Action,
}

/// Recognized commands, in `help` order.
pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "help",
        description: "Show this help message",
        action: Action::Help,
    },
    CommandSpec {
        name: "clear",
        description: "Clear terminal",
        action: Action::Reset,
    },
    CommandSpec {
        name: "date",
        description: "Show current date and time",
        action: Action::Now,
    },
    CommandSpec {
        name: "echo",
        description: "Echo text (e.g., echo hello)",
        action: Action::Echo,
    },
    CommandSpec {
        name: "whoami",
        description: "Display current user",
        action: Action::Text(DEMO_USER),
    },
    CommandSpec {
        name: "ls",
        description: "List files (demo)",
        action: Action::Text(DEMO_LISTING),
    },
    CommandSpec {
        name: "pwd",
        description: "Print working directory",
        action: Action::Text(DEMO_CWD),
    },
    CommandSpec {
        name: "version",
        description: "Show terminal version",
        action: Action::Version,
    },
];

impl CommandSpec {
    fn run(&self, now: impl FnOnce() -> OffsetDateTime) -> Option<CommandResult> {
        let result = match self.action {
            Action::Help => CommandResult::Output(help_text()),
            Action::Reset => CommandResult::Reset,
            Action::Now => CommandResult::Output(format_timestamp(now())),
            Action::Text(text) => CommandResult::Output(text.to_string()),
            Action::Version => CommandResult::Output(format!("{TERMINAL_VERSION}\n{ENGINE_NOTE}")),
            Action::Echo => return None,
        };
        Some(result)
    }
}

/// Evaluate one raw line. `None` for a blank line.
///
/// `now` is only called for `date`.
pub fn evaluate(raw: &str, now: impl FnOnce() -> OffsetDateTime) -> Option<CommandResult> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let key = trimmed.to_lowercase();

    let exact = COMMANDS
        .iter()
        .find(|spec| spec.name == key)
        .and_then(|spec| spec.run(now));
    if exact.is_some() {
        return exact;
    }

    if key.starts_with(ECHO_PREFIX) {
        // Offset into the untrimmed line, so leading spaces shift the cut.
        let suffix = raw.get(ECHO_PREFIX.len()..).unwrap_or_default();
        return Some(CommandResult::Output(suffix.to_string()));
    }

    Some(CommandResult::Error(format!(
        "Command not found: {key}\nType 'help' for available commands"
    )))
}

/// Multi-line listing of every command with its description.
#[must_use]
pub fn help_text() -> String {
    let mut text = String::from("Available commands:");
    for spec in COMMANDS {
        text.push_str(&format!("\n  {:<8} - {}", spec.name, spec.description));
    }
    text
}

/// Human-readable local timestamp, e.g. `Fri Oct 16 2026 14:03:09 GMT+0200`.
#[must_use]
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!(
        "[weekday repr:short] [month repr:short] [day] [year] [hour]:[minute]:[second] GMT[offset_hour sign:mandatory][offset_minute]"
    );
    at.format(format).unwrap_or_else(|_| at.to_string())
}
