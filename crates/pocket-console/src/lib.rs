//! `pocket-console` - simulated terminal for the IDE shell.
//!
//! A fixed table of canned commands evaluated against an append-only
//! transcript. Nothing touches a real shell or filesystem.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Command table and evaluation.
pub mod commands;
/// Console state owning the transcript.
pub mod console;
/// Transcript entries.
pub mod transcript;

pub use commands::{evaluate, CommandResult, CommandSpec};
pub use console::{local_offset_clock, offset_clock, Clock, Console, Submission};
pub use transcript::{EntryKind, Transcript, TranscriptEntry};

/// Version banner line shown at startup and by `version`.
pub const TERMINAL_VERSION: &str = "AI IDE Terminal v1.0.0";
