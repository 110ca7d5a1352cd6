//! Transcript entries.

#![allow(missing_docs)]

use serde::Serialize;

use crate::TERMINAL_VERSION;

const BANNER_HINT: &str = "Type \"help\" for available commands";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Input,
    Output,
    Error,
}

impl EntryKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Error => "error",
        }
    }
}

/// One transcript record. `text` may span several display lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub text: String,
}

impl TranscriptEntry {
    #[must_use]
    pub fn input(text: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Input,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn output(text: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Output,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Error,
            text: text.into(),
        }
    }

    /// Display lines; each embedded line break starts a new one.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}

/// Ordered log of console activity. Entries are only appended, except for a
/// full reset back to the banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Transcript holding only the two-line startup banner.
    #[must_use]
    pub fn with_banner() -> Self {
        Self {
            entries: banner(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TranscriptEntry> {
        self.entries.iter()
    }

    pub(crate) fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn reset(&mut self) {
        self.entries = banner();
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::with_banner()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a TranscriptEntry;
    type IntoIter = std::slice::Iter<'a, TranscriptEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn banner() -> Vec<TranscriptEntry> {
    vec![
        TranscriptEntry::output(TERMINAL_VERSION),
        TranscriptEntry::output(BANNER_HINT),
    ]
}
