//! Markup, style and script buffers.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

const DEFAULT_MARKUP: &str = include_str!("assets/defaults/index.html");
const DEFAULT_STYLE: &str = include_str!("assets/defaults/style.css");
const DEFAULT_SCRIPT: &str = include_str!("assets/defaults/script.js");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Markup,
    Style,
    Script,
}

impl BufferKind {
    pub const ALL: [Self; 3] = [Self::Markup, Self::Style, Self::Script];

    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "html" | "markup" => Some(Self::Markup),
            "css" | "style" => Some(Self::Style),
            "js" | "javascript" | "script" => Some(Self::Script),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::Style => "css",
            Self::Script => "js",
        }
    }

    /// File name the buffer would have in a project folder.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Markup => "index.html",
            Self::Style => "style.css",
            Self::Script => "script.js",
        }
    }
}

/// The three user-authored buffers. Any text is accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentBuffers {
    #[serde(rename = "html")]
    pub markup: String,
    #[serde(rename = "css")]
    pub style: String,
    #[serde(rename = "js")]
    pub script: String,
}

impl DocumentBuffers {
    #[must_use]
    pub fn new(
        markup: impl Into<String>,
        style: impl Into<String>,
        script: impl Into<String>,
    ) -> Self {
        Self {
            markup: markup.into(),
            style: style.into(),
            script: script.into(),
        }
    }

    #[must_use]
    pub fn get(&self, kind: BufferKind) -> &str {
        match kind {
            BufferKind::Markup => &self.markup,
            BufferKind::Style => &self.style,
            BufferKind::Script => &self.script,
        }
    }

    pub fn set(&mut self, kind: BufferKind, text: impl Into<String>) {
        let text = text.into();
        match kind {
            BufferKind::Markup => self.markup = text,
            BufferKind::Style => self.style = text,
            BufferKind::Script => self.script = text,
        }
    }

    /// Total byte length across all three buffers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markup.len() + self.style.len() + self.script.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DocumentBuffers {
    /// Starter page shown when the playground opens without a template.
    fn default() -> Self {
        Self::new(DEFAULT_MARKUP, DEFAULT_STYLE, DEFAULT_SCRIPT)
    }
}
