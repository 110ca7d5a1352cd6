//! Single-buffer scratch editor.

const DEFAULT_SCRATCH: &str = include_str!("assets/defaults/scratch.js");

/// File name offered when the scratch buffer is saved.
pub const SCRATCH_FILE_NAME: &str = "code.js";

/// Plain JavaScript buffer backing the editor panel. Nothing here runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchEditor {
    text: String,
}

impl ScratchEditor {
    /// Editor holding the greeting starter snippet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: DEFAULT_SCRATCH.to_string(),
        }
    }

    /// Current buffer text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the buffer verbatim.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// File name and content for a download.
    #[must_use]
    pub fn export(&self) -> (&'static str, &str) {
        (SCRATCH_FILE_NAME, &self.text)
    }
}

impl Default for ScratchEditor {
    fn default() -> Self {
        Self::new()
    }
}
