//! Playground engine state.

use tracing::debug;

use crate::buffers::{BufferKind, DocumentBuffers};
use crate::document::{self, CombinedDocument, EXPORT_TITLE};
use crate::templates::TemplateDescriptor;

/// Owns the three buffers of one mounted playground panel.
///
/// Rendering is a pure function of the buffers; the stale flag only tells the
/// host whether its preview needs replacing.
#[derive(Debug, Clone)]
pub struct Playground {
    buffers: DocumentBuffers,
    stale: bool,
}

impl Playground {
    /// Playground seeded with the starter page.
    #[must_use]
    pub fn new() -> Self {
        Self::with_buffers(DocumentBuffers::default())
    }

    #[must_use]
    pub fn with_buffers(buffers: DocumentBuffers) -> Self {
        Self {
            buffers,
            stale: true,
        }
    }

    /// Playground seeded from a catalog template.
    #[must_use]
    pub fn from_template(template: &TemplateDescriptor) -> Self {
        debug!(template = template.id, "seeding playground from template");
        Self::with_buffers(template.buffers())
    }

    #[must_use]
    pub fn buffers(&self) -> &DocumentBuffers {
        &self.buffers
    }

    #[must_use]
    pub fn buffer(&self, kind: BufferKind) -> &str {
        self.buffers.get(kind)
    }

    /// Replace one buffer verbatim and mark the preview stale.
    pub fn set_buffer(&mut self, kind: BufferKind, text: impl Into<String>) {
        self.buffers.set(kind, text);
        self.stale = true;
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    #[must_use]
    pub fn render(&self) -> CombinedDocument {
        document::render(&self.buffers)
    }

    /// Render only if a buffer changed since the previous refresh.
    pub fn refresh_preview(&mut self) -> Option<CombinedDocument> {
        if !self.stale {
            return None;
        }
        self.stale = false;
        Some(self.render())
    }

    #[must_use]
    pub fn export_standalone(&self) -> String {
        document::export_standalone(&self.buffers, EXPORT_TITLE)
    }

    /// Consume the panel, handing back its buffers.
    #[must_use]
    pub fn into_buffers(self) -> DocumentBuffers {
        self.buffers
    }
}

impl Default for Playground {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;

    #[test]
    fn new_playground_starts_with_default_buffers_and_stale_preview() {
        let playground = Playground::new();
        assert_eq!(playground.buffers(), &DocumentBuffers::default());
        assert!(playground.is_stale());
    }

    #[test]
    fn refresh_yields_once_per_change() {
        let mut playground = Playground::new();
        let first = playground.refresh_preview().expect("initial preview");
        assert!(playground.refresh_preview().is_none());

        playground.set_buffer(BufferKind::Markup, "<p>changed</p>");
        let second = playground.refresh_preview().expect("preview after edit");
        assert_ne!(first, second);
        assert!(second.as_str().contains("<p>changed</p>"));
        assert!(playground.refresh_preview().is_none());
    }

    #[test]
    fn refresh_does_not_change_render_output() {
        let mut playground = Playground::new();
        let before = playground.render();
        let _ = playground.refresh_preview();
        assert_eq!(before, playground.render());
    }

    #[test]
    fn setting_identical_text_still_marks_stale() {
        let mut playground = Playground::new();
        let _ = playground.refresh_preview();
        let same = playground.buffer(BufferKind::Style).to_string();
        playground.set_buffer(BufferKind::Style, same);
        assert!(playground.is_stale());
    }

    #[test]
    fn empty_buffers_are_accepted() {
        let mut playground = Playground::new();
        for kind in BufferKind::ALL {
            playground.set_buffer(kind, "");
        }
        assert!(playground.buffers().is_empty());
        assert!(playground.render().as_str().contains("<body>\n\n<script>"));
    }

    #[test]
    fn template_seed_copies_all_three_fields() {
        let template = templates::find("interactive").expect("interactive template");
        let playground = Playground::from_template(template);
        assert_eq!(playground.buffer(BufferKind::Markup), template.html);
        assert_eq!(playground.buffer(BufferKind::Style), template.css);
        assert_eq!(playground.buffer(BufferKind::Script), template.js);
    }

    #[test]
    fn export_carries_title_and_buffers() {
        let mut playground = Playground::new();
        playground.set_buffer(BufferKind::Script, "alert(1);");
        let exported = playground.export_standalone();
        assert!(exported.contains("<title>My Project</title>"));
        assert!(exported.contains("alert(1);"));
        assert!(exported.contains(playground.buffer(BufferKind::Markup)));
    }
}
