//! `pocket-playground` - HTML/CSS/JS playground with live-preview assembly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Markup, style and script buffers.
pub mod buffers;
/// Combined document assembly for preview and export.
pub mod document;
/// Playground engine state.
pub mod playground;
/// Single-buffer scratch editor.
pub mod scratch;
/// Built-in template catalog.
pub mod templates;

pub use buffers::{BufferKind, DocumentBuffers};
pub use document::{CombinedDocument, EXPORT_FILE_NAME, PREVIEW_SANDBOX};
pub use playground::Playground;
pub use scratch::ScratchEditor;
pub use templates::TemplateDescriptor;
