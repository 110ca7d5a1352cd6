//! Combined document assembly.
//!
//! The engine never parses or executes any of the buffers. It splices them
//! into a fixed skeleton: the style buffer inside `<style>`, the markup buffer
//! inside `<body>`, and the script buffer inside a `try`/`catch` block so a
//! thrown error is reported to the console instead of aborting the page.
//! Whoever loads the result is responsible for isolating it; see
//! [`PREVIEW_SANDBOX`].

#![allow(missing_docs)]

use std::fmt;

use crate::buffers::DocumentBuffers;

/// `sandbox` token list for the preview frame: scripts run, but the document
/// gets an opaque origin (no storage, cookies or top-level navigation).
pub const PREVIEW_SANDBOX: &str = "allow-scripts";

/// File name offered for the standalone export.
pub const EXPORT_FILE_NAME: &str = "index.html";

/// Title written into the standalone export.
pub const EXPORT_TITLE: &str = "My Project";

const SCRIPT_CATCH: &str = "} catch (error) {\n  console.error('JavaScript Error:', error);\n}\n";

/// A fully assembled document, ready for a sandboxed preview surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CombinedDocument(String);

impl CombinedDocument {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CombinedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CombinedDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CombinedDocument> for String {
    fn from(value: CombinedDocument) -> Self {
        value.0
    }
}

/// Assemble the preview document.
#[must_use]
pub fn render(buffers: &DocumentBuffers) -> CombinedDocument {
    let mut out = String::with_capacity(buffers.len() + 256);
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    push_block(&mut out, "<style>\n", &buffers.style, "</style>\n");
    out.push_str("</head>\n<body>\n");
    push_line(&mut out, &buffers.markup);
    push_guarded_script(&mut out, "<script>\n", &buffers.script, "</script>\n");
    out.push_str("</body>\n</html>\n");
    CombinedDocument(out)
}

/// Assemble a self-contained document for download.
///
/// Same structure as [`render`] with charset, viewport and title metadata.
#[must_use]
pub fn export_standalone(buffers: &DocumentBuffers, title: &str) -> String {
    let mut out = String::with_capacity(buffers.len() + 512);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("    <meta charset=\"UTF-8\">\n");
    out.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    out.push_str("    <title>");
    push_escaped_text(&mut out, title);
    out.push_str("</title>\n");
    push_block(&mut out, "    <style>\n", &buffers.style, "    </style>\n");
    out.push_str("</head>\n<body>\n");
    push_line(&mut out, &buffers.markup);
    push_guarded_script(&mut out, "    <script>\n", &buffers.script, "    </script>\n");
    out.push_str("</body>\n</html>\n");
    out
}

fn push_block(out: &mut String, open: &str, body: &str, close: &str) {
    out.push_str(open);
    push_line(out, body);
    out.push_str(close);
}

fn push_guarded_script(out: &mut String, open: &str, script: &str, close: &str) {
    out.push_str(open);
    out.push_str("try {\n");
    // Own line so a trailing `//` comment cannot swallow the closing brace.
    push_line(out, script);
    out.push_str(SCRIPT_CATCH);
    out.push_str(close);
}

fn push_line(out: &mut String, text: &str) {
    out.push_str(text);
    if !text.ends_with('\n') {
        out.push('\n');
    }
}

fn push_escaped_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}
