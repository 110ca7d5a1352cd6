//! Playground render/export request bodies.

#![allow(missing_docs)]

use pocket_playground::templates;
use pocket_playground::{BufferKind, DocumentBuffers};
use serde::Deserialize;
use thiserror::Error;

/// `{html?, css?, js?, template?}`. Missing buffers come from the template,
/// then from the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlaygroundRequest {
    pub html: Option<String>,
    pub css: Option<String>,
    pub js: Option<String>,
    pub template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaygroundRequestError {
    #[error("invalid json: {0}")]
    InvalidJson(String),
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),
}

impl PlaygroundRequestError {
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidJson(_) => 400,
            Self::UnknownTemplate(_) => 404,
        }
    }
}

impl PlaygroundRequest {
    /// An empty body means "all defaults".
    pub fn parse(body: &str) -> Result<Self, PlaygroundRequestError> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(body).map_err(|err| PlaygroundRequestError::InvalidJson(err.to_string()))
    }

    pub fn into_buffers(self) -> Result<DocumentBuffers, PlaygroundRequestError> {
        let mut buffers = match self.template.as_deref() {
            Some(id) => templates::find(id)
                .ok_or_else(|| PlaygroundRequestError::UnknownTemplate(id.to_string()))?
                .buffers(),
            None => DocumentBuffers::default(),
        };
        for (kind, text) in [
            (BufferKind::Markup, self.html),
            (BufferKind::Style, self.css),
            (BufferKind::Script, self.js),
        ] {
            if let Some(text) = text {
                buffers.set(kind, text);
            }
        }
        Ok(buffers)
    }
}
