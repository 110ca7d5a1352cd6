//! The relay itself.

#![allow(missing_docs)]

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use crate::error::RelayError;
use crate::message::{ChatMessage, ChatRequest, ChatRole};
use crate::provider::{Provider, RelaySettings};
use crate::upstream::{UreqUpstream, Upstream, UpstreamRequest};

/// Content type of a successful relay response.
pub const STREAM_CONTENT_TYPE: &str = "text/event-stream";

const MAX_ERROR_BODY_BYTES: u64 = 16 * 1024;

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

/// Forwards chat requests to the selected provider.
pub struct ChatRelay {
    settings: RelaySettings,
    upstream: Arc<dyn Upstream>,
}

impl fmt::Debug for ChatRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatRelay")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ChatRelay {
    #[must_use]
    pub fn new(settings: RelaySettings, upstream: Arc<dyn Upstream>) -> Self {
        Self { settings, upstream }
    }

    /// Relay backed by a real HTTP client.
    #[must_use]
    pub fn http(settings: RelaySettings) -> Self {
        Self::new(settings, Arc::new(UreqUpstream::new()))
    }

    #[must_use]
    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Validate, inject the provider's system prompt and call upstream.
    ///
    /// Provider and credential problems fail before any network traffic. On
    /// success the upstream body is handed back unread.
    pub fn forward(&self, request: &ChatRequest) -> Result<RelayStream, RelayError> {
        let provider = Provider::parse(request.provider_name())?;
        let settings = self.settings.get(provider);
        let api_key = settings.api_key()?;

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(ChatMessage::new(
            ChatRole::System,
            settings.system_prompt.as_str(),
        ));
        messages.extend(request.messages.iter().cloned());
        let body = serde_json::to_string(&CompletionBody {
            model: settings.model.as_str(),
            messages,
            stream: true,
        })
        .map_err(|err| RelayError::InvalidRequest(err.to_string().into()))?;

        debug!(
            provider = provider.as_str(),
            turns = request.messages.len(),
            "forwarding chat request"
        );
        let response = self.upstream.post(&UpstreamRequest {
            endpoint: settings.endpoint.as_str(),
            api_key,
            body,
        })?;

        if !response.is_success() {
            let status = response.status;
            let mut text = String::new();
            let _ = response
                .body
                .take(MAX_ERROR_BODY_BYTES)
                .read_to_string(&mut text);
            error!(provider = provider.as_str(), status, body = %text, "upstream chat request failed");
            return Err(RelayError::Upstream { status });
        }

        Ok(RelayStream {
            provider,
            body: response.body,
        })
    }

    /// Parse a raw JSON body and forward it.
    pub fn forward_json(&self, body: &str) -> Result<RelayStream, RelayError> {
        let request = ChatRequest::from_json(body)?;
        self.forward(&request)
    }
}

/// Live upstream body. Reading pulls bytes straight from the provider.
pub struct RelayStream {
    provider: Provider,
    body: Box<dyn Read + Send>,
}

impl fmt::Debug for RelayStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayStream")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

impl RelayStream {
    #[must_use]
    pub fn provider(&self) -> Provider {
        self.provider
    }

    #[must_use]
    pub fn content_type(&self) -> &'static str {
        STREAM_CONTENT_TYPE
    }

    #[must_use]
    pub fn into_reader(self) -> Box<dyn Read + Send> {
        self.body
    }
}

impl Read for RelayStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.body.read(buf)
    }
}
