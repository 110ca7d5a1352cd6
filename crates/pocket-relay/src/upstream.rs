//! Upstream transport seam.

#![allow(missing_docs)]

use std::io::Read;
use std::time::Duration;

use crate::error::RelayError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One outgoing chat-completion call.
pub struct UpstreamRequest<'a> {
    pub endpoint: &'a str,
    pub api_key: &'a str,
    pub body: String,
}

/// Status plus an unread body. Non-success statuses are responses too.
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Box<dyn Read + Send>,
}

impl UpstreamResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Upstream: Send + Sync {
    /// POST `request.body` as JSON with bearer auth. Only transport failures
    /// are errors.
    fn post(&self, request: &UpstreamRequest<'_>) -> Result<UpstreamResponse, RelayError>;
}

/// Blocking HTTP upstream. No read timeout: completions stream for as long
/// as the provider keeps writing.
#[derive(Debug, Clone)]
pub struct UreqUpstream {
    agent: ureq::Agent,
}

impl UreqUpstream {
    #[must_use]
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .build();
        Self { agent }
    }
}

impl Default for UreqUpstream {
    fn default() -> Self {
        Self::new()
    }
}

impl Upstream for UreqUpstream {
    fn post(&self, request: &UpstreamRequest<'_>) -> Result<UpstreamResponse, RelayError> {
        let result = self
            .agent
            .post(request.endpoint)
            .set("Authorization", &format!("Bearer {}", request.api_key))
            .set("Content-Type", "application/json")
            .send_string(&request.body);
        match result {
            Ok(response) => Ok(UpstreamResponse {
                status: response.status(),
                body: response.into_reader(),
            }),
            Err(ureq::Error::Status(status, response)) => Ok(UpstreamResponse {
                status,
                body: response.into_reader(),
            }),
            Err(ureq::Error::Transport(err)) => Err(RelayError::Transport(err.to_string().into())),
        }
    }
}
