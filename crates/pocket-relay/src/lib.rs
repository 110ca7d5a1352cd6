//! `pocket-relay` - stateless chat relay to LLM chat-completion providers.
//!
//! One request in, one upstream call out, the upstream body streamed back
//! untouched. No retries and no session state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Relay errors and their HTTP mapping.
pub mod error;
/// Chat request wire types.
pub mod message;
/// Provider selection and per-provider settings.
pub mod provider;
/// The relay itself.
pub mod relay;
/// Upstream transport seam.
pub mod upstream;

pub use error::RelayError;
pub use message::{ChatMessage, ChatRequest, ChatRole};
pub use provider::{Provider, ProviderSettings, RelaySettings};
pub use relay::{ChatRelay, RelayStream, STREAM_CONTENT_TYPE};
pub use upstream::{UreqUpstream, Upstream, UpstreamRequest, UpstreamResponse};
