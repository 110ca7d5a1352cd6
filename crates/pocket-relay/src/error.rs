//! Relay errors and their HTTP mapping.

#![allow(missing_docs)]

use serde_json::{json, Value};
use smol_str::SmolStr;
use thiserror::Error;

/// Everything a relay call can fail with. Configuration problems are raised
/// before any upstream traffic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Request body is not a valid chat request.
    #[error("invalid chat request: {0}")]
    InvalidRequest(SmolStr),

    /// Provider selector names no known provider.
    #[error("Unsupported provider '{0}'")]
    UnsupportedProvider(SmolStr),

    /// The provider's credential is absent. Carries the variable name.
    #[error("{0} not configured")]
    MissingCredential(SmolStr),

    /// Upstream answered with a non-success status.
    #[error("API request failed")]
    Upstream { status: u16 },

    /// Upstream could not be reached.
    #[error("upstream unreachable: {0}")]
    Transport(SmolStr),
}

impl RelayError {
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::Upstream { status } => *status,
            Self::UnsupportedProvider(_) | Self::MissingCredential(_) | Self::Transport(_) => 500,
        }
    }

    /// Raised before contacting any upstream.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedProvider(_) | Self::MissingCredential(_)
        )
    }

    /// JSON body sent to the caller.
    #[must_use]
    pub fn body(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}
