//! Server errors.

#![allow(missing_docs)]

use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdeError {
    /// Configuration error.
    #[error("invalid config '{0}'")]
    InvalidConfig(SmolStr),

    /// Web server could not start.
    #[error("web server error '{0}'")]
    Web(SmolStr),
}
