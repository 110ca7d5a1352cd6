//! `pocket-ide` - local server and CLI for the pocket IDE shell.
//!
//! Wires the playground engine, the command console and the chat relay
//! behind a small HTTP API:
//! - `config`: `pocket-ide.toml` loading and validation
//! - `web`: the tiny_http request loop and per-client console sessions

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Configuration loading.
pub mod config;
/// Server errors.
pub mod error;
/// Embedded HTTP API.
pub mod web;

pub use config::{ConsoleConfig, IdeConfig, ServerConfig};
pub use error::IdeError;
pub use web::console::{ConsoleSessions, SessionError, SessionErrorKind, SessionLimits};
pub use web::{start_web_server, WebServer, WebState};
