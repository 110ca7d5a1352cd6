//! Configuration loading (`pocket-ide.toml`).

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pocket_relay::{Provider, RelaySettings};
use serde::Deserialize;
use smol_str::SmolStr;

use crate::error::IdeError;

pub const DEFAULT_CONFIG_FILE: &str = "pocket-ide.toml";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8787";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 15 * 60;
pub const DEFAULT_MAX_SESSIONS: usize = 16;
pub const DEFAULT_MAX_CHAT_STREAMS: usize = 32;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeConfig {
    pub server: ServerConfig,
    pub log_level: SmolStr,
    pub console: ConsoleConfig,
    pub relay: RelaySettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SmolStr,
    pub cors_origin: SmolStr,
    /// Chat relays allowed in flight at once; more get a 429.
    pub max_chat_streams: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub session_ttl_secs: u64,
    pub max_sessions: usize,
}

impl Default for IdeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            log_level: SmolStr::new_static("info"),
            console: ConsoleConfig::default(),
            relay: RelaySettings::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SmolStr::new_static(DEFAULT_LISTEN),
            cors_origin: SmolStr::new_static("*"),
            max_chat_streams: DEFAULT_MAX_CHAT_STREAMS,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl IdeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IdeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            IdeError::InvalidConfig(format!("{}: {err}", path.display()).into())
        })?;
        Self::from_toml_str(&text)
            .map_err(|err| IdeError::InvalidConfig(format!("{}: {err}", path.display()).into()))
    }

    /// Explicit path, else `./pocket-ide.toml` when present, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, IdeError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            Self::load(local)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, IdeError> {
        let raw: IdeToml =
            toml::from_str(text).map_err(|err| IdeError::InvalidConfig(err.to_string().into()))?;
        raw.into_config()
    }

    /// Fill provider API keys from their environment variables.
    pub fn load_credentials_from_env(&mut self) {
        for provider in Provider::ALL {
            self.relay.get_mut(provider).load_api_key_from_env();
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct IdeToml {
    server: Option<ServerSection>,
    log: Option<LogSection>,
    console: Option<ConsoleSection>,
    relay: Option<BTreeMap<String, ProviderSection>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerSection {
    listen: Option<String>,
    cors_origin: Option<String>,
    max_chat_streams: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LogSection {
    level: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConsoleSection {
    session_ttl_secs: Option<u64>,
    max_sessions: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProviderSection {
    endpoint: Option<String>,
    model: Option<String>,
    api_key_env: Option<String>,
    system_prompt: Option<String>,
}

impl IdeToml {
    fn into_config(self) -> Result<IdeConfig, IdeError> {
        let mut config = IdeConfig::default();

        if let Some(server) = self.server {
            if let Some(listen) = server.listen {
                if listen.trim().is_empty() {
                    return Err(IdeError::InvalidConfig("server.listen is empty".into()));
                }
                config.server.listen = SmolStr::new(listen.trim());
            }
            if let Some(origin) = server.cors_origin {
                if origin.chars().any(char::is_control) {
                    return Err(IdeError::InvalidConfig(
                        "server.cors_origin contains control characters".into(),
                    ));
                }
                config.server.cors_origin = SmolStr::new(origin.trim());
            }
            if let Some(max) = server.max_chat_streams {
                if max == 0 {
                    return Err(IdeError::InvalidConfig(
                        "server.max_chat_streams must be greater than zero".into(),
                    ));
                }
                config.server.max_chat_streams = max;
            }
        }

        if let Some(level) = self.log.and_then(|log| log.level) {
            let level = level.trim().to_ascii_lowercase();
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(IdeError::InvalidConfig(
                    format!("invalid log.level '{level}'").into(),
                ));
            }
            config.log_level = level.into();
        }

        if let Some(console) = self.console {
            if let Some(ttl) = console.session_ttl_secs {
                if ttl == 0 {
                    return Err(IdeError::InvalidConfig(
                        "console.session_ttl_secs must be greater than zero".into(),
                    ));
                }
                config.console.session_ttl_secs = ttl;
            }
            if let Some(max) = console.max_sessions {
                if max == 0 {
                    return Err(IdeError::InvalidConfig(
                        "console.max_sessions must be greater than zero".into(),
                    ));
                }
                config.console.max_sessions = max;
            }
        }

        for (name, section) in self.relay.unwrap_or_default() {
            let provider = Provider::parse(&name).map_err(|_| {
                IdeError::InvalidConfig(format!("unknown relay provider '{name}'").into())
            })?;
            let settings = config.relay.get_mut(provider);
            if let Some(endpoint) = section.endpoint {
                if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                    return Err(IdeError::InvalidConfig(
                        format!("relay.{name}.endpoint must be an http(s) url").into(),
                    ));
                }
                settings.endpoint = endpoint.into();
            }
            if let Some(model) = section.model {
                settings.model = model.into();
            }
            if let Some(env) = section.api_key_env {
                settings.api_key_env = env.into();
            }
            if let Some(prompt) = section.system_prompt {
                settings.system_prompt = prompt;
            }
        }

        Ok(config)
    }
}
