//! Provider selection and per-provider settings.

#![allow(missing_docs)]

use std::fmt;

use smol_str::SmolStr;

use crate::error::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    /// Web-search augmented completions.
    Perplexity,
}

impl Provider {
    pub const DEFAULT: Self = Self::OpenAi;
    pub const ALL: [Self; 2] = [Self::OpenAi, Self::Perplexity];

    /// Exact, case-sensitive selector match.
    pub fn parse(text: &str) -> Result<Self, RelayError> {
        match text {
            "openai" => Ok(Self::OpenAi),
            "perplexity" => Ok(Self::Perplexity),
            other => Err(RelayError::UnsupportedProvider(other.into())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Perplexity => "perplexity",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how to call one provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub endpoint: SmolStr,
    pub model: SmolStr,
    pub system_prompt: String,
    /// Environment variable holding the API key.
    pub api_key_env: SmolStr,
    pub api_key: Option<String>,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key_env", &self.api_key_env)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl ProviderSettings {
    #[must_use]
    pub fn defaults(provider: Provider) -> Self {
        match provider {
            Provider::OpenAi => Self {
                endpoint: SmolStr::new_static("https://api.openai.com/v1/chat/completions"),
                model: SmolStr::new_static("gpt-4o-mini"),
                system_prompt: "You are a helpful AI coding assistant. Provide clear, concise code explanations and solutions.".to_string(),
                api_key_env: SmolStr::new_static("OPENAI_API_KEY"),
                api_key: None,
            },
            Provider::Perplexity => Self {
                endpoint: SmolStr::new_static("https://api.perplexity.ai/chat/completions"),
                model: SmolStr::new_static("llama-3.1-sonar-small-128k-online"),
                system_prompt: "You are a helpful AI assistant with access to current information."
                    .to_string(),
                api_key_env: SmolStr::new_static("PERPLEXITY_API_KEY"),
                api_key: None,
            },
        }
    }

    /// Read the API key from `api_key_env`. Empty values count as missing.
    pub fn load_api_key_from_env(&mut self) {
        self.api_key = std::env::var(self.api_key_env.as_str())
            .ok()
            .filter(|value| !value.trim().is_empty());
    }

    pub fn api_key(&self) -> Result<&str, RelayError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| RelayError::MissingCredential(self.api_key_env.clone()))
    }
}

/// Settings for every provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub openai: ProviderSettings,
    pub perplexity: ProviderSettings,
}

impl RelaySettings {
    #[must_use]
    pub fn get(&self, provider: Provider) -> &ProviderSettings {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Perplexity => &self.perplexity,
        }
    }

    pub fn get_mut(&mut self, provider: Provider) -> &mut ProviderSettings {
        match provider {
            Provider::OpenAi => &mut self.openai,
            Provider::Perplexity => &mut self.perplexity,
        }
    }

    /// Defaults with credentials taken from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        for provider in Provider::ALL {
            settings.get_mut(provider).load_api_key_from_env();
        }
        settings
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            openai: ProviderSettings::defaults(Provider::OpenAi),
            perplexity: ProviderSettings::defaults(Provider::Perplexity),
        }
    }
}
