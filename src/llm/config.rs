//! AI provider settings read from the environment.
//!
//! | Variable                  | Default                          |
//! |---------------------------|----------------------------------|
//! | `AI_PROVIDER`             | `anthropic` (or `openai`)        |
//! | `AI_API_KEY`              | provider's own key variable      |
//! | `AI_MODEL`                | per provider                     |
//! | `AI_OPENAI_API`           | `responses` (or `chat_completions`) |
//! | `AI_BASE_URL`             | `https://api.openai.com/v1`      |
//! | `AI_REQUEST_TIMEOUT_SECS` | 120                              |
//! | `AI_CONNECT_TIMEOUT_SECS` | 10                               |

use std::str::FromStr;
use std::time::Duration;

use super::types::LlmError;
use crate::config::parse_var;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    Anthropic,
    OpenAi,
}

impl LlmProviderKind {
    /// Conventional key variable, read when `AI_API_KEY` is unset.
    #[must_use]
    pub fn key_var(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => "claude-sonnet-4-5-20250929",
            Self::OpenAi => "gpt-4o",
        }
    }
}

impl FromStr for LlmProviderKind {
    type Err = LlmError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            other => Err(LlmError::Config(format!("AI_PROVIDER must be anthropic or openai, got '{other}'"))),
        }
    }
}

/// Which `OpenAI` endpoint family to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiApiMode {
    ChatCompletions,
    Responses,
}

impl FromStr for OpenAiApiMode {
    type Err = LlmError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "responses" => Ok(Self::Responses),
            "chat_completions" => Ok(Self::ChatCompletions),
            other => Err(LlmError::Config(format!(
                "AI_OPENAI_API must be responses or chat_completions, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl LlmTimeouts {
    /// HTTP client with these timeouts applied.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ClientBuild`] if reqwest refuses the settings.
    pub fn http_client(self) -> Result<reqwest::Client, LlmError> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.request_secs))
            .connect_timeout(Duration::from_secs(self.connect_secs))
            .build()
            .map_err(|e| LlmError::ClientBuild(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub provider: LlmProviderKind,
    pub api_key: String,
    pub model: String,
    pub openai_mode: OpenAiApiMode,
    pub openai_base_url: String,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// # Errors
    ///
    /// Returns an error if no key is set or a provider/mode value is unknown.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`Self::from_env`] over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// As [`Self::from_env`].
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, LlmError> {
        let set = |key: &str| var(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let provider = set("AI_PROVIDER").map_or(Ok(LlmProviderKind::Anthropic), |raw| raw.parse())?;
        let api_key = set("AI_API_KEY")
            .or_else(|| set(provider.key_var()))
            .ok_or_else(|| LlmError::MissingApiKey { var: format!("AI_API_KEY or {}", provider.key_var()) })?;
        let openai_mode = set("AI_OPENAI_API").map_or(Ok(OpenAiApiMode::Responses), |raw| raw.parse())?;

        let mut openai_base_url = set("AI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_owned());
        while openai_base_url.ends_with('/') {
            openai_base_url.pop();
        }

        Ok(Self {
            provider,
            api_key,
            model: set("AI_MODEL").unwrap_or_else(|| provider.default_model().to_owned()),
            openai_mode,
            openai_base_url,
            timeouts: LlmTimeouts {
                request_secs: parse_var(&var, "AI_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
                connect_secs: parse_var(&var, "AI_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            },
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
