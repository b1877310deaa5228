//! Provider-neutral chat types shared by the Anthropic and `OpenAI` adapters.

use serde::{Deserialize, Serialize};

/// Failure talking to a model provider.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("AI configuration invalid: {0}")]
    Config(String),
    #[error("no API key found (set {var})")]
    MissingApiKey { var: String },
    #[error("AI provider unreachable: {0}")]
    Transport(String),
    #[error("AI provider returned status {status}")]
    Status { status: u16, body: String },
    #[error("AI provider reply could not be decoded: {0}")]
    Decode(String),
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "E_AI_CONFIG",
            Self::MissingApiKey { .. } => "E_AI_NO_KEY",
            Self::Transport(_) => "E_AI_TRANSPORT",
            Self::Status { .. } => "E_AI_STATUS",
            Self::Decode(_) => "E_AI_DECODE",
            Self::ClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// Network hiccups, throttling and provider outages.
    fn retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: ChatRole,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }
}

/// Why the model stopped producing text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    #[default]
    EndTurn,
    /// Output was cut at the token budget.
    MaxTokens,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
}

/// A completed chat call, reduced to its text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Text parts joined by newlines, in order.
    pub text: String,
    pub model: String,
    pub stop: StopReason,
    pub usage: TokenUsage,
}

impl ChatResponse {
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.stop == StopReason::MaxTokens
    }
}

// =============================================================================
// CHAT TRAIT
// =============================================================================

/// The one call every AI feature makes. Mocked in tests.
#[async_trait::async_trait]
pub trait LlmChat: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails or the reply is malformed.
    async fn chat(&self, max_tokens: u32, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
