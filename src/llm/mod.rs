//! LLM: multi-provider adapter behind proposal suggestions and the
//! editor's text transforms.
//!
//! DESIGN
//! ======
//! `LlmClient` dispatches to Anthropic or `OpenAI` according to
//! `AI_PROVIDER`. Services only see the [`LlmChat`] trait, so every AI
//! feature can run against a mock in tests.

pub mod anthropic;
pub mod config;
pub mod openai;
pub mod types;

use config::{LlmConfig, LlmProviderKind};
pub use types::LlmChat;
use types::{ChatResponse, LlmError, Message};

/// Send a prepared request and return the body of a 2xx reply.
async fn send(request: reqwest::RequestBuilder) -> Result<String, LlmError> {
    let response = request.send().await.map_err(|e| LlmError::Transport(e.to_string()))?;
    let status = response.status();
    let body = response.text().await.map_err(|e| LlmError::Transport(e.to_string()))?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(LlmError::Status { status: status.as_u16(), body })
    }
}

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

pub struct LlmClient {
    provider: Provider,
    model: String,
}

enum Provider {
    Anthropic(anthropic::AnthropicClient),
    OpenAi(openai::OpenAiClient),
}

impl LlmClient {
    /// # Errors
    ///
    /// Returns an error when no key is configured or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_config(LlmConfig::from_env()?)
    }

    /// # Errors
    ///
    /// Returns an error if the provider's HTTP client cannot be built.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let http = config.timeouts.http_client()?;
        let provider = match config.provider {
            LlmProviderKind::Anthropic => Provider::Anthropic(anthropic::AnthropicClient::new(http, config.api_key)),
            LlmProviderKind::OpenAi => Provider::OpenAi(openai::OpenAiClient::new(
                http,
                config.api_key,
                config.openai_mode,
                config.openai_base_url,
            )),
        };
        Ok(Self { provider, model: config.model })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn chat(&self, max_tokens: u32, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        match &self.provider {
            Provider::Anthropic(c) => c.chat(&self.model, max_tokens, system, messages).await,
            Provider::OpenAi(c) => c.chat(&self.model, max_tokens, system, messages).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::config::{LlmTimeouts, OpenAiApiMode};
    use super::*;

    fn config(provider: LlmProviderKind) -> LlmConfig {
        LlmConfig {
            provider,
            api_key: "k".into(),
            model: "m-1".into(),
            openai_mode: OpenAiApiMode::Responses,
            openai_base_url: "http://127.0.0.1:1".into(),
            timeouts: LlmTimeouts { request_secs: 1, connect_secs: 1 },
        }
    }

    #[test]
    fn client_follows_configured_provider() {
        let client = LlmClient::from_config(config(LlmProviderKind::Anthropic)).unwrap();
        assert_eq!(client.model(), "m-1");
        assert!(matches!(client.provider, Provider::Anthropic(_)));
        let client = LlmClient::from_config(config(LlmProviderKind::OpenAi)).unwrap();
        assert!(matches!(client.provider, Provider::OpenAi(_)));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_transport_error() {
        let client = LlmClient::from_config(config(LlmProviderKind::OpenAi)).unwrap();
        let err = client.chat(16, "", &[Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
    }
}
