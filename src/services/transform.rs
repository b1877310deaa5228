//! Text transform service: the backend of the editor's AI-assist flow.
//!
//! DESIGN
//! ======
//! [`TextTransform`] takes a [`TransformRequest`] and returns the rewritten
//! text. Two implementations:
//! - [`HttpTransformClient`] posts `{text, action, style}` to a configured
//!   endpoint and reads `{text}` back.
//! - [`LlmTransform`] asks the LLM directly. It also backs the service's own
//!   `POST /api/transform`, so a deployment can point `TRANSFORM_ENDPOINT_URL`
//!   at another instance.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx, transport and decode failures are all `TransformError`. Callers
//! in the editor collapse them to one user-facing string.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::editor::assist::{AssistAction, AssistStyle, TransformRequest};
use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::types::{LlmError, Message};

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("transform request failed: {0}")]
    Request(String),
    #[error("transform endpoint returned status {0}")]
    Status(u16),
    #[error("transform response parse failed: {0}")]
    Parse(String),
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("no transform backend configured")]
    NotConfigured,
}

impl ErrorCode for TransformError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_TRANSFORM_REQUEST",
            Self::Status(_) => "E_TRANSFORM_STATUS",
            Self::Parse(_) => "E_TRANSFORM_PARSE",
            Self::ClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Llm(_) => "E_LLM_ERROR",
            Self::NotConfigured => "E_TRANSFORM_NOT_CONFIGURED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Request(_) | Self::Status(429 | 500..=599) => true,
            Self::Llm(e) => e.retryable(),
            _ => false,
        }
    }
}

#[async_trait::async_trait]
pub trait TextTransform: Send + Sync {
    /// Rewrite `request.text` according to its action and style.
    ///
    /// # Errors
    ///
    /// Returns a [`TransformError`] on any transport or decode failure.
    async fn transform(&self, request: &TransformRequest) -> Result<String, TransformError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

#[derive(Deserialize)]
struct TransformResponse {
    text: String,
}

pub struct HttpTransformClient {
    http: reqwest::Client,
    url: String,
}

impl HttpTransformClient {
    /// # Errors
    ///
    /// Returns [`TransformError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, TransformError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransformError::ClientBuild(e.to_string()))?;
        Ok(Self { http, url: url.into() })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl TextTransform for HttpTransformClient {
    async fn transform(&self, request: &TransformRequest) -> Result<String, TransformError> {
        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| TransformError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransformError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransformError::Request(e.to_string()))?;
        let parsed: TransformResponse = serde_json::from_str(&body).map_err(|e| TransformError::Parse(e.to_string()))?;
        Ok(parsed.text)
    }
}

// =============================================================================
// LLM-BACKED TRANSFORM
// =============================================================================

pub struct LlmTransform {
    llm: Arc<dyn LlmChat>,
    max_tokens: u32,
}

impl LlmTransform {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmChat>, max_tokens: u32) -> Self {
        Self { llm, max_tokens }
    }
}

fn action_instruction(action: AssistAction) -> &'static str {
    match action {
        AssistAction::Expand => "Expand the text with more detail and supporting explanation.",
        AssistAction::Rewrite => "Rewrite the text so it says the same thing in different words.",
        AssistAction::Summarize => "Summarize the text in a few concise sentences.",
        AssistAction::Improve => "Improve the clarity, grammar and flow of the text.",
        AssistAction::Simplify => "Simplify the text so a general reader can follow it.",
    }
}

fn style_instruction(style: AssistStyle) -> &'static str {
    match style {
        AssistStyle::Formal => "Use a formal academic tone.",
        AssistStyle::Casual => "Use a relaxed, conversational tone.",
        AssistStyle::Creative => "Use a vivid, creative tone.",
        AssistStyle::Professional => "Use a clear, professional tone.",
    }
}

/// System prompt for one action/style pair.
#[must_use]
pub fn system_prompt(action: AssistAction, style: AssistStyle) -> String {
    format!(
        "You edit passages of a research proposal. {} {} Reply with the resulting text only, without preamble.",
        action_instruction(action),
        style_instruction(style)
    )
}

#[async_trait::async_trait]
impl TextTransform for LlmTransform {
    async fn transform(&self, request: &TransformRequest) -> Result<String, TransformError> {
        let system = system_prompt(request.action, request.style);
        let messages = [Message::user(request.text.clone())];
        let response = self.llm.chat(self.max_tokens, &system, &messages).await.map_err(|e| {
            warn!(error = %e, action = request.action.as_str(), "transform: llm call failed");
            TransformError::from(e)
        })?;

        let text = response.text.trim();
        if text.is_empty() {
            return Err(TransformError::Parse("empty completion".into()));
        }
        info!(
            action = request.action.as_str(),
            style = request.style.as_str(),
            input_tokens = response.usage.input,
            output_tokens = response.usage.output,
            "transform: completed"
        );
        Ok(text.to_owned())
    }
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod tests;
