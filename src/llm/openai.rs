//! `OpenAI`-compatible adapter: `/chat/completions` or `/responses`.
//!
//! Replies are read as untyped JSON because compatible servers disagree on
//! optional fields. Only text output is kept.

use serde::Serialize;
use serde_json::Value;

use super::config::OpenAiApiMode;
use super::types::{ChatResponse, LlmError, Message, StopReason, TokenUsage};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    mode: OpenAiApiMode,
    base_url: String,
}

impl OpenAiClient {
    #[must_use]
    pub fn new(http: reqwest::Client, api_key: String, mode: OpenAiApiMode, base_url: String) -> Self {
        Self { http, api_key, mode, base_url }
    }

    /// # Errors
    ///
    /// Transport failure, a non-2xx status, or a body that does not decode.
    pub async fn chat(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
    ) -> Result<ChatResponse, LlmError> {
        match self.mode {
            OpenAiApiMode::ChatCompletions => {
                let messages = with_system(system, messages);
                let body = ChatCompletionsRequest { model, max_tokens, messages: &messages };
                decode_chat_completion(&self.post("/chat/completions", &body).await?)
            }
            OpenAiApiMode::Responses => {
                let input = responses_input(messages);
                let body = ResponsesRequest { model, max_output_tokens: max_tokens, instructions: system, input };
                decode_response(&self.post("/responses", &body).await?)
            }
        }
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<String, LlmError> {
        let request = self
            .http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body);
        super::send(request).await
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [Message],
}

/// Chat completions carry the system prompt as the first message.
fn with_system(system: &str, messages: &[Message]) -> Vec<Message> {
    let system = system.trim();
    let mut out = Vec::with_capacity(messages.len() + 1);
    if !system.is_empty() {
        out.push(Message::system(system));
    }
    out.extend_from_slice(messages);
    out
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    instructions: &'a str,
    input: Vec<Value>,
}

fn responses_input(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| {
            serde_json::json!({
                "type": "message",
                "role": m.role,
                "content": [{ "type": "input_text", "text": m.content }],
            })
        })
        .collect()
}

// =============================================================================
// REPLIES
// =============================================================================

fn decode(body: &str) -> Result<Value, LlmError> {
    serde_json::from_str(body).map_err(|e| LlmError::Decode(e.to_string()))
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

fn usage(root: &Value, input_key: &str, output_key: &str) -> TokenUsage {
    let count = |key: &str| root.pointer(&format!("/usage/{key}")).and_then(Value::as_u64).unwrap_or(0);
    TokenUsage { input: count(input_key), output: count(output_key) }
}

pub(crate) fn decode_chat_completion(body: &str) -> Result<ChatResponse, LlmError> {
    let root = decode(body)?;
    let choice = root
        .pointer("/choices/0")
        .ok_or_else(|| LlmError::Decode("reply has no choices".into()))?;
    let stop = if str_at(choice, "/finish_reason") == Some("length") {
        StopReason::MaxTokens
    } else {
        StopReason::EndTurn
    };
    Ok(ChatResponse {
        text: str_at(choice, "/message/content").unwrap_or_default().to_owned(),
        model: str_at(&root, "/model").unwrap_or_default().to_owned(),
        stop,
        usage: usage(&root, "prompt_tokens", "completion_tokens"),
    })
}

pub(crate) fn decode_response(body: &str) -> Result<ChatResponse, LlmError> {
    let root = decode(body)?;
    let texts: Vec<&str> = match root.get("output").and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter(|item| str_at(item, "/type") == Some("message"))
            .filter_map(|item| item.get("content").and_then(Value::as_array))
            .flatten()
            .filter(|part| matches!(str_at(part, "/type"), Some("output_text" | "text")))
            .filter_map(|part| str_at(part, "/text"))
            .filter(|text| !text.is_empty())
            .collect(),
        None => str_at(&root, "/output_text").into_iter().collect(),
    };
    let stop = if str_at(&root, "/incomplete_details/reason") == Some("max_output_tokens") {
        StopReason::MaxTokens
    } else {
        StopReason::EndTurn
    };
    Ok(ChatResponse {
        text: texts.join("\n"),
        model: str_at(&root, "/model").unwrap_or_default().to_owned(),
        stop,
        usage: usage(&root, "input_tokens", "output_tokens"),
    })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
