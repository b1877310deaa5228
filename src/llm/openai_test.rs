use serde_json::json;

use super::*;
use crate::llm::types::ChatRole;

// =============================================================================
// chat completions
// =============================================================================

#[test]
fn chat_completion_decodes_text_and_usage() {
    let body = json!({
        "model": "gpt-4o",
        "choices": [{ "message": { "role": "assistant", "content": "Recruit 40 nurses." }, "finish_reason": "stop" }],
        "usage": { "prompt_tokens": 31, "completion_tokens": 6 }
    })
    .to_string();
    let resp = decode_chat_completion(&body).unwrap();
    assert_eq!(resp.text, "Recruit 40 nurses.");
    assert_eq!(resp.model, "gpt-4o");
    assert_eq!(resp.stop, StopReason::EndTurn);
    assert_eq!(resp.usage, TokenUsage { input: 31, output: 6 });
}

#[test]
fn length_finish_is_truncated() {
    let body = json!({ "choices": [{ "message": { "content": "cut" }, "finish_reason": "length" }] }).to_string();
    assert!(decode_chat_completion(&body).unwrap().truncated());
}

#[test]
fn no_choices_is_decode_error() {
    let err = decode_chat_completion(&json!({ "choices": [] }).to_string()).unwrap_err();
    assert!(matches!(err, LlmError::Decode(_)));
}

#[test]
fn system_prompt_leads_when_present() {
    let messages = with_system(" be brief ", &[Message::user("hi")]);
    assert_eq!(messages[0], Message::system("be brief"));
    assert_eq!(messages[1].role, ChatRole::User);
    assert_eq!(with_system("", &[Message::user("hi")]).len(), 1);
}

// =============================================================================
// responses
// =============================================================================

#[test]
fn response_joins_message_text_parts() {
    let body = json!({
        "model": "gpt-4o",
        "output": [
            { "type": "reasoning", "summary": [] },
            { "type": "message", "content": [
                { "type": "output_text", "text": "First." },
                { "type": "refusal", "refusal": "no" },
                { "type": "output_text", "text": "Second." }
            ] }
        ],
        "usage": { "input_tokens": 12, "output_tokens": 4 }
    })
    .to_string();
    let resp = decode_response(&body).unwrap();
    assert_eq!(resp.text, "First.\nSecond.");
    assert_eq!(resp.usage.input, 12);
}

#[test]
fn response_falls_back_to_output_text() {
    let body = json!({ "output_text": "Fallback" }).to_string();
    assert_eq!(decode_response(&body).unwrap().text, "Fallback");
}

#[test]
fn incomplete_response_is_truncated() {
    let body = json!({ "output": [], "incomplete_details": { "reason": "max_output_tokens" } }).to_string();
    assert!(decode_response(&body).unwrap().truncated());
}

#[test]
fn responses_input_uses_input_text_parts() {
    let input = responses_input(&[Message::user("hi")]);
    assert_eq!(
        input[0],
        json!({ "type": "message", "role": "user", "content": [{ "type": "input_text", "text": "hi" }] })
    );
}
