use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn anthropic_with_conventional_key() {
    let cfg = LlmConfig::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "secret")])).unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::Anthropic);
    assert_eq!(cfg.api_key, "secret");
    assert_eq!(cfg.model, LlmProviderKind::Anthropic.default_model());
    assert_eq!(cfg.openai_mode, OpenAiApiMode::Responses);
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    assert_eq!(cfg.timeouts.connect_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
}

#[test]
fn explicit_key_wins() {
    let cfg = LlmConfig::from_lookup(lookup(&[("AI_API_KEY", "mine"), ("ANTHROPIC_API_KEY", "other")])).unwrap();
    assert_eq!(cfg.api_key, "mine");
}

#[test]
fn openai_settings() {
    let cfg = LlmConfig::from_lookup(lookup(&[
        ("AI_PROVIDER", " OpenAI "),
        ("OPENAI_API_KEY", "sk-test"),
        ("AI_MODEL", "gpt-4.1-mini"),
        ("AI_OPENAI_API", "chat_completions"),
        ("AI_BASE_URL", "https://proxy.internal/v1//"),
        ("AI_REQUEST_TIMEOUT_SECS", "30"),
    ]))
    .unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::OpenAi);
    assert_eq!(cfg.model, "gpt-4.1-mini");
    assert_eq!(cfg.openai_mode, OpenAiApiMode::ChatCompletions);
    assert_eq!(cfg.openai_base_url, "https://proxy.internal/v1");
    assert_eq!(cfg.timeouts.request_secs, 30);
}

#[test]
fn missing_key_names_both_variables() {
    let err = LlmConfig::from_lookup(lookup(&[("AI_PROVIDER", "openai"), ("AI_API_KEY", "  ")])).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { ref var } if var == "AI_API_KEY or OPENAI_API_KEY"));
}

#[test]
fn unknown_provider_is_config_error() {
    let err = LlmConfig::from_lookup(lookup(&[("AI_PROVIDER", "mistral"), ("AI_API_KEY", "k")])).unwrap_err();
    assert!(matches!(err, LlmError::Config(ref m) if m.contains("mistral")));
}

#[test]
fn unknown_openai_api_is_config_error() {
    let err = LlmConfig::from_lookup(lookup(&[("AI_API_KEY", "k"), ("AI_OPENAI_API", "assistants")])).unwrap_err();
    assert!(matches!(err, LlmError::Config(_)));
}

#[test]
fn bad_timeout_keeps_default() {
    let cfg = LlmConfig::from_lookup(lookup(&[("AI_API_KEY", "k"), ("AI_CONNECT_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(cfg.timeouts.connect_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
}

#[test]
fn timeouts_build_a_client() {
    assert!(LlmTimeouts { request_secs: 1, connect_secs: 1 }.http_client().is_ok());
}
