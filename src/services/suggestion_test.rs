use super::*;
use crate::llm::types::LlmError;
use crate::state::test_helpers::{MockLlm, sample_idea};

#[test]
fn prompt_carries_idea_fields_and_section() {
    let prompt = build_prompt(Some(&sample_idea()), SectionId::Methodology, "We will recruit nurses.");
    assert!(prompt.contains("Sleep and memory in shift workers"));
    assert!(prompt.contains("Shift work disrupts circadian rhythm."));
    assert!(prompt.contains("Measure recall after night shifts."));
    assert!(prompt.contains("Section: Methodology"));
    assert!(prompt.contains("We will recruit nurses."));
}

#[test]
fn prompt_for_empty_section_asks_for_an_opening() {
    let prompt = build_prompt(None, SectionId::Timeline, "   ");
    assert!(prompt.contains("Section: Timeline"));
    assert!(prompt.contains("empty"));
    assert!(!prompt.contains("Research concept"));
}

#[test]
fn prompt_skips_blank_optional_idea_fields() {
    let idea = Idea { concept: "Only a concept".into(), ..Idea::default() };
    let prompt = build_prompt(Some(&idea), SectionId::Background, "");
    assert!(!prompt.contains("Background:"));
    assert!(!prompt.contains("Objective:"));
}

#[test]
fn append_puts_separator_between_texts() {
    let out = append_suggestion("Existing.", " New text. ");
    assert_eq!(out, format!("Existing.{SUGGESTION_SEPARATOR}New text."));
}

#[tokio::test]
async fn llm_generation_returns_text() {
    let llm = Arc::new(MockLlm::texts(&["A drafted paragraph."]));
    let service = LlmGeneration::new(llm.clone(), 512);

    let result = service.generate("the prompt", KNOWLEDGE_BASE_CONTEXT, SYSTEM_INSTRUCTION).await;

    assert_eq!(result, GenerationResult::text("A drafted paragraph."));
    let calls = llm.calls.lock().unwrap();
    assert_eq!(calls[0].0, SYSTEM_INSTRUCTION);
    assert!(calls[0].1[0].content.starts_with(KNOWLEDGE_BASE_CONTEXT));
    assert!(calls[0].1[0].content.ends_with("the prompt"));
}

#[tokio::test]
async fn llm_generation_reports_llm_error_text() {
    let llm = MockLlm::new(vec![Err(LlmError::Transport("connection reset".into()))]);
    let result = LlmGeneration::new(Arc::new(llm), 512).generate("p", "c", "s").await;
    assert!(result.text.is_none());
    assert!(result.error.unwrap().contains("connection reset"));
}

#[tokio::test]
async fn llm_generation_empty_reply_is_an_error() {
    let result = LlmGeneration::new(Arc::new(MockLlm::texts(&[" "])), 512)
        .generate("p", "c", "s")
        .await;
    assert!(result.text.is_none());
    assert!(result.error.is_some());
}

#[test]
fn generation_result_serializes_only_set_fields() {
    let json = serde_json::to_value(GenerationResult::error("boom")).unwrap();
    assert_eq!(json, serde_json::json!({ "error": "boom" }));
}
