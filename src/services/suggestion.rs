//! Suggestion service: retrieval-augmented drafting for proposal sections.
//!
//! DESIGN
//! ======
//! The workflow builds a prompt from the idea and the section being written,
//! pairs it with a knowledge-base context string and hands both to a
//! [`GenerationService`]. The service answers with `{text?, error?}` and
//! never fails outright; the workflow decides what to show.
//!
//! The knowledge base is simulated: a fixed context string stands in for
//! retrieval.

use std::fmt::Write;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm::LlmChat;
use crate::llm::types::Message;
use crate::project::{Idea, SectionId};

/// Marker placed between existing section text and an appended suggestion.
pub const SUGGESTION_SEPARATOR: &str = "\n\n--- AI Suggestion ---\n\n";

/// Shown when the generation service fails without saying why.
pub const GENERIC_SUGGESTION_ERROR: &str = "Failed to generate a suggestion. Please try again.";

pub const SYSTEM_INSTRUCTION: &str = "You are a research methods advisor helping a researcher draft one section of a \
research proposal. Use the supplied knowledge-base context where it is relevant. Write in an academic register and \
return only the text to add to the section.";

pub const KNOWLEDGE_BASE_CONTEXT: &str = "Knowledge base: Research proposals typically state the problem and its \
significance, review prior literature, pose answerable research questions, describe design, sampling and data \
collection, plan the statistical analysis, address informed consent, privacy and risk to participants, and give a \
realistic timeline with cited references.";

/// Outcome of one generation call. Exactly one field is normally set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), error: None }
    }

    #[must_use]
    pub fn error(error: impl Into<String>) -> Self {
        Self { text: None, error: Some(error.into()) }
    }
}

#[async_trait::async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, prompt: &str, context: &str, system_instruction: &str) -> GenerationResult;
}

// =============================================================================
// PROMPT
// =============================================================================

/// Prompt for a suggestion on `section`, given the idea and what is written so far.
#[must_use]
pub fn build_prompt(idea: Option<&Idea>, section: SectionId, current_text: &str) -> String {
    let mut prompt = String::new();
    if let Some(idea) = idea {
        let _ = writeln!(prompt, "Research concept: {}", idea.concept.trim());
        if !idea.background.trim().is_empty() {
            let _ = writeln!(prompt, "Background: {}", idea.background.trim());
        }
        if !idea.objective.trim().is_empty() {
            let _ = writeln!(prompt, "Objective: {}", idea.objective.trim());
        }
    }
    let _ = writeln!(prompt, "Section: {}", section.info().name);
    if current_text.trim().is_empty() {
        prompt.push_str("The section is empty. Draft an opening for it.");
    } else {
        let _ = write!(
            prompt,
            "Current section text:\n{}\n\nSuggest text that continues this section.",
            current_text.trim()
        );
    }
    prompt
}

/// Section text after appending `suggestion` behind the separator.
#[must_use]
pub fn append_suggestion(current: &str, suggestion: &str) -> String {
    format!("{current}{SUGGESTION_SEPARATOR}{}", suggestion.trim())
}

// =============================================================================
// LLM-BACKED SERVICE
// =============================================================================

pub struct LlmGeneration {
    llm: Arc<dyn LlmChat>,
    max_tokens: u32,
}

impl LlmGeneration {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmChat>, max_tokens: u32) -> Self {
        Self { llm, max_tokens }
    }
}

#[async_trait::async_trait]
impl GenerationService for LlmGeneration {
    async fn generate(&self, prompt: &str, context: &str, system_instruction: &str) -> GenerationResult {
        let messages = [Message::user(format!("{context}\n\n{prompt}"))];
        match self.llm.chat(self.max_tokens, system_instruction, &messages).await {
            Ok(response) if !response.text.trim().is_empty() => {
                if response.truncated() {
                    warn!(max_tokens = self.max_tokens, "suggestion: reply cut at token budget");
                }
                info!(output_tokens = response.usage.output, "suggestion: generated");
                GenerationResult::text(response.text.trim())
            }
            Ok(_) => GenerationResult::error("The assistant returned an empty suggestion."),
            Err(e) => {
                warn!(error = %e, "suggestion: llm call failed");
                GenerationResult::error(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "suggestion_test.rs"]
mod tests;
