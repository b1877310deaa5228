//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the project store, the open editor sessions, the optional
//! database pool and the AI collaborators. Every field is cheap to clone.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::llm::LlmChat;
use crate::project::store::ProjectStore;
use crate::services::editor::EditorSessions;
use crate::services::experts::ExpertDirectory;
use crate::services::suggestion::{GenerationService, LlmGeneration};
use crate::services::transform::TextTransform;

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: ProjectStore,
    /// `None` when `DATABASE_URL` is unset; projects then live in memory only.
    pub pool: Option<PgPool>,
    pub llm: Option<Arc<dyn LlmChat>>,
    /// Backend for the editor's assist flow.
    pub transform: Option<Arc<dyn TextTransform>>,
    /// Backend for per-section suggestions.
    pub generation: Option<Arc<dyn GenerationService>>,
    pub experts: Arc<ExpertDirectory>,
    pub editors: EditorSessions,
    /// Projects with a suggestion request outstanding.
    pub suggestions_in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: AppConfig,
        pool: Option<PgPool>,
        llm: Option<Arc<dyn LlmChat>>,
        transform: Option<Arc<dyn TextTransform>>,
    ) -> Self {
        let generation = llm
            .clone()
            .map(|llm| Arc::new(LlmGeneration::new(llm, config.ai_max_tokens)) as Arc<dyn GenerationService>);
        Self {
            config: Arc::new(config),
            store: ProjectStore::new(),
            pool,
            llm,
            transform,
            generation,
            experts: Arc::new(ExpertDirectory::with_defaults()),
            editors: Arc::new(RwLock::new(HashMap::new())),
            suggestions_in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_without_llm_has_no_generation() {
        let state = test_helpers::test_app_state();
        assert!(state.llm.is_none());
        assert!(state.generation.is_none());
        assert!(state.transform.is_none());
        assert!(state.pool.is_none());
    }

    #[test]
    fn llm_enables_generation() {
        let llm: Arc<dyn LlmChat> = Arc::new(test_helpers::MockLlm::texts(&[]));
        let state = test_helpers::test_app_state_with(AppConfig::default(), Some(llm), None);
        assert!(state.generation.is_some());
    }

    #[test]
    fn clones_share_the_store() {
        let state = test_helpers::test_app_state();
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.editors, &clone.editors));
        assert!(Arc::ptr_eq(&state.suggestions_in_flight, &clone.suggestions_in_flight));
    }
}
