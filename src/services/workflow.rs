//! Proposal workflow: sections, suggestions, ethics review and advancement.
//!
//! DESIGN
//! ======
//! Every operation loads the project from the store, checks its
//! preconditions and writes back through a store update, so a failed step
//! leaves the record exactly as it was. The functions take `&AppState` the
//! way the other services do and return plain values for the route layer.
//!
//! Two gates apply throughout:
//! - the project must have a populated idea before the workflow opens;
//! - content changes and submissions require a [`Role`] that can edit.
//!
//! ERROR HANDLING
//! ==============
//! Precondition failures are typed [`WorkflowError`]s. Suggestion failures
//! carry the generation service's message, or a generic fallback when it
//! gave none.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::project::ethics::{self, EthicsError, TransitionContext};
use crate::project::sections::SECTIONS;
use crate::project::store::StoreError;
use crate::project::{
    EthicsEvent, EthicsStatus, EthicsTransition, ExpertRole, Idea, Project, ProjectStage, ProposalPatch, SectionId,
    now_ms,
};
use crate::services::suggestion::{self, GENERIC_SUGGESTION_ERROR, KNOWLEDGE_BASE_CONTEXT, SYSTEM_INSTRUCTION};
use crate::state::AppState;

/// Where the client goes once data collection opens.
pub const DATA_COLLECTION_PATH: &str = "/data-collection";

// =============================================================================
// TYPES
// =============================================================================

/// Caller role. Only researchers may change a proposal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Researcher,
    #[default]
    Reviewer,
}

impl Role {
    /// Anything but `researcher` is read-only.
    #[must_use]
    pub fn from_header(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(r) if r.eq_ignore_ascii_case("researcher") => Self::Researcher,
            _ => Self::Reviewer,
        }
    }

    #[must_use]
    pub fn can_edit(self) -> bool {
        self == Self::Researcher
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("complete the idea stage before writing the proposal")]
    IdeaIncomplete,
    #[error("only researchers may {0}")]
    Forbidden(&'static str),
    #[error(transparent)]
    Ethics(#[from] EthicsError),
    #[error("ethics approval is required before proceeding to data collection (status: {0})")]
    NotApproved(EthicsStatus),
    #[error("a suggestion is already being generated for this project")]
    SuggestionInFlight,
    #[error("AI suggestions are not configured")]
    AiUnavailable,
    #[error("{0}")]
    Suggestion(String),
}

impl ErrorCode for WorkflowError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.error_code(),
            Self::IdeaIncomplete => "E_IDEA_INCOMPLETE",
            Self::Forbidden(_) => "E_FORBIDDEN",
            Self::Ethics(e) => e.error_code(),
            Self::NotApproved(_) => "E_NOT_APPROVED",
            Self::SuggestionInFlight => "E_SUGGESTION_BUSY",
            Self::AiUnavailable => "E_AI_UNAVAILABLE",
            Self::Suggestion(_) => "E_SUGGESTION_FAILED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::SuggestionInFlight | Self::Suggestion(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Info,
}

/// A toast for the client to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    fn success(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, message: message.into() }
    }

    fn info(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Info, message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionView {
    pub id: SectionId,
    pub name: &'static str,
    pub placeholder: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EthicsPanel {
    pub status: EthicsStatus,
    pub feedback: Option<String>,
    pub history: Vec<EthicsTransition>,
    /// Events this caller could trigger right now.
    pub available_events: Vec<EthicsEvent>,
}

/// Everything the proposal screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowView {
    pub project_id: Uuid,
    pub title: String,
    pub stage: ProjectStage,
    pub idea: Idea,
    pub active_section: SectionId,
    pub sections: Vec<SectionView>,
    pub ethics: EthicsPanel,
    pub experts: BTreeMap<ExpertRole, String>,
    pub can_edit: bool,
    pub can_proceed: bool,
    pub suggestion_pending: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EthicsOutcome {
    pub project: Project,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProceedOutcome {
    pub project: Project,
    pub navigate_to: &'static str,
}

// =============================================================================
// OPEN / SECTIONS
// =============================================================================

async fn load(state: &AppState, project_id: Uuid) -> Result<Project, WorkflowError> {
    let project = state.store.get(project_id).await?;
    if !project.has_populated_idea() {
        return Err(WorkflowError::IdeaIncomplete);
    }
    Ok(project)
}

fn require_edit(role: Role, action: &'static str) -> Result<(), WorkflowError> {
    if role.can_edit() { Ok(()) } else { Err(WorkflowError::Forbidden(action)) }
}

fn section_view(project: &Project, id: SectionId) -> SectionView {
    let info = id.info();
    SectionView {
        id,
        name: info.name,
        placeholder: info.placeholder,
        text: project.proposal.section_text(id).to_owned(),
    }
}

fn transition_context(state: &AppState, role: Role) -> TransitionContext {
    TransitionContext { can_edit: role.can_edit(), dev_overrides: state.config.dev_approvals }
}

fn suggestion_pending(state: &AppState, project_id: Uuid) -> bool {
    state
        .suggestions_in_flight
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .contains(&project_id)
}

/// Open the proposal screen with `active` (default: first catalog section).
///
/// # Errors
///
/// [`WorkflowError::Store`] for an unknown project and
/// [`WorkflowError::IdeaIncomplete`] before the idea stage is done.
pub async fn open(
    state: &AppState,
    project_id: Uuid,
    role: Role,
    active: Option<SectionId>,
) -> Result<WorkflowView, WorkflowError> {
    let project = load(state, project_id).await?;
    let status = project.proposal.ethics_status;
    Ok(WorkflowView {
        project_id,
        title: project.title.clone(),
        stage: project.stage,
        idea: project.idea.clone().unwrap_or_default(),
        active_section: active.unwrap_or_else(SectionId::first),
        sections: SECTIONS.iter().map(|s| section_view(&project, s.id)).collect(),
        ethics: EthicsPanel {
            status,
            feedback: project.proposal.ethics_feedback.clone(),
            history: project.proposal.ethics_history.clone(),
            available_events: ethics::available_events(status, transition_context(state, role)),
        },
        experts: project.experts.clone(),
        can_edit: role.can_edit(),
        can_proceed: status == EthicsStatus::Approved,
        suggestion_pending: suggestion_pending(state, project_id),
    })
}

/// The stored text of one section, `""` when unset.
///
/// # Errors
///
/// As [`open`].
pub async fn select_section(
    state: &AppState,
    project_id: Uuid,
    section: SectionId,
) -> Result<SectionView, WorkflowError> {
    let project = load(state, project_id).await?;
    Ok(section_view(&project, section))
}

/// Write a section's text straight into the store.
///
/// # Errors
///
/// As [`open`], plus [`WorkflowError::Forbidden`] for read-only callers.
pub async fn edit_section(
    state: &AppState,
    project_id: Uuid,
    section: SectionId,
    role: Role,
    text: &str,
) -> Result<SectionView, WorkflowError> {
    require_edit(role, "edit the proposal")?;
    load(state, project_id).await?;
    let project = state
        .store
        .update_proposal(project_id, ProposalPatch::section(section, text))
        .await?;
    super::editor::sync_section(state, project_id, section, text).await;
    Ok(section_view(&project, section))
}

/// Re-submit the proposal as it is. Only produces a confirmation.
///
/// # Errors
///
/// As [`edit_section`].
pub async fn save_draft(state: &AppState, project_id: Uuid, role: Role) -> Result<Notification, WorkflowError> {
    require_edit(role, "save the proposal")?;
    let project = load(state, project_id).await?;
    let proposal = project.proposal;
    let patch = ProposalPatch {
        sections: proposal.sections,
        ethics_status: Some(proposal.ethics_status),
        ethics_feedback: proposal.ethics_feedback,
    };
    state.store.update_proposal(project_id, patch).await?;
    info!(%project_id, "workflow: draft saved");
    Ok(Notification::success("Proposal draft saved."))
}

// =============================================================================
// SUGGESTIONS
// =============================================================================

/// Marks a project busy for the lifetime of the guard.
struct InFlight<'a> {
    state: &'a AppState,
    project_id: Uuid,
}

impl<'a> InFlight<'a> {
    fn acquire(state: &'a AppState, project_id: Uuid) -> Option<Self> {
        let mut in_flight = state
            .suggestions_in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if in_flight.insert(project_id) { Some(Self { state, project_id }) } else { None }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state
            .suggestions_in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&self.project_id);
    }
}

/// Generate a suggestion for `section` and append it to the section text.
///
/// # Errors
///
/// As [`edit_section`], plus [`WorkflowError::SuggestionInFlight`] while
/// another request runs for this project, [`WorkflowError::AiUnavailable`]
/// without a generation backend and [`WorkflowError::Suggestion`] when
/// generation fails.
pub async fn request_suggestion(
    state: &AppState,
    project_id: Uuid,
    section: SectionId,
    role: Role,
) -> Result<SectionView, WorkflowError> {
    require_edit(role, "request suggestions")?;
    let project = load(state, project_id).await?;
    let Some(generation) = state.generation.clone() else {
        return Err(WorkflowError::AiUnavailable);
    };
    let Some(_guard) = InFlight::acquire(state, project_id) else {
        return Err(WorkflowError::SuggestionInFlight);
    };

    let prompt = suggestion::build_prompt(project.idea.as_ref(), section, project.proposal.section_text(section));
    info!(%project_id, section = section.as_str(), "workflow: suggestion requested");
    let result = generation.generate(&prompt, KNOWLEDGE_BASE_CONTEXT, SYSTEM_INSTRUCTION).await;

    let Some(text) = result.text.filter(|t| !t.trim().is_empty()) else {
        let message = result
            .error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| GENERIC_SUGGESTION_ERROR.to_owned());
        warn!(%project_id, section = section.as_str(), error = %message, "workflow: suggestion failed");
        return Err(WorkflowError::Suggestion(message));
    };

    let project = state
        .store
        .update(project_id, |p: &mut Project| -> Result<(), WorkflowError> {
            let next = suggestion::append_suggestion(p.proposal.section_text(section), &text);
            p.proposal.sections.insert(section, next);
            Ok(())
        })
        .await?;
    let view = section_view(&project, section);
    super::editor::sync_section(state, project_id, section, &view.text).await;
    Ok(view)
}

// =============================================================================
// ETHICS
// =============================================================================

/// Apply one ethics event and record it in the audit trail.
///
/// # Errors
///
/// As [`open`], plus [`WorkflowError::Ethics`] for a transition the table
/// rejects or the caller may not make.
pub async fn apply_ethics_event(
    state: &AppState,
    project_id: Uuid,
    event: EthicsEvent,
    role: Role,
) -> Result<EthicsOutcome, WorkflowError> {
    load(state, project_id).await?;
    let ctx = transition_context(state, role);

    let mut project = state
        .store
        .update(project_id, |p: &mut Project| -> Result<(), WorkflowError> {
            let from = p.proposal.ethics_status;
            let to = ethics::transition(from, event, ctx)?;
            p.proposal.ethics_status = to;
            p.proposal.ethics_history.push(EthicsTransition { from, to, event, at_ms: now_ms() });
            if event == EthicsEvent::ReceiveFeedback {
                p.proposal.ethics_feedback = Some(ethics::SIMULATED_FEEDBACK.to_owned());
            }
            if p.stage == ProjectStage::Proposal {
                info!(project_id = %p.id, stage = ProjectStage::EthicsReview.as_str(), "workflow: stage changed");
                p.stage = ProjectStage::EthicsReview;
            }
            Ok(())
        })
        .await?;

    let status = project.proposal.ethics_status;
    info!(%project_id, event = event.as_str(), %status, "workflow: ethics transition");
    if event == EthicsEvent::ForceApprove {
        warn!(%project_id, "workflow: ethics approval forced through dev override");
    }

    let mut notifications = vec![Notification::success(format!("Ethics status is now {status}."))];
    if status == EthicsStatus::Approved {
        if let Some(expert) = state.experts.statistician() {
            project = state
                .store
                .assign_expert(project_id, ExpertRole::Statistician, &expert.id)
                .await?;
            let message = format!("{} has been assigned as your statistician.", expert.name);
            notifications.push(Notification::success(message));
        } else {
            notifications.push(Notification::info("No statistician is available to assign yet."));
        }
    }

    Ok(EthicsOutcome { project, notifications })
}

// =============================================================================
// ADVANCE
// =============================================================================

/// Move the project to data collection. Requires ethics approval.
///
/// # Errors
///
/// As [`open`], plus [`WorkflowError::NotApproved`] when the proposal is
/// not approved. The stage is unchanged on error.
pub async fn proceed_to_data_collection(state: &AppState, project_id: Uuid) -> Result<ProceedOutcome, WorkflowError> {
    let status = load(state, project_id).await?.proposal.ethics_status;
    if status != EthicsStatus::Approved {
        let err = WorkflowError::NotApproved(status);
        warn!(%project_id, error = %err, "workflow: proceed refused");
        return Err(err);
    }
    // Approved has no outgoing transitions, so the check above cannot go stale.
    let stage = ProjectStage::DataCollection;
    let project = state.store.set_stage(project_id, stage).await?;
    info!(%project_id, stage = stage.as_str(), "workflow: stage changed");
    Ok(ProceedOutcome { project, navigate_to: DATA_COLLECTION_PATH })
}

#[cfg(test)]
#[path = "workflow_test.rs"]
mod tests;
