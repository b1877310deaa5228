//! Project and proposal workflow routes.
//!
//! Handlers translate HTTP into calls on [`crate::services::workflow`] and
//! map its errors to status codes. The caller's role comes from the
//! [`Caller`] extractor.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::project::ethics::{EthicsError, EthicsEvent};
use crate::project::{Idea, Project};
use crate::routes::role::Caller;
use crate::routes::{RequestError, parse_section};
use crate::services::experts::Expert;
use crate::services::workflow::{
    self, EthicsOutcome, Notification, ProceedOutcome, SectionView, WorkflowError, WorkflowView,
};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateProjectBody {
    pub title: String,
}

#[derive(Deserialize)]
pub struct ProposalQuery {
    pub section: Option<String>,
}

#[derive(Deserialize)]
pub struct SectionBody {
    pub text: String,
}

pub(crate) fn workflow_error_to_status(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::Store(_) => StatusCode::NOT_FOUND,
        WorkflowError::Forbidden(_) => StatusCode::FORBIDDEN,
        WorkflowError::Ethics(EthicsError::InvalidTransition { .. }) => StatusCode::CONFLICT,
        WorkflowError::Ethics(EthicsError::NotPermitted(_) | EthicsError::OverridesDisabled) => StatusCode::FORBIDDEN,
        WorkflowError::IdeaIncomplete | WorkflowError::NotApproved(_) | WorkflowError::SuggestionInFlight => {
            StatusCode::CONFLICT
        }
        WorkflowError::AiUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        WorkflowError::Suggestion(_) => StatusCode::BAD_GATEWAY,
    }
}

fn workflow_error(err: WorkflowError) -> ApiError {
    ApiError::new(workflow_error_to_status(&err), &err)
}

// =============================================================================
// PROJECTS
// =============================================================================

/// `GET /api/projects`: every project, newest first.
pub async fn list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.store.list().await)
}

/// `POST /api/projects`: create a project in the idea stage.
pub async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<CreateProjectBody>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(RequestError::Empty("title").into());
    }
    Ok((StatusCode::CREATED, Json(state.store.create(title).await)))
}

/// `GET /api/experts`: the roster experts are assigned from.
pub async fn list_experts(State(state): State<AppState>) -> Json<Vec<Expert>> {
    Json(state.experts.list().to_vec())
}

/// `GET /api/projects/:id`
pub async fn get_project(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Project>, ApiError> {
    state
        .store
        .get(id)
        .await
        .map(Json)
        .map_err(|e| workflow_error(e.into()))
}

/// `PUT /api/projects/:id/idea`: replace the idea-stage answers.
pub async fn update_idea(
    State(state): State<AppState>,
    Caller(role): Caller,
    Path(id): Path<Uuid>,
    Json(idea): Json<Idea>,
) -> Result<Json<Project>, ApiError> {
    if !role.can_edit() {
        return Err(workflow_error(WorkflowError::Forbidden("edit the idea")));
    }
    state
        .store
        .update_idea(id, idea)
        .await
        .map(Json)
        .map_err(|e| workflow_error(e.into()))
}

// =============================================================================
// PROPOSAL
// =============================================================================

/// `GET /api/projects/:id/proposal?section=`: the workflow screen.
pub async fn proposal_view(
    State(state): State<AppState>,
    Caller(role): Caller,
    Path(id): Path<Uuid>,
    Query(query): Query<ProposalQuery>,
) -> Result<Json<WorkflowView>, ApiError> {
    let active = query.section.as_deref().map(parse_section).transpose()?;
    workflow::open(&state, id, role, active).await.map(Json).map_err(workflow_error)
}

/// `GET /api/projects/:id/proposal/sections/:section`
pub async fn get_section(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, String)>,
) -> Result<Json<SectionView>, ApiError> {
    let section = parse_section(&section)?;
    workflow::select_section(&state, id, section)
        .await
        .map(Json)
        .map_err(workflow_error)
}

/// `PUT /api/projects/:id/proposal/sections/:section`
pub async fn put_section(
    State(state): State<AppState>,
    Caller(role): Caller,
    Path((id, section)): Path<(Uuid, String)>,
    Json(body): Json<SectionBody>,
) -> Result<Json<SectionView>, ApiError> {
    let section = parse_section(&section)?;
    workflow::edit_section(&state, id, section, role, &body.text)
        .await
        .map(Json)
        .map_err(workflow_error)
}

/// `POST /api/projects/:id/proposal/draft`
pub async fn save_draft(
    State(state): State<AppState>,
    Caller(role): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError> {
    workflow::save_draft(&state, id, role).await.map(Json).map_err(workflow_error)
}

/// `POST /api/projects/:id/proposal/sections/:section/suggest`
pub async fn suggest_section(
    State(state): State<AppState>,
    Caller(role): Caller,
    Path((id, section)): Path<(Uuid, String)>,
) -> Result<Json<SectionView>, ApiError> {
    let section = parse_section(&section)?;
    workflow::request_suggestion(&state, id, section, role)
        .await
        .map(Json)
        .map_err(workflow_error)
}

// =============================================================================
// ETHICS / ADVANCE
// =============================================================================

/// `POST /api/projects/:id/ethics/:event`
pub async fn ethics_event(
    State(state): State<AppState>,
    Caller(role): Caller,
    Path((id, event)): Path<(Uuid, String)>,
) -> Result<Json<EthicsOutcome>, ApiError> {
    let Some(event) = EthicsEvent::from_str(&event) else {
        return Err(RequestError::UnknownEvent(event).into());
    };
    workflow::apply_ethics_event(&state, id, event, role)
        .await
        .map(Json)
        .map_err(workflow_error)
}

/// `POST /api/projects/:id/proceed`: advance to data collection.
pub async fn proceed(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<ProceedOutcome>, ApiError> {
    workflow::proceed_to_data_collection(&state, id)
        .await
        .map(Json)
        .map_err(workflow_error)
}

#[cfg(test)]
#[path = "projects_test.rs"]
mod tests;
