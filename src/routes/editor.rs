//! Editor session routes: toolbar commands and the AI assist modal.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::editor::assist::{AssistAction, AssistError, AssistStyle};
use crate::editor::{EditorError, ToolbarCommand};
use crate::error::ApiError;
use crate::routes::parse_section;
use crate::routes::role::Caller;
use crate::services::editor::{self, AcceptOutcome, EditorServiceError, EditorView, Selection};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CommandBody {
    #[serde(flatten)]
    pub command: ToolbarCommand,
    #[serde(default)]
    pub selection: Option<Selection>,
}

#[derive(Deserialize)]
pub struct ContentBody {
    pub content: String,
}

#[derive(Deserialize)]
pub struct AssistOptionsBody {
    #[serde(default)]
    pub action: AssistAction,
    #[serde(default)]
    pub style: AssistStyle,
}

fn surface_error_to_status(err: &EditorError) -> StatusCode {
    match err {
        EditorError::LimitExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        EditorError::InvalidSelection { .. } | EditorError::InvalidHeading(_) | EditorError::UnsafeUrl(_) => {
            StatusCode::BAD_REQUEST
        }
    }
}

pub(crate) fn editor_error_to_status(err: &EditorServiceError) -> StatusCode {
    match err {
        EditorServiceError::Store(_) | EditorServiceError::NoSession(_) => StatusCode::NOT_FOUND,
        EditorServiceError::Forbidden => StatusCode::FORBIDDEN,
        EditorServiceError::IdeaIncomplete => StatusCode::CONFLICT,
        EditorServiceError::Editor(e) | EditorServiceError::Assist(AssistError::Editor(e)) => {
            surface_error_to_status(e)
        }
        EditorServiceError::Assist(AssistError::Busy | AssistError::NoPendingResponse) => StatusCode::CONFLICT,
        EditorServiceError::Assist(AssistError::EmptyText) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn editor_error(err: EditorServiceError) -> ApiError {
    ApiError::new(editor_error_to_status(&err), &err)
}

type EditorPath = Path<(Uuid, String)>;

/// `GET /api/projects/:id/editor/:section`: the open editor, opening it
/// from the stored text on first use. An open editor keeps its history.
pub async fn open_editor(
    State(state): State<AppState>,
    Path((id, section)): EditorPath,
) -> Result<Json<EditorView>, ApiError> {
    let section = parse_section(&section)?;
    let view = match editor::view(&state, id, section).await {
        Err(EditorServiceError::NoSession(_)) => editor::open_session(&state, id, section).await,
        other => other,
    };
    view.map(Json).map_err(editor_error)
}

/// `POST /api/projects/:id/editor/:section/commands`
pub async fn run_command(
    State(state): State<AppState>,
    Caller(role): Caller,
    Path((id, section)): EditorPath,
    Json(body): Json<CommandBody>,
) -> Result<Json<EditorView>, ApiError> {
    let section = parse_section(&section)?;
    editor::apply_command(&state, id, section, role, &body.command, body.selection)
        .await
        .map(Json)
        .map_err(editor_error)
}

/// `PUT /api/projects/:id/editor/:section/content`: typing or pasting.
pub async fn replace_content(
    State(state): State<AppState>,
    Caller(role): Caller,
    Path((id, section)): EditorPath,
    Json(body): Json<ContentBody>,
) -> Result<Json<EditorView>, ApiError> {
    let section = parse_section(&section)?;
    editor::replace_content(&state, id, section, role, &body.content)
        .await
        .map(Json)
        .map_err(editor_error)
}

/// `PUT /api/projects/:id/editor/:section/assist/options`
pub async fn assist_options(
    State(state): State<AppState>,
    Path((id, section)): EditorPath,
    Json(body): Json<AssistOptionsBody>,
) -> Result<Json<EditorView>, ApiError> {
    let section = parse_section(&section)?;
    editor::set_assist_options(&state, id, section, body.action, body.style)
        .await
        .map(Json)
        .map_err(editor_error)
}

/// `POST /api/projects/:id/editor/:section/assist/send`
pub async fn assist_send(
    State(state): State<AppState>,
    Caller(role): Caller,
    Path((id, section)): EditorPath,
) -> Result<Json<EditorView>, ApiError> {
    let section = parse_section(&section)?;
    editor::assist_send(&state, id, section, role)
        .await
        .map(Json)
        .map_err(editor_error)
}

/// `POST /api/projects/:id/editor/:section/assist/resend`
pub async fn assist_resend(
    State(state): State<AppState>,
    Caller(role): Caller,
    Path((id, section)): EditorPath,
) -> Result<Json<EditorView>, ApiError> {
    let section = parse_section(&section)?;
    editor::assist_resend(&state, id, section, role)
        .await
        .map(Json)
        .map_err(editor_error)
}

/// `POST /api/projects/:id/editor/:section/assist/accept`
pub async fn assist_accept(
    State(state): State<AppState>,
    Caller(role): Caller,
    Path((id, section)): EditorPath,
) -> Result<Json<AcceptOutcome>, ApiError> {
    let section = parse_section(&section)?;
    editor::assist_accept(&state, id, section, role)
        .await
        .map(Json)
        .map_err(editor_error)
}

/// `POST /api/projects/:id/editor/:section/assist/keep`
pub async fn assist_keep(
    State(state): State<AppState>,
    Path((id, section)): EditorPath,
) -> Result<Json<EditorView>, ApiError> {
    let section = parse_section(&section)?;
    editor::assist_keep(&state, id, section).await.map(Json).map_err(editor_error)
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod tests;
