//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the JSON API for projects, proposal workflow, editor
//! sessions and the text transform endpoint under a single Axum router.
//! When a static directory is configured, the built frontend is served as
//! the fallback.

pub mod editor;
pub mod projects;
pub mod role;
pub mod transform;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ErrorCode};
use crate::project::SectionId;
use crate::state::AppState;

/// Malformed path or body values the extractors accept but the domain does not.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("unknown proposal section: {0}")]
    UnknownSection(String),
    #[error("unknown ethics event: {0}")]
    UnknownEvent(String),
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

impl ErrorCode for RequestError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSection(_) => "E_UNKNOWN_SECTION",
            Self::UnknownEvent(_) => "E_UNKNOWN_EVENT",
            Self::Empty(_) => "E_EMPTY_FIELD",
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, &err)
    }
}

/// Resolve a section path segment against the catalog.
pub(crate) fn parse_section(raw: &str) -> Result<SectionId, ApiError> {
    SectionId::from_str(raw).ok_or_else(|| RequestError::UnknownSection(raw.to_owned()).into())
}

/// API routes shared by every deployment.
fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/projects", get(projects::list_projects).post(projects::create_project))
        .route("/api/projects/{id}", get(projects::get_project))
        .route("/api/experts", get(projects::list_experts))
        .route("/api/projects/{id}/idea", put(projects::update_idea))
        .route("/api/projects/{id}/proposal", get(projects::proposal_view))
        .route(
            "/api/projects/{id}/proposal/sections/{section}",
            get(projects::get_section).put(projects::put_section),
        )
        .route("/api/projects/{id}/proposal/draft", post(projects::save_draft))
        .route(
            "/api/projects/{id}/proposal/sections/{section}/suggest",
            post(projects::suggest_section),
        )
        .route("/api/projects/{id}/ethics/{event}", post(projects::ethics_event))
        .route("/api/projects/{id}/proceed", post(projects::proceed))
        .route("/api/projects/{id}/editor/{section}", get(editor::open_editor))
        .route("/api/projects/{id}/editor/{section}/commands", post(editor::run_command))
        .route("/api/projects/{id}/editor/{section}/content", put(editor::replace_content))
        .route("/api/projects/{id}/editor/{section}/assist/send", post(editor::assist_send))
        .route("/api/projects/{id}/editor/{section}/assist/accept", post(editor::assist_accept))
        .route("/api/projects/{id}/editor/{section}/assist/resend", post(editor::assist_resend))
        .route("/api/projects/{id}/editor/{section}/assist/keep", post(editor::assist_keep))
        .route("/api/projects/{id}/editor/{section}/assist/options", put(editor::assist_options))
        .route("/api/transform", post(transform::transform_text))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

/// Full application router: API plus optional static frontend.
pub fn app(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let router = api_routes(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());
    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => router,
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
