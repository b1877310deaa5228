//! `POST /api/transform`: the text transform endpoint the editor's assist
//! modal talks to, served from the configured LLM.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;

use crate::editor::assist::TransformRequest;
use crate::error::ApiError;
use crate::routes::RequestError;
use crate::services::transform::{LlmTransform, TextTransform, TransformError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TransformResponse {
    pub text: String,
}

pub(crate) fn transform_error_to_status(err: &TransformError) -> StatusCode {
    match err {
        TransformError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        TransformError::ClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
        TransformError::Request(_) | TransformError::Status(_) | TransformError::Parse(_) | TransformError::Llm(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

pub async fn transform_text(
    State(state): State<AppState>,
    Json(request): Json<TransformRequest>,
) -> Result<Json<TransformResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(RequestError::Empty("text").into());
    }
    let Some(llm) = state.llm.clone() else {
        let err = TransformError::NotConfigured;
        return Err(ApiError::new(transform_error_to_status(&err), &err));
    };
    LlmTransform::new(llm, state.config.ai_max_tokens)
        .transform(&request)
        .await
        .map(|text| Json(TransformResponse { text }))
        .map_err(|e| ApiError::new(transform_error_to_status(&e), &e))
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod tests;
