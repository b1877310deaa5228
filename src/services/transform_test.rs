use std::sync::Mutex;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;

use super::*;
use crate::llm::types::LlmError;
use crate::state::test_helpers::{MockLlm, reply};

fn request(text: &str, action: AssistAction, style: AssistStyle) -> TransformRequest {
    TransformRequest { text: text.into(), action, style }
}

/// Bind a router on an ephemeral local port and return the transform URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/transform")
}

type Captured = Arc<Mutex<Vec<serde_json::Value>>>;

async fn echo_short(State(captured): State<Captured>, body: String) -> String {
    captured
        .lock()
        .unwrap()
        .push(serde_json::from_str(&body).unwrap());
    r#"{"text":"Short version."}"#.to_string()
}

// =============================================================================
// HttpTransformClient
// =============================================================================

#[tokio::test]
async fn http_client_posts_exact_body_and_reads_text() {
    let captured: Captured = Arc::default();
    let router = Router::new()
        .route("/transform", post(echo_short))
        .with_state(captured.clone());
    let client = HttpTransformClient::new(serve(router).await, 5).unwrap();

    let text = client
        .transform(&request("Long paragraph...", AssistAction::Summarize, AssistStyle::Casual))
        .await
        .unwrap();

    assert_eq!(text, "Short version.");
    let bodies = captured.lock().unwrap();
    assert_eq!(
        bodies[0],
        serde_json::json!({ "text": "Long paragraph...", "action": "summarize", "style": "casual" })
    );
}

#[tokio::test]
async fn http_client_non_2xx_is_status_error() {
    let router = Router::new().route("/transform", post(|| async { StatusCode::BAD_GATEWAY }));
    let client = HttpTransformClient::new(serve(router).await, 5).unwrap();

    let err = client
        .transform(&request("x", AssistAction::Expand, AssistStyle::Formal))
        .await
        .unwrap_err();
    assert!(matches!(err, TransformError::Status(502)));
    assert!(err.retryable());
}

#[tokio::test]
async fn http_client_body_without_text_is_parse_error() {
    let router = Router::new().route("/transform", post(|| async { r#"{"result":"nope"}"# }));
    let client = HttpTransformClient::new(serve(router).await, 5).unwrap();

    let err = client
        .transform(&request("x", AssistAction::Expand, AssistStyle::Formal))
        .await
        .unwrap_err();
    assert!(matches!(err, TransformError::Parse(_)));
    assert_eq!(err.error_code(), "E_TRANSFORM_PARSE");
}

#[tokio::test]
async fn http_client_unreachable_is_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = HttpTransformClient::new(format!("http://{addr}/transform"), 5).unwrap();

    let err = client
        .transform(&request("x", AssistAction::Expand, AssistStyle::Formal))
        .await
        .unwrap_err();
    assert!(matches!(err, TransformError::Request(_)));
}

// =============================================================================
// LlmTransform
// =============================================================================

#[test]
fn system_prompt_names_action_and_style() {
    let prompt = system_prompt(AssistAction::Summarize, AssistStyle::Casual);
    assert!(prompt.contains("Summarize"));
    assert!(prompt.contains("conversational"));
}

#[tokio::test]
async fn llm_transform_sends_text_and_trims_reply() {
    let llm = Arc::new(MockLlm::texts(&["  Short version.\n"]));
    let transform = LlmTransform::new(llm.clone(), 256);

    let text = transform
        .transform(&request("Long paragraph...", AssistAction::Summarize, AssistStyle::Casual))
        .await
        .unwrap();

    assert_eq!(text, "Short version.");
    let calls = llm.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0.contains("Summarize"));
    assert_eq!(calls[0].1[0].content, "Long paragraph...");
}

#[tokio::test]
async fn llm_transform_empty_reply_is_parse_error() {
    let transform = LlmTransform::new(Arc::new(MockLlm::new(vec![Ok(reply("   "))])), 256);
    let err = transform
        .transform(&request("x", AssistAction::Improve, AssistStyle::Formal))
        .await
        .unwrap_err();
    assert!(matches!(err, TransformError::Parse(_)));
}

#[tokio::test]
async fn llm_transform_propagates_llm_error() {
    let llm = MockLlm::new(vec![Err(LlmError::Status { status: 503, body: String::new() })]);
    let transform = LlmTransform::new(Arc::new(llm), 256);
    let err = transform
        .transform(&request("x", AssistAction::Improve, AssistStyle::Formal))
        .await
        .unwrap_err();
    assert!(matches!(err, TransformError::Llm(_)));
    assert!(err.retryable());
}
