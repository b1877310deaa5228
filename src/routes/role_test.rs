use axum::http::Request;

use super::*;

fn parts_with(header: Option<&str>) -> Parts {
    let mut builder = Request::builder().uri("/api/projects");
    if let Some(value) = header {
        builder = builder.header(ROLE_HEADER, value);
    }
    builder.body(()).unwrap().into_parts().0
}

#[test]
fn researcher_header_can_edit() {
    assert_eq!(Caller::from_parts(&parts_with(Some("researcher"))), Caller(Role::Researcher));
}

#[test]
fn missing_header_is_read_only() {
    assert_eq!(Caller::from_parts(&parts_with(None)), Caller(Role::Reviewer));
}

#[test]
fn unknown_header_is_read_only() {
    assert_eq!(Caller::from_parts(&parts_with(Some("admin"))), Caller(Role::Reviewer));
}

#[tokio::test]
async fn extractor_never_rejects() {
    use axum::extract::FromRequestParts;

    let mut parts = parts_with(Some("Researcher"));
    let caller = Caller::from_request_parts(&mut parts, &()).await.unwrap();
    assert_eq!(caller.0, Role::Researcher);
}
