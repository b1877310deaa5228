//! Caller role extraction.
//!
//! The proposal screen is either editable (researcher) or read-only. The
//! role arrives in the `x-studyflow-role` header; a missing or unknown
//! value is read-only.

use std::convert::Infallible;

use axum::http::request::Parts;

use crate::services::workflow::Role;

pub const ROLE_HEADER: &str = "x-studyflow-role";

/// Extractor resolving the caller's [`Role`] from the request headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Role);

impl Caller {
    #[must_use]
    pub fn from_parts(parts: &Parts) -> Self {
        let raw = parts.headers.get(ROLE_HEADER).and_then(|v| v.to_str().ok());
        Self(Role::from_header(raw))
    }
}

impl<S> axum::extract::FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
#[path = "role_test.rs"]
mod tests;
