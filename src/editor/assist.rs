//! AI-assist flow: pick an action and a style, send the surface text to the
//! transform endpoint, review the result in a modal.
//!
//! DESIGN
//! ======
//! The session is a small state holder; it never performs I/O. Callers take
//! the [`TransformRequest`] returned by [`AssistSession::begin`], run it, and
//! hand the outcome back through [`AssistSession::complete`]. While a
//! request is outstanding the session is busy and refuses another send.
//!
//! ERROR HANDLING
//! ==============
//! Every transport failure collapses to [`GENERIC_ERROR`]. The cause is
//! logged, never shown.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{EditorError, EditorSurface};
use crate::error::ErrorCode;

/// The one message users see for any failed transform.
pub const GENERIC_ERROR: &str = "Failed to get AI response. Please try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistAction {
    #[default]
    Expand,
    Rewrite,
    Summarize,
    Improve,
    Simplify,
}

impl AssistAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expand => "expand",
            Self::Rewrite => "rewrite",
            Self::Summarize => "summarize",
            Self::Improve => "improve",
            Self::Simplify => "simplify",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistStyle {
    #[default]
    Formal,
    Casual,
    Creative,
    Professional,
}

impl AssistStyle {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Casual => "casual",
            Self::Creative => "creative",
            Self::Professional => "professional",
        }
    }
}

/// Wire body of the transform endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRequest {
    pub text: String,
    pub action: AssistAction,
    pub style: AssistStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssistError {
    #[error("an AI request is already in progress")]
    Busy,
    #[error("there is no text to send")]
    EmptyText,
    #[error("no AI response is waiting for review")]
    NoPendingResponse,
    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl ErrorCode for AssistError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Busy => "E_ASSIST_BUSY",
            Self::EmptyText => "E_ASSIST_EMPTY",
            Self::NoPendingResponse => "E_ASSIST_NO_RESPONSE",
            Self::Editor(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

/// Snapshot of the assist panel for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssistSession {
    pub action: AssistAction,
    pub style: AssistStyle,
    pub loading: bool,
    pub response_text: String,
    pub error: Option<String>,
    pub modal_open: bool,
}

impl AssistSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_options(&mut self, action: AssistAction, style: AssistStyle) {
        self.action = action;
        self.style = style;
    }

    /// Start a send: mark busy and build the request from the surface text.
    ///
    /// # Errors
    ///
    /// [`AssistError::Busy`] while another request is outstanding,
    /// [`AssistError::EmptyText`] when the surface has no text.
    pub fn begin(&mut self, surface: &EditorSurface) -> Result<TransformRequest, AssistError> {
        if self.loading {
            return Err(AssistError::Busy);
        }
        let text = surface.plain_text();
        if text.trim().is_empty() {
            return Err(AssistError::EmptyText);
        }
        self.loading = true;
        self.error = None;
        Ok(TransformRequest { text, action: self.action, style: self.style })
    }

    /// Record the outcome of the request started by [`Self::begin`].
    pub fn complete<E: std::fmt::Display>(&mut self, outcome: Result<String, E>) {
        self.loading = false;
        match outcome {
            Ok(text) => {
                self.response_text = text;
                self.error = None;
                self.modal_open = true;
            }
            Err(e) => {
                warn!(error = %e, action = self.action.as_str(), "assist: transform failed");
                self.response_text.clear();
                self.error = Some(GENERIC_ERROR.to_owned());
                self.modal_open = false;
            }
        }
    }

    /// Drop an outstanding request that will never report back.
    pub fn cancel(&mut self) {
        if self.loading {
            warn!(action = self.action.as_str(), "assist: request abandoned");
            self.loading = false;
        }
    }

    /// Replace the whole surface with the response. Returns the accepted text.
    ///
    /// # Errors
    ///
    /// [`AssistError::NoPendingResponse`] if the modal is not open, or an
    /// editor error if the surface refuses the content. The response stays
    /// pending on error.
    pub fn accept(&mut self, surface: &mut EditorSurface) -> Result<String, AssistError> {
        if !self.modal_open {
            return Err(AssistError::NoPendingResponse);
        }
        surface.replace_content(&self.response_text)?;
        let accepted = std::mem::take(&mut self.response_text);
        self.modal_open = false;
        Ok(accepted)
    }

    /// Discard the response and send again with the same action and style.
    ///
    /// # Errors
    ///
    /// [`AssistError::NoPendingResponse`] if the modal is not open, otherwise
    /// as [`Self::begin`].
    pub fn resend(&mut self, surface: &EditorSurface) -> Result<TransformRequest, AssistError> {
        self.keep_existing()?;
        self.begin(surface)
    }

    /// Discard the response and leave the surface as it is.
    ///
    /// # Errors
    ///
    /// [`AssistError::NoPendingResponse`] if the modal is not open.
    pub fn keep_existing(&mut self) -> Result<(), AssistError> {
        if !self.modal_open {
            return Err(AssistError::NoPendingResponse);
        }
        self.response_text.clear();
        self.modal_open = false;
        Ok(())
    }
}

#[cfg(test)]
#[path = "assist_test.rs"]
mod tests;
