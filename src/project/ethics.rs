//! Ethics review state machine.
//!
//! DESIGN
//! ======
//! The review is simulated locally: nothing external adjudicates. Status is
//! a closed enum and every move goes through [`transition`], which consults
//! a fixed table and rejects anything not listed.
//!
//! ```text
//! Not Submitted --submit--> Submitted --receive_feedback--> Feedback Received
//!                               ^                                  |
//!                               +------------resubmit--------------+
//! any non-approved --force_approve (dev overrides only)--> Approved
//! ```

use serde::{Deserialize, Serialize};

/// Feedback text recorded when a simulated review comes back.
pub const SIMULATED_FEEDBACK: &str =
    "Please clarify the informed consent procedure and how participant data will be anonymized.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EthicsStatus {
    #[default]
    #[serde(rename = "Not Submitted")]
    NotSubmitted,
    #[serde(rename = "Submitted")]
    Submitted,
    #[serde(rename = "Feedback Received")]
    FeedbackReceived,
    #[serde(rename = "Approved")]
    Approved,
}

impl EthicsStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotSubmitted => "Not Submitted",
            Self::Submitted => "Submitted",
            Self::FeedbackReceived => "Feedback Received",
            Self::Approved => "Approved",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Approved
    }
}

impl std::fmt::Display for EthicsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EthicsEvent {
    Submit,
    ReceiveFeedback,
    Resubmit,
    ForceApprove,
}

impl EthicsEvent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::ReceiveFeedback => "receive_feedback",
            Self::Resubmit => "resubmit",
            Self::ForceApprove => "force_approve",
        }
    }

    #[must_use]
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "submit" => Some(Self::Submit),
            "receive_feedback" => Some(Self::ReceiveFeedback),
            "resubmit" => Some(Self::Resubmit),
            "force_approve" => Some(Self::ForceApprove),
            _ => None,
        }
    }
}

/// One audit-trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthicsTransition {
    pub from: EthicsStatus,
    pub to: EthicsStatus,
    pub event: EthicsEvent,
    pub at_ms: i64,
}

/// Who is asking, as far as the table cares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionContext {
    pub can_edit: bool,
    pub dev_overrides: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EthicsError {
    #[error("cannot {} while ethics status is {from}", .event.as_str())]
    InvalidTransition { from: EthicsStatus, event: EthicsEvent },
    #[error("only project editors may {}", .0.as_str())]
    NotPermitted(EthicsEvent),
    #[error("force approval is disabled")]
    OverridesDisabled,
}

impl crate::error::ErrorCode for EthicsError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "E_ETHICS_TRANSITION",
            Self::NotPermitted(_) => "E_FORBIDDEN",
            Self::OverridesDisabled => "E_DEV_OVERRIDES_DISABLED",
        }
    }
}

/// Fixed transition table: `(from, event) -> to`.
const TABLE: [(EthicsStatus, EthicsEvent, EthicsStatus); 6] = [
    (EthicsStatus::NotSubmitted, EthicsEvent::Submit, EthicsStatus::Submitted),
    (EthicsStatus::Submitted, EthicsEvent::ReceiveFeedback, EthicsStatus::FeedbackReceived),
    (EthicsStatus::FeedbackReceived, EthicsEvent::Resubmit, EthicsStatus::Submitted),
    (EthicsStatus::NotSubmitted, EthicsEvent::ForceApprove, EthicsStatus::Approved),
    (EthicsStatus::Submitted, EthicsEvent::ForceApprove, EthicsStatus::Approved),
    (EthicsStatus::FeedbackReceived, EthicsEvent::ForceApprove, EthicsStatus::Approved),
];

fn requires_edit(event: EthicsEvent) -> bool {
    matches!(event, EthicsEvent::Submit | EthicsEvent::Resubmit)
}

/// Look up the target status for `event` from `from`, checking permissions.
///
/// # Errors
///
/// Returns an [`EthicsError`] if the pair is not in the table, the caller
/// lacks edit rights, or force approval is requested without dev overrides.
pub fn transition(
    from: EthicsStatus,
    event: EthicsEvent,
    ctx: TransitionContext,
) -> Result<EthicsStatus, EthicsError> {
    if event == EthicsEvent::ForceApprove && !ctx.dev_overrides {
        return Err(EthicsError::OverridesDisabled);
    }
    if requires_edit(event) && !ctx.can_edit {
        return Err(EthicsError::NotPermitted(event));
    }
    TABLE
        .iter()
        .find(|(f, e, _)| *f == from && *e == event)
        .map(|(_, _, to)| *to)
        .ok_or(EthicsError::InvalidTransition { from, event })
}

/// Events that would currently be accepted, in table order.
#[must_use]
pub fn available_events(from: EthicsStatus, ctx: TransitionContext) -> Vec<EthicsEvent> {
    if from.is_terminal() {
        return Vec::new();
    }
    TABLE
        .iter()
        .filter(|(f, e, _)| *f == from && transition(from, *e, ctx).is_ok())
        .map(|(_, e, _)| *e)
        .collect()
}

#[cfg(test)]
#[path = "ethics_test.rs"]
mod tests;
