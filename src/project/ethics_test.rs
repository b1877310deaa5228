use super::*;

const EDITOR: TransitionContext = TransitionContext { can_edit: true, dev_overrides: false };
const VIEWER: TransitionContext = TransitionContext { can_edit: false, dev_overrides: false };
const DEV: TransitionContext = TransitionContext { can_edit: true, dev_overrides: true };

const ALL_STATUSES: [EthicsStatus; 4] = [
    EthicsStatus::NotSubmitted,
    EthicsStatus::Submitted,
    EthicsStatus::FeedbackReceived,
    EthicsStatus::Approved,
];

const ALL_EVENTS: [EthicsEvent; 4] =
    [EthicsEvent::Submit, EthicsEvent::ReceiveFeedback, EthicsEvent::Resubmit, EthicsEvent::ForceApprove];

#[test]
fn happy_path_reaches_submitted_again_after_feedback() {
    let s = transition(EthicsStatus::NotSubmitted, EthicsEvent::Submit, EDITOR).unwrap();
    assert_eq!(s, EthicsStatus::Submitted);
    let s = transition(s, EthicsEvent::ReceiveFeedback, VIEWER).unwrap();
    assert_eq!(s, EthicsStatus::FeedbackReceived);
    let s = transition(s, EthicsEvent::Resubmit, EDITOR).unwrap();
    assert_eq!(s, EthicsStatus::Submitted);
}

#[test]
fn submit_requires_edit_rights() {
    let err = transition(EthicsStatus::NotSubmitted, EthicsEvent::Submit, VIEWER).unwrap_err();
    assert_eq!(err, EthicsError::NotPermitted(EthicsEvent::Submit));
}

#[test]
fn feedback_is_open_to_any_viewer() {
    assert!(transition(EthicsStatus::Submitted, EthicsEvent::ReceiveFeedback, VIEWER).is_ok());
}

#[test]
fn approve_before_submission_is_not_in_table_without_overrides() {
    let err = transition(EthicsStatus::NotSubmitted, EthicsEvent::ForceApprove, EDITOR).unwrap_err();
    assert_eq!(err, EthicsError::OverridesDisabled);
}

#[test]
fn force_approve_with_overrides_from_every_open_state() {
    for from in [EthicsStatus::NotSubmitted, EthicsStatus::Submitted, EthicsStatus::FeedbackReceived] {
        assert_eq!(transition(from, EthicsEvent::ForceApprove, DEV).unwrap(), EthicsStatus::Approved);
    }
}

#[test]
fn approved_is_terminal() {
    for event in ALL_EVENTS {
        assert!(transition(EthicsStatus::Approved, event, DEV).is_err(), "{event:?} left Approved");
    }
    assert!(EthicsStatus::Approved.is_terminal());
}

#[test]
fn feedback_cannot_skip_submission() {
    let err = transition(EthicsStatus::NotSubmitted, EthicsEvent::ReceiveFeedback, DEV).unwrap_err();
    assert!(matches!(err, EthicsError::InvalidTransition { from: EthicsStatus::NotSubmitted, .. }));
    assert!(err.to_string().contains("Not Submitted"));
}

#[test]
fn every_accepted_transition_lands_on_a_known_status() {
    for from in ALL_STATUSES {
        for event in ALL_EVENTS {
            if let Ok(to) = transition(from, event, DEV) {
                assert!(ALL_STATUSES.contains(&to));
            }
        }
    }
}

#[test]
fn available_events_respects_role() {
    assert_eq!(available_events(EthicsStatus::NotSubmitted, EDITOR), vec![EthicsEvent::Submit]);
    assert!(available_events(EthicsStatus::NotSubmitted, VIEWER).is_empty());
    assert_eq!(
        available_events(EthicsStatus::FeedbackReceived, DEV),
        vec![EthicsEvent::Resubmit, EthicsEvent::ForceApprove]
    );
    assert!(available_events(EthicsStatus::Approved, DEV).is_empty());
}

#[test]
fn status_serializes_as_display_string() {
    for status in ALL_STATUSES {
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json, status.as_str());
    }
    assert!(serde_json::from_str::<EthicsStatus>("\"Rejected\"").is_err());
}

#[test]
fn event_parse_matches_as_str() {
    for event in ALL_EVENTS {
        assert_eq!(EthicsEvent::from_str(event.as_str()), Some(event));
    }
    assert_eq!(EthicsEvent::from_str("approve"), None);
}
