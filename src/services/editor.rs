//! Editor sessions: one live editing surface per project section.
//!
//! DESIGN
//! ======
//! A session pairs an [`EditorSurface`] with its [`AssistSession`]. Sessions
//! are keyed by `(project, section)` and opened from the section's stored
//! text. Every edit that changes the content is written straight back into
//! the project store; edits made elsewhere (workflow, suggestions) are
//! synced into an open surface with [`sync_section`].
//!
//! The sessions lock is never held across the transform call: the assist
//! session is marked busy, the lock released, and the outcome recorded
//! under a fresh lock. A [`PendingAssist`] guard clears the busy flag if the
//! caller goes away before the outcome lands.
//!
//! Store writes for surface edits happen under the sessions lock, so the
//! stored text always matches the last surface change.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::editor::assist::{AssistAction, AssistError, AssistSession, AssistStyle, TransformRequest};
use crate::editor::{CharacterCount, EditorError, EditorSurface, ToolbarButton, ToolbarCommand};
use crate::error::ErrorCode;
use crate::project::store::StoreError;
use crate::project::{ProposalPatch, SectionId};
use crate::services::transform::TransformError;
use crate::services::workflow::Role;
use crate::state::AppState;

pub struct EditorSession {
    pub surface: EditorSurface,
    pub assist: AssistSession,
}

pub type EditorSessions = Arc<RwLock<HashMap<(Uuid, SectionId), EditorSession>>>;

#[derive(Debug, thiserror::Error)]
pub enum EditorServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no editor is open for section {0}")]
    NoSession(SectionId),
    #[error("only researchers may edit the proposal")]
    Forbidden,
    #[error("complete the idea stage before writing the proposal")]
    IdeaIncomplete,
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Assist(#[from] AssistError),
}

impl ErrorCode for EditorServiceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.error_code(),
            Self::NoSession(_) => "E_NO_EDITOR",
            Self::Forbidden => "E_FORBIDDEN",
            Self::IdeaIncomplete => "E_IDEA_INCOMPLETE",
            Self::Editor(e) => e.error_code(),
            Self::Assist(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Assist(e) if e.retryable())
    }
}

/// Selection as the client sends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl From<Range<usize>> for Selection {
    fn from(range: Range<usize>) -> Self {
        Self { start: range.start, end: range.end }
    }
}

/// What the client needs to draw one editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorView {
    pub project_id: Uuid,
    pub section: SectionId,
    pub placeholder: &'static str,
    pub content: String,
    pub selection: Selection,
    pub character_count: CharacterCount,
    pub toolbar: Vec<ToolbarButton>,
    pub bubble_menu_visible: bool,
    pub assist: AssistSession,
}

impl EditorView {
    fn of(project_id: Uuid, section: SectionId, session: &EditorSession) -> Self {
        let surface = &session.surface;
        Self {
            project_id,
            section,
            placeholder: section.info().placeholder,
            content: surface.content().to_owned(),
            selection: surface.selection().into(),
            character_count: surface.character_count(),
            toolbar: surface.toolbar(),
            bubble_menu_visible: surface.bubble_menu_visible(),
            assist: session.assist.clone(),
        }
    }
}

/// Result of accepting an AI response.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptOutcome {
    pub view: EditorView,
    /// Exactly the text that replaced the content.
    pub accepted: String,
}

fn require_edit(role: Role) -> Result<(), EditorServiceError> {
    if role.can_edit() { Ok(()) } else { Err(EditorServiceError::Forbidden) }
}

/// Run `f` against an open session and return its result plus a fresh view.
async fn with_session<T>(
    state: &AppState,
    project_id: Uuid,
    section: SectionId,
    f: impl FnOnce(&mut EditorSession) -> Result<T, EditorServiceError>,
) -> Result<(T, EditorView), EditorServiceError> {
    edit_session(state, project_id, section, |session| Ok((f(session)?, None))).await
}

/// As [`with_session`], but `f` also reports new content, which is stored
/// before the sessions lock is released.
async fn edit_session<T>(
    state: &AppState,
    project_id: Uuid,
    section: SectionId,
    f: impl FnOnce(&mut EditorSession) -> Result<(T, Option<String>), EditorServiceError>,
) -> Result<(T, EditorView), EditorServiceError> {
    let mut editors = state.editors.write().await;
    let session = editors
        .get_mut(&(project_id, section))
        .ok_or(EditorServiceError::NoSession(section))?;
    let (out, change) = f(session)?;
    if let Some(content) = change {
        state
            .store
            .update_proposal(project_id, ProposalPatch::section(section, content))
            .await?;
    }
    Ok((out, EditorView::of(project_id, section, session)))
}

/// Clears the assist busy flag unless [`PendingAssist::finish`] ran.
struct PendingAssist {
    editors: EditorSessions,
    key: (Uuid, SectionId),
    armed: bool,
}

impl PendingAssist {
    fn new(state: &AppState, project_id: Uuid, section: SectionId) -> Self {
        Self { editors: state.editors.clone(), key: (project_id, section), armed: true }
    }

    fn finish(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingAssist {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let key = self.key;
        if let Ok(mut editors) = self.editors.try_write() {
            if let Some(session) = editors.get_mut(&key) {
                session.assist.cancel();
            }
            return;
        }
        // Lock is busy: clear it from a task instead of blocking in drop.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let editors = self.editors.clone();
            handle.spawn(async move {
                if let Some(session) = editors.write().await.get_mut(&key) {
                    session.assist.cancel();
                }
            });
        }
    }
}

// =============================================================================
// SESSIONS
// =============================================================================

/// Open (or refresh) the editor for a section from its stored text.
///
/// # Errors
///
/// Returns [`EditorServiceError::Store`] for an unknown project and
/// [`EditorServiceError::IdeaIncomplete`] before the idea stage is done.
pub async fn open_session(
    state: &AppState,
    project_id: Uuid,
    section: SectionId,
) -> Result<EditorView, EditorServiceError> {
    let project = state.store.get(project_id).await?;
    if !project.has_populated_idea() {
        return Err(EditorServiceError::IdeaIncomplete);
    }
    let stored = project.proposal.section_text(section);
    let mut editors = state.editors.write().await;
    let session = editors.entry((project_id, section)).or_insert_with(|| EditorSession {
        surface: EditorSurface::new(stored, state.config.character_limit),
        assist: AssistSession::new(),
    });
    session.surface.load(stored);
    Ok(EditorView::of(project_id, section, session))
}

/// View of an already open editor.
///
/// # Errors
///
/// Returns [`EditorServiceError::NoSession`] when none is open.
pub async fn view(state: &AppState, project_id: Uuid, section: SectionId) -> Result<EditorView, EditorServiceError> {
    let editors = state.editors.read().await;
    editors
        .get(&(project_id, section))
        .map(|session| EditorView::of(project_id, section, session))
        .ok_or(EditorServiceError::NoSession(section))
}

/// Mirror text written elsewhere into an open surface. No-op when closed.
pub async fn sync_section(state: &AppState, project_id: Uuid, section: SectionId, text: &str) {
    let mut editors = state.editors.write().await;
    if let Some(session) = editors.get_mut(&(project_id, section)) {
        session.surface.load(text);
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Optionally move the selection, then run a toolbar command.
///
/// # Errors
///
/// Forbidden for read-only callers, `NoSession` when no editor is open, or
/// the editor's own error. Content and store are unchanged on error.
pub async fn apply_command(
    state: &AppState,
    project_id: Uuid,
    section: SectionId,
    role: Role,
    command: &ToolbarCommand,
    selection: Option<Selection>,
) -> Result<EditorView, EditorServiceError> {
    require_edit(role)?;
    let (changed, view) = edit_session(state, project_id, section, |session| {
        if let Some(sel) = selection {
            session.surface.select(sel.start..sel.end)?;
        }
        let change = session.surface.apply(command)?;
        Ok((change.is_some(), change))
    })
    .await?;
    if changed {
        info!(%project_id, section = section.as_str(), command = command.name(), "editor: content changed");
    }
    Ok(view)
}

/// Replace the whole content, as typing or pasting would.
///
/// # Errors
///
/// As [`apply_command`].
pub async fn replace_content(
    state: &AppState,
    project_id: Uuid,
    section: SectionId,
    role: Role,
    content: &str,
) -> Result<EditorView, EditorServiceError> {
    require_edit(role)?;
    let ((), view) = edit_session(state, project_id, section, |session| {
        Ok(((), session.surface.replace_content(content)?))
    })
    .await?;
    Ok(view)
}

// =============================================================================
// AI ASSIST
// =============================================================================

/// Set the action and style used by the next send.
///
/// # Errors
///
/// Returns [`EditorServiceError::NoSession`] when no editor is open.
pub async fn set_assist_options(
    state: &AppState,
    project_id: Uuid,
    section: SectionId,
    action: AssistAction,
    style: AssistStyle,
) -> Result<EditorView, EditorServiceError> {
    let ((), view) = with_session(state, project_id, section, |session| {
        session.assist.set_options(action, style);
        Ok(())
    })
    .await?;
    Ok(view)
}

async fn run_transform(
    state: &AppState,
    project_id: Uuid,
    section: SectionId,
    request: TransformRequest,
    pending: PendingAssist,
) -> Result<EditorView, EditorServiceError> {
    let outcome = match state.transform.clone() {
        Some(transform) => transform.transform(&request).await,
        None => Err(TransformError::NotConfigured),
    };
    let ((), view) = with_session(state, project_id, section, |session| {
        session.assist.complete(outcome);
        Ok(())
    })
    .await?;
    pending.finish();
    Ok(view)
}

/// Send the surface text to the transform backend and record the result.
///
/// # Errors
///
/// Forbidden, `NoSession`, or an assist error (busy, empty text). A failed
/// transform is not an error here: it lands in the view's `assist.error`.
pub async fn assist_send(
    state: &AppState,
    project_id: Uuid,
    section: SectionId,
    role: Role,
) -> Result<EditorView, EditorServiceError> {
    require_edit(role)?;
    let (request, _) = with_session(state, project_id, section, |session| {
        Ok(session.assist.begin(&session.surface)?)
    })
    .await?;
    let pending = PendingAssist::new(state, project_id, section);
    info!(%project_id, section = section.as_str(), action = request.action.as_str(), "editor: assist sent");
    run_transform(state, project_id, section, request, pending).await
}

/// Discard the pending response and send again with the same options.
///
/// # Errors
///
/// As [`assist_send`], plus `NoPendingResponse` when the modal is closed.
pub async fn assist_resend(
    state: &AppState,
    project_id: Uuid,
    section: SectionId,
    role: Role,
) -> Result<EditorView, EditorServiceError> {
    require_edit(role)?;
    let (request, _) = with_session(state, project_id, section, |session| {
        Ok(session.assist.resend(&session.surface)?)
    })
    .await?;
    let pending = PendingAssist::new(state, project_id, section);
    run_transform(state, project_id, section, request, pending).await
}

/// Replace the content with the pending response and store it.
///
/// # Errors
///
/// Forbidden, `NoSession`, `NoPendingResponse`, or an editor error.
pub async fn assist_accept(
    state: &AppState,
    project_id: Uuid,
    section: SectionId,
    role: Role,
) -> Result<AcceptOutcome, EditorServiceError> {
    require_edit(role)?;
    let (accepted, view) = edit_session(state, project_id, section, |session| {
        let accepted = session.assist.accept(&mut session.surface)?;
        let content = session.surface.content().to_owned();
        Ok((accepted, Some(content)))
    })
    .await?;
    info!(%project_id, section = section.as_str(), "editor: assist response accepted");
    Ok(AcceptOutcome { view, accepted })
}

/// Discard the pending response; content is untouched.
///
/// # Errors
///
/// `NoSession` or `NoPendingResponse`.
pub async fn assist_keep(
    state: &AppState,
    project_id: Uuid,
    section: SectionId,
) -> Result<EditorView, EditorServiceError> {
    let ((), view) = with_session(state, project_id, section, |session| Ok(session.assist.keep_existing()?)).await?;
    Ok(view)
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod tests;
