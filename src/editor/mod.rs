//! Editing surface: markup content, selection, history and toolbar.
//!
//! DESIGN
//! ======
//! The surface owns serialized markup and a byte-range selection over it.
//! Toolbar commands edit the markup directly. Every edit that changes the
//! content returns `Some(new_content)`: that value is the change
//! notification the owner forwards to whoever holds the canonical text
//! (see `services::editor`).
//!
//! Content loaded from outside with [`EditorSurface::load`] is a sync, not
//! an edit: it clears history and produces no notification.

pub mod assist;
pub mod commands;
pub mod markup;

use std::ops::Range;

use serde::Serialize;

pub use commands::ToolbarCommand;

const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("selection {start}..{end} is outside the content or splits a character")]
    InvalidSelection { start: usize, end: usize },
    #[error("heading level must be 1-3, got {0}")]
    InvalidHeading(u8),
    #[error("refusing unsafe URL: {0}")]
    UnsafeUrl(String),
    #[error("character limit of {limit} exceeded")]
    LimitExceeded { limit: usize },
}

impl crate::error::ErrorCode for EditorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSelection { .. } => "E_INVALID_SELECTION",
            Self::InvalidHeading(_) => "E_INVALID_HEADING",
            Self::UnsafeUrl(_) => "E_UNSAFE_URL",
            Self::LimitExceeded { .. } => "E_CHARACTER_LIMIT",
        }
    }
}

/// Character counter readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharacterCount {
    pub characters: usize,
    pub words: usize,
    pub limit: Option<usize>,
}

/// One toolbar button as the client should draw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolbarButton {
    pub command: ToolbarCommand,
    pub active: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
struct Snapshot {
    content: String,
    selection: Range<usize>,
}

#[derive(Debug, Clone)]
pub struct EditorSurface {
    content: String,
    selection: Range<usize>,
    limit: Option<usize>,
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
}

impl EditorSurface {
    /// A surface reflecting `value`, cursor at the end.
    #[must_use]
    pub fn new(value: &str, limit: Option<usize>) -> Self {
        let end = value.len();
        Self { content: value.to_owned(), selection: end..end, limit, undo: Vec::new(), redo: Vec::new() }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    #[must_use]
    pub fn selected_markup(&self) -> &str {
        &self.content[self.selection.clone()]
    }

    /// # Errors
    ///
    /// Returns [`EditorError::InvalidSelection`] if the range is reversed, out
    /// of bounds, or not on char boundaries.
    pub fn select(&mut self, range: Range<usize>) -> Result<(), EditorError> {
        let valid = range.start <= range.end
            && range.end <= self.content.len()
            && self.content.is_char_boundary(range.start)
            && self.content.is_char_boundary(range.end);
        if !valid {
            return Err(EditorError::InvalidSelection { start: range.start, end: range.end });
        }
        self.selection = range;
        Ok(())
    }

    /// Replace the content from outside without recording history.
    pub fn load(&mut self, value: &str) {
        if self.content == value {
            return;
        }
        self.content = value.to_owned();
        let end = self.content.len();
        self.selection = end..end;
        self.undo.clear();
        self.redo.clear();
    }

    #[must_use]
    pub fn plain_text(&self) -> String {
        markup::plain_text(&self.content)
    }

    #[must_use]
    pub fn character_count(&self) -> CharacterCount {
        let text = self.plain_text();
        CharacterCount { characters: text.chars().count(), words: markup::word_count(&text), limit: self.limit }
    }

    /// The contextual menu shows whenever some text is selected.
    #[must_use]
    pub fn bubble_menu_visible(&self) -> bool {
        !self.selection.is_empty()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn toolbar(&self) -> Vec<ToolbarButton> {
        ToolbarCommand::toolbar()
            .into_iter()
            .map(|command| {
                let active = match &command {
                    ToolbarCommand::SetLink { .. } => self.link_bounds().is_some(),
                    other => other
                        .wrapping_tags()
                        .is_some_and(|(open, close)| self.is_wrapped(&open, &close)),
                };
                let enabled = match &command {
                    ToolbarCommand::Undo => self.can_undo(),
                    ToolbarCommand::Redo => self.can_redo(),
                    ToolbarCommand::UnsetLink => {
                        self.link_bounds().is_some() || self.selected_markup().contains("<a ")
                    }
                    _ => true,
                };
                ToolbarButton { command, active, enabled }
            })
            .collect()
    }

    /// Replace the whole content as a user edit (typing, paste, accepted AI text).
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::LimitExceeded`] if the edit would push the
    /// plain-text length past the configured limit.
    pub fn replace_content(&mut self, value: &str) -> Result<Option<String>, EditorError> {
        if self.content == value {
            return Ok(None);
        }
        let end = value.len();
        self.commit(value.to_owned(), end..end)
    }

    /// Run a toolbar command against the current selection.
    ///
    /// # Errors
    ///
    /// Returns an [`EditorError`] for an invalid heading level, an unsafe URL,
    /// or an edit that exceeds the character limit. The content is unchanged
    /// on error.
    pub fn apply(&mut self, command: &ToolbarCommand) -> Result<Option<String>, EditorError> {
        match command {
            ToolbarCommand::Undo => Ok(self.undo()),
            ToolbarCommand::Redo => Ok(self.redo()),
            ToolbarCommand::Heading { level } if !(1..=3).contains(level) => {
                Err(EditorError::InvalidHeading(*level))
            }
            ToolbarCommand::SetLink { url: None } | ToolbarCommand::Image { url: None } => Ok(None),
            ToolbarCommand::SetLink { url: Some(url) } if url.trim().is_empty() => self.unset_link(),
            ToolbarCommand::SetLink { url: Some(url) } => self.set_link(url),
            ToolbarCommand::UnsetLink => self.unset_link(),
            ToolbarCommand::Image { url: Some(url) } => {
                if url.trim().is_empty() {
                    return Ok(None);
                }
                if !commands::is_safe_url(url) {
                    return Err(EditorError::UnsafeUrl(url.clone()));
                }
                self.insert_at_cursor(&commands::image_tag(url))
            }
            ToolbarCommand::HorizontalRule => self.insert_at_cursor("<hr>"),
            other => {
                let Some((open, close)) = other.wrapping_tags() else {
                    return Ok(None);
                };
                self.toggle_wrap(other, &open, &close)
            }
        }
    }

    // -------------------------------------------------------------------------
    // edits
    // -------------------------------------------------------------------------

    fn is_wrapped(&self, open: &str, close: &str) -> bool {
        let Range { start, end } = self.selection;
        self.content[..start].ends_with(open) && self.content[end..].starts_with(close)
    }

    fn toggle_wrap(
        &mut self,
        command: &ToolbarCommand,
        open: &str,
        close: &str,
    ) -> Result<Option<String>, EditorError> {
        let Range { start, end } = self.selection.clone();
        if self.is_wrapped(open, close) {
            let inner = commands::unwrap_inner(command, &self.content[start..end]);
            let outer_start = start - open.len();
            let next = format!("{}{inner}{}", &self.content[..outer_start], &self.content[end + close.len()..]);
            let selection = outer_start..outer_start + inner.len();
            return self.commit(next, selection);
        }
        if start == end {
            return Ok(None);
        }
        let inner = commands::wrap_inner(command, &self.content[start..end]);
        let next = format!("{}{open}{inner}{close}{}", &self.content[..start], &self.content[end..]);
        let inner_start = start + open.len();
        self.commit(next, inner_start..inner_start + inner.len())
    }

    /// Byte range of the `<a ...>` tag ending at the selection start and the
    /// `</a>` starting at its end, if the selection is exactly one link's text.
    fn link_bounds(&self) -> Option<(usize, usize)> {
        let Range { start, end } = self.selection;
        let before = &self.content[..start];
        if !before.ends_with('>') || !self.content[end..].starts_with("</a>") {
            return None;
        }
        let tag_start = before.rfind('<')?;
        before[tag_start..].starts_with("<a ").then_some((tag_start, end + "</a>".len()))
    }

    fn set_link(&mut self, url: &str) -> Result<Option<String>, EditorError> {
        if !commands::is_safe_url(url) {
            return Err(EditorError::UnsafeUrl(url.to_owned()));
        }
        let Range { start, end } = self.selection.clone();
        if start == end {
            return Ok(None);
        }
        let text = markup::strip_anchors(&self.content[start..end]);
        let (open, close) = commands::link_tags(url);
        let (outer_start, outer_end) = self.link_bounds().unwrap_or((start, end));
        let next = format!("{}{open}{text}{close}{}", &self.content[..outer_start], &self.content[outer_end..]);
        let inner_start = outer_start + open.len();
        self.commit(next, inner_start..inner_start + text.len())
    }

    fn unset_link(&mut self) -> Result<Option<String>, EditorError> {
        let Range { start, end } = self.selection.clone();
        let (outer_start, outer_end) = self.link_bounds().unwrap_or((start, end));
        let stripped = markup::strip_anchors(&self.content[outer_start..outer_end]);
        if stripped.len() == outer_end - outer_start {
            return Ok(None);
        }
        let next = format!("{}{stripped}{}", &self.content[..outer_start], &self.content[outer_end..]);
        self.commit(next, outer_start..outer_start + stripped.len())
    }

    fn insert_at_cursor(&mut self, fragment: &str) -> Result<Option<String>, EditorError> {
        let at = self.selection.end;
        let next = format!("{}{fragment}{}", &self.content[..at], &self.content[at..]);
        let cursor = at + fragment.len();
        self.commit(next, cursor..cursor)
    }

    fn commit(&mut self, next: String, selection: Range<usize>) -> Result<Option<String>, EditorError> {
        if let Some(limit) = self.limit {
            let before = markup::plain_text(&self.content).chars().count();
            let after = markup::plain_text(&next).chars().count();
            if after > limit && after > before {
                return Err(EditorError::LimitExceeded { limit });
            }
        }
        let content = std::mem::replace(&mut self.content, next);
        self.undo.push(Snapshot { content, selection: self.selection.clone() });
        if self.undo.len() > HISTORY_LIMIT {
            self.undo.remove(0);
        }
        self.redo.clear();
        self.selection = selection;
        Ok(Some(self.content.clone()))
    }

    fn undo(&mut self) -> Option<String> {
        let snapshot = self.undo.pop()?;
        let content = std::mem::replace(&mut self.content, snapshot.content);
        self.redo.push(Snapshot { content, selection: self.selection.clone() });
        self.selection = snapshot.selection;
        Some(self.content.clone())
    }

    fn redo(&mut self) -> Option<String> {
        let snapshot = self.redo.pop()?;
        let content = std::mem::replace(&mut self.content, snapshot.content);
        self.undo.push(Snapshot { content, selection: self.selection.clone() });
        self.selection = snapshot.selection;
        Some(self.content.clone())
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
