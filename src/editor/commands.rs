//! Toolbar commands and the markup edits they perform.
//!
//! Inline marks and blocks toggle: applying a command to a selection that is
//! already wrapped in the command's tags removes them instead.

use serde::{Deserialize, Serialize};

use super::markup;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ToolbarCommand {
    Bold,
    Italic,
    Strike,
    Underline,
    Heading {
        level: u8,
    },
    BulletList,
    OrderedList,
    Blockquote,
    CodeBlock,
    /// `url: None` means the URL prompt was cancelled. An empty URL unsets the link.
    SetLink {
        #[serde(default)]
        url: Option<String>,
    },
    UnsetLink,
    /// `url: None` means the URL prompt was cancelled.
    Image {
        #[serde(default)]
        url: Option<String>,
    },
    HorizontalRule,
    Undo,
    Redo,
}

impl ToolbarCommand {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Strike => "strike",
            Self::Underline => "underline",
            Self::Heading { .. } => "heading",
            Self::BulletList => "bullet_list",
            Self::OrderedList => "ordered_list",
            Self::Blockquote => "blockquote",
            Self::CodeBlock => "code_block",
            Self::SetLink { .. } => "set_link",
            Self::UnsetLink => "unset_link",
            Self::Image { .. } => "image",
            Self::HorizontalRule => "horizontal_rule",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }

    /// Opening and closing tags for commands that wrap the selection.
    #[must_use]
    pub fn wrapping_tags(&self) -> Option<(String, String)> {
        let pair = |tag: &str| Some((format!("<{tag}>"), format!("</{tag}>")));
        match self {
            Self::Bold => pair("strong"),
            Self::Italic => pair("em"),
            Self::Strike => pair("s"),
            Self::Underline => pair("u"),
            Self::Heading { level } => pair(&format!("h{level}")),
            Self::BulletList => pair("ul"),
            Self::OrderedList => pair("ol"),
            Self::Blockquote => pair("blockquote"),
            Self::CodeBlock => Some(("<pre><code>".into(), "</code></pre>".into())),
            _ => None,
        }
    }

    /// Every button the toolbar shows, in display order.
    #[must_use]
    pub fn toolbar() -> Vec<Self> {
        vec![
            Self::Bold,
            Self::Italic,
            Self::Strike,
            Self::Underline,
            Self::Heading { level: 1 },
            Self::Heading { level: 2 },
            Self::Heading { level: 3 },
            Self::BulletList,
            Self::OrderedList,
            Self::Blockquote,
            Self::CodeBlock,
            Self::SetLink { url: None },
            Self::UnsetLink,
            Self::Image { url: None },
            Self::HorizontalRule,
            Self::Undo,
            Self::Redo,
        ]
    }
}

/// URL schemes refused for links and images.
const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "data:", "vbscript:"];

#[must_use]
pub fn is_safe_url(url: &str) -> bool {
    let lowered = url.trim().to_ascii_lowercase();
    !BLOCKED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme))
}

/// Content placed between the tags when wrapping `selected` for `command`.
pub(crate) fn wrap_inner(command: &ToolbarCommand, selected: &str) -> String {
    match command {
        ToolbarCommand::BulletList | ToolbarCommand::OrderedList => selected
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| format!("<li>{line}</li>"))
            .collect(),
        ToolbarCommand::CodeBlock => markup::escape(&markup::plain_text(selected)),
        _ => selected.to_owned(),
    }
}

/// Content restored when unwrapping `inner` for `command`.
pub(crate) fn unwrap_inner(command: &ToolbarCommand, inner: &str) -> String {
    match command {
        ToolbarCommand::BulletList | ToolbarCommand::OrderedList => inner
            .split("</li>")
            .map(|item| item.trim_start_matches("<li>"))
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => inner.to_owned(),
    }
}

#[must_use]
pub fn link_tags(url: &str) -> (String, String) {
    (format!("<a href=\"{}\">", markup::escape(url.trim())), "</a>".to_owned())
}

#[must_use]
pub fn image_tag(url: &str) -> String {
    format!("<img src=\"{}\">", markup::escape(url.trim()))
}

#[cfg(test)]
#[path = "commands_test.rs"]
mod tests;
