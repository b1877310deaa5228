use super::*;

fn surface_with(content: &str, selection: Range<usize>) -> EditorSurface {
    let mut surface = EditorSurface::new(content, None);
    surface.select(selection).unwrap();
    surface
}

// =========================================================================
// marks and blocks
// =========================================================================

#[test]
fn bold_wraps_selection_and_reports_change() {
    let mut surface = surface_with("<p>hello world</p>", 3..8);
    let changed = surface.apply(&ToolbarCommand::Bold).unwrap();
    assert_eq!(changed.as_deref(), Some("<p><strong>hello</strong> world</p>"));
    assert_eq!(surface.selected_markup(), "hello");
}

#[test]
fn bold_twice_toggles_back() {
    let mut surface = surface_with("<p>hello world</p>", 3..8);
    surface.apply(&ToolbarCommand::Bold).unwrap();
    let changed = surface.apply(&ToolbarCommand::Bold).unwrap();
    assert_eq!(changed.as_deref(), Some("<p>hello world</p>"));
    assert_eq!(surface.selection(), 3..8);
}

#[test]
fn mark_on_empty_selection_is_noop() {
    let mut surface = EditorSurface::new("abc", None);
    assert_eq!(surface.apply(&ToolbarCommand::Italic).unwrap(), None);
    assert!(!surface.can_undo());
}

#[test]
fn heading_level_out_of_range_is_rejected() {
    let mut surface = surface_with("title", 0..5);
    let err = surface.apply(&ToolbarCommand::Heading { level: 4 }).unwrap_err();
    assert_eq!(err, EditorError::InvalidHeading(4));
    assert_eq!(surface.content(), "title");
}

#[test]
fn heading_wraps_block() {
    let mut surface = surface_with("title", 0..5);
    surface.apply(&ToolbarCommand::Heading { level: 2 }).unwrap();
    assert_eq!(surface.content(), "<h2>title</h2>");
}

#[test]
fn bullet_list_toggles_lines() {
    let mut surface = surface_with("a\nb", 0..3);
    surface.apply(&ToolbarCommand::BulletList).unwrap();
    assert_eq!(surface.content(), "<ul><li>a</li><li>b</li></ul>");
    surface.apply(&ToolbarCommand::BulletList).unwrap();
    assert_eq!(surface.content(), "a\nb");
}

#[test]
fn code_block_escapes_selection() {
    let mut surface = surface_with("x < y", 0..5);
    surface.apply(&ToolbarCommand::CodeBlock).unwrap();
    assert_eq!(surface.content(), "<pre><code>x &lt; y</code></pre>");
}

// =========================================================================
// links, images, rules
// =========================================================================

#[test]
fn set_link_wraps_and_replaces_existing_link() {
    let mut surface = surface_with("see docs", 4..8);
    surface.apply(&ToolbarCommand::SetLink { url: Some("https://a.org".into()) }).unwrap();
    assert_eq!(surface.content(), "see <a href=\"https://a.org\">docs</a>");

    surface.apply(&ToolbarCommand::SetLink { url: Some("https://b.org".into()) }).unwrap();
    assert_eq!(surface.content(), "see <a href=\"https://b.org\">docs</a>");
}

#[test]
fn empty_link_url_unsets_link() {
    let mut surface = surface_with("see docs", 4..8);
    surface.apply(&ToolbarCommand::SetLink { url: Some("https://a.org".into()) }).unwrap();
    surface.apply(&ToolbarCommand::SetLink { url: Some(String::new()) }).unwrap();
    assert_eq!(surface.content(), "see docs");
}

#[test]
fn cancelled_prompts_change_nothing() {
    let mut surface = surface_with("see docs", 4..8);
    assert_eq!(surface.apply(&ToolbarCommand::SetLink { url: None }).unwrap(), None);
    assert_eq!(surface.apply(&ToolbarCommand::Image { url: None }).unwrap(), None);
    assert_eq!(surface.apply(&ToolbarCommand::Image { url: Some("  ".into()) }).unwrap(), None);
    assert_eq!(surface.content(), "see docs");
}

#[test]
fn unsafe_link_is_refused() {
    let mut surface = surface_with("x", 0..1);
    let err = surface
        .apply(&ToolbarCommand::SetLink { url: Some("javascript:alert(1)".into()) })
        .unwrap_err();
    assert!(matches!(err, EditorError::UnsafeUrl(_)));
}

#[test]
fn image_and_rule_insert_at_cursor() {
    let mut surface = EditorSurface::new("<p>a</p>", None);
    surface.apply(&ToolbarCommand::Image { url: Some("https://x.org/f.png".into()) }).unwrap();
    surface.apply(&ToolbarCommand::HorizontalRule).unwrap();
    assert_eq!(surface.content(), "<p>a</p><img src=\"https://x.org/f.png\"><hr>");
}

#[test]
fn unset_link_inside_wider_selection() {
    let content = "a <a href=\"u\">b</a> c";
    let mut surface = surface_with(content, 0..content.len());
    surface.apply(&ToolbarCommand::UnsetLink).unwrap();
    assert_eq!(surface.content(), "a b c");
}

// =========================================================================
// history, selection, counter, toolbar
// =========================================================================

#[test]
fn undo_and_redo_walk_history() {
    let mut surface = surface_with("abc", 0..3);
    surface.apply(&ToolbarCommand::Underline).unwrap();
    assert_eq!(surface.apply(&ToolbarCommand::Undo).unwrap().as_deref(), Some("abc"));
    assert_eq!(surface.apply(&ToolbarCommand::Redo).unwrap().as_deref(), Some("<u>abc</u>"));
    assert_eq!(surface.apply(&ToolbarCommand::Redo).unwrap(), None);
}

#[test]
fn new_edit_clears_redo() {
    let mut surface = surface_with("abc", 0..3);
    surface.apply(&ToolbarCommand::Bold).unwrap();
    surface.apply(&ToolbarCommand::Undo).unwrap();
    surface.replace_content("xyz").unwrap();
    assert!(!surface.can_redo());
}

#[test]
fn load_syncs_without_history() {
    let mut surface = EditorSurface::new("a", None);
    surface.replace_content("b").unwrap();
    surface.load("c");
    assert_eq!(surface.content(), "c");
    assert!(!surface.can_undo());
}

#[test]
fn selection_must_fall_on_char_boundaries() {
    let mut surface = EditorSurface::new("héllo", None);
    assert!(surface.select(0..2).is_err());
    assert!(surface.select(0..3).is_ok());
    assert!(surface.select(2..1).is_err());
    assert!(surface.select(0..99).is_err());
}

#[test]
fn character_count_ignores_markup() {
    let surface = EditorSurface::new("<p>two <strong>words</strong></p>", Some(100));
    let count = surface.character_count();
    assert_eq!(count.characters, 9);
    assert_eq!(count.words, 2);
    assert_eq!(count.limit, Some(100));
}

#[test]
fn limit_blocks_growth_but_not_shrinking() {
    let mut surface = EditorSurface::new("abcd", Some(3));
    let err = surface.replace_content("abcde").unwrap_err();
    assert_eq!(err, EditorError::LimitExceeded { limit: 3 });
    assert_eq!(surface.content(), "abcd");
    assert!(surface.replace_content("abc").is_ok());
}

#[test]
fn bubble_menu_follows_selection() {
    let mut surface = EditorSurface::new("abc", None);
    assert!(!surface.bubble_menu_visible());
    surface.select(0..1).unwrap();
    assert!(surface.bubble_menu_visible());
}

#[test]
fn toolbar_reports_active_marks_and_history() {
    let mut surface = surface_with("abc", 0..3);
    surface.apply(&ToolbarCommand::Bold).unwrap();
    let toolbar = surface.toolbar();

    let bold = toolbar.iter().find(|b| b.command == ToolbarCommand::Bold).unwrap();
    assert!(bold.active);
    let italic = toolbar.iter().find(|b| b.command == ToolbarCommand::Italic).unwrap();
    assert!(!italic.active);
    let undo = toolbar.iter().find(|b| b.command == ToolbarCommand::Undo).unwrap();
    assert!(undo.enabled);
    let redo = toolbar.iter().find(|b| b.command == ToolbarCommand::Redo).unwrap();
    assert!(!redo.enabled);
}
