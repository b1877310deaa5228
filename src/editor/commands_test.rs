use super::*;

#[test]
fn inline_marks_map_to_html_tags() {
    assert_eq!(ToolbarCommand::Bold.wrapping_tags(), Some(("<strong>".into(), "</strong>".into())));
    assert_eq!(ToolbarCommand::Strike.wrapping_tags(), Some(("<s>".into(), "</s>".into())));
    assert_eq!(ToolbarCommand::Heading { level: 2 }.wrapping_tags(), Some(("<h2>".into(), "</h2>".into())));
    assert_eq!(ToolbarCommand::Undo.wrapping_tags(), None);
}

#[test]
fn toolbar_lists_three_heading_levels() {
    let headings = ToolbarCommand::toolbar()
        .into_iter()
        .filter(|c| c.name() == "heading")
        .count();
    assert_eq!(headings, 3);
}

#[test]
fn command_json_is_tagged() {
    let cmd: ToolbarCommand = serde_json::from_str(r#"{"command":"heading","level":3}"#).unwrap();
    assert_eq!(cmd, ToolbarCommand::Heading { level: 3 });

    let cmd: ToolbarCommand = serde_json::from_str(r#"{"command":"set_link"}"#).unwrap();
    assert_eq!(cmd, ToolbarCommand::SetLink { url: None });
}

#[test]
fn list_wrap_makes_one_item_per_line() {
    let inner = wrap_inner(&ToolbarCommand::BulletList, "first\n\n second \nthird");
    assert_eq!(inner, "<li>first</li><li>second</li><li>third</li>");
    assert_eq!(unwrap_inner(&ToolbarCommand::BulletList, &inner), "first\nsecond\nthird");
}

#[test]
fn code_block_escapes_inner_text() {
    let inner = wrap_inner(&ToolbarCommand::CodeBlock, "<strong>x</strong> < 3");
    assert_eq!(inner, "x &lt; 3");
}

#[test]
fn unsafe_schemes_are_refused() {
    assert!(!is_safe_url("javascript:alert(1)"));
    assert!(!is_safe_url("  DATA:text/html,x"));
    assert!(is_safe_url("https://doi.org/10.1000/182"));
}

#[test]
fn link_and_image_tags_escape_quotes() {
    let (open, close) = link_tags("https://x.org/?q=\"a\"");
    assert_eq!(open, "<a href=\"https://x.org/?q=&quot;a&quot;\">");
    assert_eq!(close, "</a>");
    assert_eq!(image_tag(" https://x.org/a.png "), "<img src=\"https://x.org/a.png\">");
}
