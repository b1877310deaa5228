//! Markup helpers: escaping, tag stripping, plain-text extraction.

/// Tags whose close (or self-closing form) ends a line of plain text.
const BLOCK_TAGS: [&str; 11] = ["p", "h1", "h2", "h3", "li", "blockquote", "pre", "ul", "ol", "br", "hr"];

#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[must_use]
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Tag name of a raw tag body such as `/h1`, `a href="x"` or `br/`.
fn tag_name(body: &str) -> &str {
    let body = body.trim_start_matches('/');
    let end = body
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(body.len());
    &body[..end]
}

/// Plain text of `markup`: tags removed, entities decoded, one line per block.
#[must_use]
pub fn plain_text(markup: &str) -> String {
    let mut raw = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(open) = rest.find('<') {
        raw.push_str(&rest[..open]);
        let Some(close) = rest[open..].find('>') else {
            // Unterminated tag: keep the remainder as text.
            raw.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let body = &rest[open + 1..open + close];
        let closing = body.starts_with('/');
        let name = tag_name(body).to_ascii_lowercase();
        if BLOCK_TAGS.contains(&name.as_str()) && (closing || matches!(name.as_str(), "br" | "hr")) {
            raw.push('\n');
        }
        rest = &rest[open + close + 1..];
    }
    raw.push_str(rest);

    unescape(&raw)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove every `<a ...>` and `</a>` tag from `markup`, keeping link text.
#[must_use]
pub fn strip_anchors(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let Some(close) = rest[open..].find('>') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let tag = &rest[open..=open + close];
        if !tag_name(&tag[1..tag.len() - 1]).eq_ignore_ascii_case("a") {
            out.push_str(tag);
        }
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
#[path = "markup_test.rs"]
mod tests;
