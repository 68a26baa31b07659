//! The markdown-subset formatter.
//!
//! Maps raw message text to a markup fragment by applying five rules in a
//! fixed order: links, bold, italics, inline code, then newline structure.
//! The order is significant: bold runs before italics so that bold nested
//! inside italics survives, and an unmatched delimiter is never consumed
//! (it stays literal text).
//!
//! Output is canonicalized through the span tree, so the returned fragment
//! is well-formed for every input and byte-identical to the final
//! typewriter tick.

use std::sync::LazyLock;

use regex::Regex;

use crate::tree::{SpanTree, escape_text};

/// `[label](url)` — applied first so later rules see the anchor as opaque.
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link regex"));

/// `**text**` — must run before the single-asterisk rule.
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold regex"));

/// `*text*` — only pairs the single asterisks the bold rule left behind.
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.+?)\*").expect("italic regex"));

/// `` `text` `` inline code.
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`(.+?)`").expect("code regex"));

/// Formats raw message text into a well-formed markup fragment.
///
/// Empty input yields empty output. Calling twice on the same text yields
/// identical output; the formatter holds no state.
pub fn format_message(text: &str) -> String {
    span_tree(text).to_markup()
}

/// Builds the span tree for a message: the formatter's rule chain followed
/// by leaf extraction. Computed once per message; the typewriter replays
/// the resulting leaves.
pub fn span_tree(text: &str) -> SpanTree {
    SpanTree::from_markup(&apply_rules(text))
}

/// The raw rule chain, before canonicalization.
///
/// Mirrors the widget's transform exactly: inline rules first, then
/// `\n\n` becomes a paragraph boundary and `\n` a line break, and the
/// fragment is wrapped in a paragraph block only when a boundary was
/// actually produced.
fn apply_rules(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let escaped = escape_text(text);
    let linked = LINK_RE.replace_all(
        &escaped,
        r#"<a href="${2}" target="_blank" rel="noopener noreferrer">${1}</a>"#,
    );
    let bolded = BOLD_RE.replace_all(&linked, "<strong>${1}</strong>");
    let italicized = ITALIC_RE.replace_all(&bolded, "<em>${1}</em>");
    let coded = CODE_RE.replace_all(&italicized, "<code>${1}</code>");

    let broken = coded.replace("\n\n", "</p><p>").replace('\n', "<br>");
    if broken.contains("</p><p>") {
        format!("<p>{broken}</p>")
    } else {
        broken
    }
}
