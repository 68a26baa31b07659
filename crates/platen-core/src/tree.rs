//! Span tree: the ordered leaves of a formatted message.
//!
//! A formatted fragment is decomposed into leaves, one displayable
//! character (or hard line break) each, tagged with the ordered stack of
//! enclosing elements from root to leaf. The tree is derived once per
//! message; the typewriter replays its leaves one tick at a time.
//!
//! Invariants:
//! - concatenating leaf characters in order (breaks contributing their
//!   source newline) reproduces the raw message text;
//! - any leaf prefix, closed in LIFO order, is well-formed markup.

use std::fmt::Write as _;

use crate::diff::diff_paths;

/// An element descriptor: tag name plus ordered attributes.
///
/// Attributes keep their parse order so serialization is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDesc {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl ElementDesc {
    /// Creates a descriptor with no attributes.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    /// Creates a descriptor with the given attributes.
    pub fn with_attrs(tag: impl Into<String>, attrs: &[(&str, &str)]) -> Self {
        Self {
            tag: tag.into(),
            attrs: attrs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// Writes the opening tag, e.g. `<a href="...">`.
    pub fn write_open(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"", name);
            escape_attr_into(out, value);
            out.push('"');
        }
        out.push('>');
    }

    /// Writes the closing tag, e.g. `</a>`.
    pub fn write_close(&self, out: &mut String) {
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// One element on a leaf's path.
///
/// `instance` distinguishes sibling elements with identical descriptors:
/// consecutive paragraphs carry the same tag and attributes but must not
/// be merged when consecutive leaf paths are diffed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathElement {
    pub desc: ElementDesc,
    pub instance: u64,
}

/// What a leaf displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// One displayable character.
    Char(char),
    /// A hard line break (`<br>` in the fragment, `\n` in the source).
    Break,
}

/// One leaf: a displayable unit plus its enclosing element path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub kind: LeafKind,
    /// Enclosing elements, root first.
    pub path: Vec<PathElement>,
}

/// The ordered leaves extracted from a formatted fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanTree {
    leaves: Vec<Leaf>,
}

impl SpanTree {
    /// Extracts the leaves of a formatted markup fragment.
    ///
    /// The tokenizer is tolerant: a close tag that does not match the
    /// innermost open element pops back to the matching one (recovering
    /// from cross-nested input), an unmatched close is ignored, and any
    /// `<` or `&` that does not begin a recognized tag or entity is
    /// treated as a literal character.
    pub fn from_markup(fragment: &str) -> Self {
        Extractor::new(fragment).run()
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Serializes every leaf: the canonical, well-formed rendering of the
    /// whole message.
    pub fn to_markup(&self) -> String {
        render_leaves(&self.leaves)
    }

    /// Reconstructs the raw message text: leaf characters in order, hard
    /// breaks as `\n`, paragraph boundaries as `\n\n`.
    pub fn source_text(&self) -> String {
        let mut out = String::new();
        let mut prev_para: Option<u64> = None;
        for leaf in &self.leaves {
            let para = leaf
                .path
                .iter()
                .find(|el| el.desc.tag == "p")
                .map(|el| el.instance);
            if let (Some(prev), Some(cur)) = (prev_para, para) {
                if prev != cur {
                    out.push_str("\n\n");
                }
            }
            prev_para = para.or(prev_para);
            match leaf.kind {
                LeafKind::Char(ch) => out.push(ch),
                LeafKind::Break => out.push('\n'),
            }
        }
        out
    }
}

/// Serializes a run of leaves into a well-formed fragment.
pub(crate) fn render_leaves(leaves: &[Leaf]) -> String {
    let mut out = String::new();
    let mut open: Vec<PathElement> = Vec::new();
    for leaf in leaves {
        append_leaf(&mut out, &mut open, leaf);
    }
    close_open(&mut out, &open);
    out
}

/// Appends one leaf, closing and opening elements as its path requires.
pub(crate) fn append_leaf(out: &mut String, open: &mut Vec<PathElement>, leaf: &Leaf) {
    let diff = diff_paths(open, &leaf.path);
    for el in &diff.close {
        el.write_close(out);
    }
    for el in &diff.open {
        el.write_open(out);
    }
    open.truncate(open.len() - diff.close.len());
    let keep = open.len();
    open.extend_from_slice(&leaf.path[keep..]);
    match leaf.kind {
        LeafKind::Char(ch) => escape_char_into(out, ch),
        LeafKind::Break => out.push_str("<br>"),
    }
}

/// Closes all still-open elements, innermost first.
pub(crate) fn close_open(out: &mut String, open: &[PathElement]) {
    for el in open.iter().rev() {
        el.desc.write_close(out);
    }
}

fn escape_char_into(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        _ => out.push(ch),
    }
}

/// Escapes an attribute value for serialization between double quotes.
pub(crate) fn escape_attr_into(out: &mut String, value: &str) {
    for ch in value.chars() {
        escape_char_into(out, ch);
    }
}

/// Escapes text content; used by the formatter before the rule chain runs.
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        escape_char_into(&mut out, ch);
    }
    out
}

// ============================================================================
// Extraction
// ============================================================================

struct Extractor<'a> {
    input: &'a str,
    pos: usize,
    open: Vec<PathElement>,
    leaves: Vec<Leaf>,
    next_instance: u64,
}

impl<'a> Extractor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            open: Vec::new(),
            leaves: Vec::new(),
            next_instance: 0,
        }
    }

    fn run(mut self) -> SpanTree {
        while let Some(ch) = self.peek() {
            match ch {
                '<' => {
                    if !self.consume_tag() {
                        self.pos += 1;
                        self.push_char('<');
                    }
                }
                '&' => {
                    if let Some(decoded) = self.consume_entity() {
                        self.push_char(decoded);
                    } else {
                        self.pos += 1;
                        self.push_char('&');
                    }
                }
                _ => {
                    self.pos += ch.len_utf8();
                    self.push_char(ch);
                }
            }
        }
        SpanTree {
            leaves: self.leaves,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn push_char(&mut self, ch: char) {
        self.leaves.push(Leaf {
            kind: LeafKind::Char(ch),
            path: self.open.clone(),
        });
    }

    /// Attempts to consume a tag at the current position.
    ///
    /// Returns false (without advancing) when the text does not form a
    /// recognizable tag; the caller then emits a literal `<`.
    fn consume_tag(&mut self) -> bool {
        let rest = &self.input[self.pos..];
        let Some(end) = rest.find('>') else {
            return false;
        };
        let inner = &rest[1..end];
        if inner.is_empty() {
            return false;
        }

        if let Some(name) = inner.strip_prefix('/') {
            if !is_tag_name(name) {
                return false;
            }
            self.pos += end + 1;
            self.close_element(name);
            return true;
        }

        let (name, attr_src) = match inner.find(char::is_whitespace) {
            Some(i) => (&inner[..i], inner[i..].trim()),
            None => (inner, ""),
        };
        if !is_tag_name(name) {
            return false;
        }
        let Some(attrs) = parse_attrs(attr_src) else {
            return false;
        };
        self.pos += end + 1;

        if name == "br" {
            self.leaves.push(Leaf {
                kind: LeafKind::Break,
                path: self.open.clone(),
            });
        } else {
            let instance = self.next_instance;
            self.next_instance += 1;
            self.open.push(PathElement {
                desc: ElementDesc {
                    tag: name.to_string(),
                    attrs,
                },
                instance,
            });
        }
        true
    }

    /// Pops to the matching open element; ignores a close with no match.
    fn close_element(&mut self, name: &str) {
        if let Some(idx) = self.open.iter().rposition(|el| el.desc.tag == name) {
            self.open.truncate(idx);
        }
    }

    fn consume_entity(&mut self) -> Option<char> {
        const ENTITIES: [(&str, char); 4] = [
            ("&amp;", '&'),
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&quot;", '"'),
        ];
        let rest = &self.input[self.pos..];
        for (name, ch) in ENTITIES {
            if rest.starts_with(name) {
                self.pos += name.len();
                return Some(ch);
            }
        }
        None
    }
}

fn is_tag_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase())
}

/// Parses `name="value"` pairs; returns None on malformed attribute text.
fn parse_attrs(mut src: &str) -> Option<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    loop {
        src = src.trim_start();
        if src.is_empty() {
            return Some(attrs);
        }
        let eq = src.find('=')?;
        let name = src[..eq].trim();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_lowercase() || c == '-') {
            return None;
        }
        let rest = src[eq + 1..].strip_prefix('"')?;
        let close = rest.find('"')?;
        attrs.push((name.to_string(), decode_entities(&rest[..close])));
        src = &rest[close + 1..];
    }
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
