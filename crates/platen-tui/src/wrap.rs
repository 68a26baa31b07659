//! Width-aware wrapping of styled spans.
//!
//! Wraps at word boundaries while keeping each fragment's style, so a
//! bold phrase broken across lines stays bold on both. Inline code
//! preserves its whitespace and breaks by character instead of by word.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::render::{SpanStyle, StyledLine, StyledSpan};

struct Wrapper {
    lines: Vec<StyledLine>,
    current: Vec<StyledSpan>,
    current_width: usize,
    width: usize,
    /// A word separator is owed before the next fragment. It is emitted
    /// only if the fragment fits after it; a separator never ends a line.
    pending_space: bool,
}

impl Wrapper {
    fn new(width: usize) -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
            current_width: 0,
            width,
            pending_space: false,
        }
    }

    fn flush(&mut self) {
        self.lines.push(StyledLine {
            spans: std::mem::take(&mut self.current),
        });
        self.current_width = 0;
    }

    fn remaining(&self) -> usize {
        self.width.saturating_sub(self.current_width)
    }

    fn push(&mut self, text: &str, style: SpanStyle) {
        if text.is_empty() {
            return;
        }
        self.current.push(StyledSpan {
            text: text.to_string(),
            style,
        });
        self.current_width += text.width();
    }

    /// Emits the owed separator if `upcoming_width` still fits after it,
    /// breaks the line otherwise.
    fn settle_space(&mut self, upcoming_width: usize) {
        if !std::mem::take(&mut self.pending_space) || self.current.is_empty() {
            return;
        }
        if 1 + upcoming_width <= self.remaining() {
            self.push(" ", SpanStyle::default());
        } else {
            self.flush();
        }
    }

    /// Places a fragment that contains no break opportunities, splitting
    /// it by character when it is wider than a whole line.
    fn place(&mut self, text: &str, style: SpanStyle) {
        let text_width = text.width();
        self.settle_space(text_width);
        if text_width <= self.remaining() {
            self.push(text, style);
            return;
        }
        if text_width <= self.width {
            self.flush();
            self.push(text, style);
            return;
        }

        let mut piece = String::new();
        let mut piece_width = 0;
        for ch in text.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if ch_width > 0 && piece_width + ch_width > self.remaining() && piece_width > 0 {
                let full = std::mem::take(&mut piece);
                self.push(&full, style);
                self.flush();
                piece_width = 0;
            }
            piece.push(ch);
            piece_width += ch_width;
        }
        self.push(&piece, style);
    }
}

/// Wraps one logical line of spans to the given display width.
///
/// Spans never contain newlines; hard breaks are split into separate
/// logical lines before wrapping. Always returns at least one line.
pub fn wrap_spans(spans: &[StyledSpan], width: usize) -> Vec<StyledLine> {
    if width == 0 {
        return vec![StyledLine {
            spans: spans.to_vec(),
        }];
    }

    let mut wrapper = Wrapper::new(width);
    for span in spans {
        if span.style.code {
            // Whitespace in code is content.
            wrapper.place(&span.text, span.style);
            continue;
        }

        if span.text.starts_with(char::is_whitespace) {
            wrapper.pending_space = true;
        }
        for word in span.text.split_whitespace() {
            wrapper.place(word, span.style);
            wrapper.pending_space = true;
        }
        // Adjacent spans join without a separator unless the source had one.
        wrapper.pending_space = span.text.ends_with(char::is_whitespace);
    }

    if !wrapper.current.is_empty() || wrapper.lines.is_empty() {
        wrapper.flush();
    }
    wrapper.lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> StyledSpan {
        StyledSpan {
            text: text.to_string(),
            style: SpanStyle::default(),
        }
    }

    fn line_text(line: &StyledLine) -> String {
        line.spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_short_line_stays_whole() {
        let lines = wrap_spans(&[plain("hello world")], 20);
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "hello world");
    }

    #[test]
    fn test_wraps_at_word_boundary() {
        let lines = wrap_spans(&[plain("hello world")], 8);
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[0]), "hello");
        assert_eq!(line_text(&lines[1]), "world");
    }

    #[test]
    fn test_style_survives_the_break() {
        let bold = StyledSpan {
            text: "wide world".to_string(),
            style: SpanStyle {
                bold: true,
                ..SpanStyle::default()
            },
        };
        let lines = wrap_spans(&[plain("hey "), bold], 8);
        assert_eq!(lines.len(), 2);
        assert!(
            lines[1]
                .spans
                .iter()
                .filter(|s| s.text != " ")
                .all(|s| s.style.bold)
        );
    }

    #[test]
    fn test_space_between_adjacent_spans() {
        // "Hello " and "world" arrive as separate spans; the boundary
        // space must survive.
        let lines = wrap_spans(&[plain("Hello "), plain("world")], 40);
        assert_eq!(line_text(&lines[0]), "Hello world");
    }

    #[test]
    fn test_no_trailing_space_before_a_break() {
        let lines = wrap_spans(&[plain("hello "), plain("world")], 8);
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[0]), "hello");
        assert_eq!(line_text(&lines[1]), "world");
    }

    #[test]
    fn test_code_keeps_inner_whitespace() {
        let code = StyledSpan {
            text: "a  b".to_string(),
            style: SpanStyle {
                code: true,
                ..SpanStyle::default()
            },
        };
        let lines = wrap_spans(&[code], 20);
        assert_eq!(line_text(&lines[0]), "a  b");
    }

    #[test]
    fn test_long_word_breaks_by_character() {
        let lines = wrap_spans(&[plain("abcdefghij")], 4);
        assert!(lines.len() >= 3);
        assert!(lines.iter().all(|l| line_text(l).width() <= 4));
    }

    #[test]
    fn test_empty_input_yields_one_empty_line() {
        let lines = wrap_spans(&[], 10);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].spans.is_empty());
    }
}
