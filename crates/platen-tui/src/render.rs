//! Pure view functions.
//!
//! Everything here reads `ChatState` and draws to a ratatui frame; no
//! mutation, no effects. Message markup is projected to styled terminal
//! spans: the same span tree that produces the HTML fragment drives the
//! bold/italic/code/link styling here, so the reveal animation and the
//! final rendering always agree on what is visible.

use platen_core::message::Message;
use platen_core::tree::{LeafKind, PathElement, SpanTree};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::state::{ChatState, ScrollMode};
use crate::wrap::wrap_spans;

/// Rows taken by the input pane (one text row plus borders).
pub(crate) const INPUT_PANE_HEIGHT: u16 = 3;

/// Inline styling derived from a leaf's element path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpanStyle {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub link: bool,
}

/// A run of characters sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    pub text: String,
    pub style: SpanStyle,
}

/// One display line of styled spans.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledLine {
    pub spans: Vec<StyledSpan>,
}

fn span_style(path: &[PathElement]) -> SpanStyle {
    let mut style = SpanStyle::default();
    for element in path {
        match element.desc.tag.as_str() {
            "strong" => style.bold = true,
            "em" => style.italic = true,
            "code" => style.code = true,
            "a" => style.link = true,
            _ => {}
        }
    }
    style
}

fn paragraph_instance(path: &[PathElement]) -> Option<u64> {
    path.first()
        .filter(|e| e.desc.tag == "p")
        .map(|e| e.instance)
}

/// Converts the first `visible` leaves of a message tree into logical
/// lines. Hard breaks split lines; a paragraph boundary inserts a blank
/// line between them.
pub fn message_lines(tree: &SpanTree, visible: usize) -> Vec<StyledLine> {
    let visible = visible.min(tree.leaf_count());
    let mut lines = Vec::new();
    let mut current: Vec<StyledSpan> = Vec::new();
    let mut last_paragraph: Option<u64> = None;

    for (i, leaf) in tree.leaves()[..visible].iter().enumerate() {
        let paragraph = paragraph_instance(&leaf.path);
        if i > 0 && paragraph != last_paragraph {
            lines.push(StyledLine {
                spans: std::mem::take(&mut current),
            });
            lines.push(StyledLine::default());
        }
        last_paragraph = paragraph;

        match &leaf.kind {
            LeafKind::Break => lines.push(StyledLine {
                spans: std::mem::take(&mut current),
            }),
            LeafKind::Char(ch) => {
                let style = span_style(&leaf.path);
                match current.last_mut() {
                    Some(span) if span.style == style => span.text.push(*ch),
                    _ => current.push(StyledSpan {
                        text: ch.to_string(),
                        style,
                    }),
                }
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(StyledLine { spans: current });
    }
    lines
}

fn to_ratatui_style(style: SpanStyle) -> Style {
    let mut out = Style::default();
    if style.bold {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.italic {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.code {
        out = out.fg(Color::Yellow);
    }
    if style.link {
        out = out.fg(Color::Blue).add_modifier(Modifier::UNDERLINED);
    }
    out
}

fn to_ratatui_line(line: &StyledLine) -> Line<'static> {
    Line::from(
        line.spans
            .iter()
            .map(|span| Span::styled(span.text.clone(), to_ratatui_style(span.style)))
            .collect::<Vec<_>>(),
    )
}

fn header_line(message: &Message) -> Line<'static> {
    if message.is_user {
        Line::from(Span::styled(
            "You",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            "Assistant",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
    }
}

/// Pre-wrapped transcript lines for the given content width.
fn transcript_lines(state: &ChatState, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in state.transcript.messages() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(header_line(message));

        // Every message renders through its span tree, so user markup is
        // formatted the same way assistant markup is.
        let Some(tree) = state.trees.get(&message.id) else {
            continue;
        };
        let visible = state.visible_leaves(message.id);
        for logical in message_lines(tree, visible) {
            lines.extend(wrap_spans(&logical.spans, width).iter().map(to_ratatui_line));
        }
    }

    if state.pending.is_some() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            "Thinking...",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }
    lines
}

/// Renders the whole widget. Returns the total transcript line count so
/// the caller can refresh the scroll cache.
pub fn render(state: &ChatState, frame: &mut Frame) -> usize {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(INPUT_PANE_HEIGHT)])
        .split(area);

    let total = draw_transcript(state, frame, chunks[0]);
    draw_input(state, frame, chunks[1]);
    total
}

fn draw_transcript(state: &ChatState, frame: &mut Frame, area: Rect) -> usize {
    let width = usize::from(area.width.saturating_sub(2));
    let height = usize::from(area.height.saturating_sub(2));
    let lines = transcript_lines(state, width);
    let total = lines.len();

    let max_offset = total.saturating_sub(height);
    let offset = match state.scroll.mode {
        ScrollMode::FollowLatest => max_offset,
        ScrollMode::Anchored { offset } => offset.min(max_offset),
    };

    let visible: Vec<Line<'static>> = lines
        .into_iter()
        .skip(offset)
        .take(height)
        .collect();

    let paragraph = Paragraph::new(visible)
        .block(Block::default().borders(Borders::ALL).title(" platen "));
    frame.render_widget(paragraph, area);
    total
}

fn draw_input(state: &ChatState, frame: &mut Frame, area: Rect) {
    let width = usize::from(area.width.saturating_sub(2));
    let before_cursor: String = state.input.text().chars().take(state.input.cursor()).collect();
    let cursor_width = before_cursor.width();

    // Horizontal scroll keeps the cursor in view for long input.
    let scroll_x = cursor_width.saturating_sub(width.saturating_sub(1));

    let hint = if state.pending.is_some() {
        " Esc cancel "
    } else {
        " Enter send "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Message ")
        .title_bottom(
            Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
                .right_aligned(),
        );
    let paragraph = Paragraph::new(state.input.text().to_string())
        .block(block)
        .scroll((0, u16::try_from(scroll_x).unwrap_or(u16::MAX)));
    frame.render_widget(paragraph, area);

    let cursor_x = area.x + 1 + u16::try_from(cursor_width - scroll_x).unwrap_or(0);
    frame.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(2)), area.y + 1));
}
