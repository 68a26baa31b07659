//! Widget state.
//!
//! All mutable state of the chat widget lives here; the reducer in
//! `update` is the only writer. Each message owns its derived span tree;
//! at most one reveal is active at a time.

use std::collections::HashMap;
use std::time::Instant;

use platen_core::config::Config;
use platen_core::format::span_tree;
use platen_core::message::{MessageId, RevealEvent, Transcript};
use platen_core::reveal::Typewriter;
use platen_core::tree::SpanTree;
use tokio_util::sync::CancellationToken;

/// The reveal currently ticking, if any.
#[derive(Debug)]
pub struct ActiveReveal {
    pub id: MessageId,
    pub typewriter: Typewriter,
    /// Last time a leaf was revealed; None before the first tick.
    pub last_advance: Option<Instant>,
}

/// An in-flight query to the answer endpoint.
#[derive(Debug)]
pub struct PendingQuery {
    /// Cancelling this token stops the spawned request task before it can
    /// deliver a stale answer.
    pub token: CancellationToken,
}

/// Single-line input buffer with a character cursor.
#[derive(Debug, Default)]
pub struct InputState {
    buffer: String,
    /// Cursor position in characters, 0..=char_count.
    cursor: usize,
}

impl InputState {
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_offset(self.cursor);
        self.buffer.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_offset(self.cursor - 1);
            self.buffer.remove(at);
            self.cursor -= 1;
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.buffer.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.buffer.chars().count();
    }

    /// Takes the buffer, resetting the cursor.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_idx)
            .map_or(self.buffer.len(), |(i, _)| i)
    }
}

/// Scroll mode for the transcript pane.
#[derive(Debug, Clone)]
pub enum ScrollMode {
    /// Auto-scroll to show the latest content.
    FollowLatest,
    /// User scrolled manually; offset is a line index from the top.
    Anchored { offset: usize },
}

/// Scroll state for the transcript pane.
#[derive(Debug, Clone)]
pub struct ScrollState {
    pub mode: ScrollMode,
    /// Total line count from the last render, for scroll math.
    pub cached_line_count: usize,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            mode: ScrollMode::FollowLatest,
            cached_line_count: 0,
        }
    }
}

impl ScrollState {
    pub fn is_following(&self) -> bool {
        matches!(self.mode, ScrollMode::FollowLatest)
    }

    /// Current scroll offset for rendering.
    pub fn get_offset(&self, viewport_height: usize) -> usize {
        let max_offset = self.cached_line_count.saturating_sub(viewport_height);
        match &self.mode {
            ScrollMode::FollowLatest => max_offset,
            ScrollMode::Anchored { offset } => (*offset).min(max_offset),
        }
    }

    pub fn scroll_up(&mut self, lines: usize, viewport_height: usize) {
        let offset = self.get_offset(viewport_height).saturating_sub(lines);
        self.mode = ScrollMode::Anchored { offset };
    }

    /// Scrolls down, returning to follow mode at the bottom.
    pub fn scroll_down(&mut self, lines: usize, viewport_height: usize) {
        if self.is_following() {
            return;
        }
        let max_offset = self.cached_line_count.saturating_sub(viewport_height);
        let offset = (self.get_offset(viewport_height) + lines).min(max_offset);
        if offset >= max_offset {
            self.mode = ScrollMode::FollowLatest;
        } else {
            self.mode = ScrollMode::Anchored { offset };
        }
    }

    pub fn page_up(&mut self, viewport_height: usize) {
        self.scroll_up(viewport_height.max(1), viewport_height);
    }

    pub fn page_down(&mut self, viewport_height: usize) {
        self.scroll_down(viewport_height.max(1), viewport_height);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.mode = ScrollMode::FollowLatest;
    }

    pub fn update_line_count(&mut self, line_count: usize) {
        self.cached_line_count = line_count;
    }
}

/// Full widget state.
pub struct ChatState {
    pub config: Config,
    pub transcript: Transcript,
    /// Span tree per message, built once when the message text is known.
    pub trees: HashMap<MessageId, SpanTree>,
    pub reveal: Option<ActiveReveal>,
    pub pending: Option<PendingQuery>,
    pub input: InputState,
    pub scroll: ScrollState,
    /// Lines available for the transcript pane.
    pub viewport_height: usize,
    pub terminal_size: (u16, u16),
    pub should_quit: bool,
}

impl ChatState {
    /// Creates the widget state with the configured greeting already in
    /// the transcript (complete, no animation).
    pub fn new(config: Config) -> Self {
        let mut transcript = Transcript::new();
        let mut trees = HashMap::new();
        if !config.greeting.is_empty() {
            let id = transcript.push_assistant(config.greeting.clone());
            transcript.apply(id, RevealEvent::Finish);
            trees.insert(id, span_tree(&config.greeting));
        }
        Self {
            config,
            transcript,
            trees,
            reveal: None,
            pending: None,
            input: InputState::default(),
            scroll: ScrollState::default(),
            viewport_height: 20,
            terminal_size: (80, 24),
            should_quit: false,
        }
    }

    /// Leaves of a message currently visible: the typewriter prefix while
    /// the message is revealing, everything otherwise.
    pub fn visible_leaves(&self, id: MessageId) -> usize {
        match &self.reveal {
            Some(reveal) if reveal.id == id => reveal.typewriter.shown(),
            _ => self.trees.get(&id).map_or(0, SpanTree::leaf_count),
        }
    }
}
