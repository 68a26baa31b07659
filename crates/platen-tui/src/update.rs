//! The pure reducer.
//!
//! `update` is the single place state changes. It consumes one event,
//! mutates `ChatState`, and returns the effects the runtime must execute.
//! No I/O happens here, which keeps every interaction testable without a
//! terminal or a server.

use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use platen_core::format::span_tree;
use platen_core::message::RevealEvent;
use platen_core::query::FALLBACK_ANSWER;
use platen_core::reveal::{Tick, Typewriter};
use tokio_util::sync::CancellationToken;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::render::INPUT_PANE_HEIGHT;
use crate::state::{ActiveReveal, ChatState, PendingQuery};

/// Applies one event to the state, returning effects for the runtime.
pub fn update(state: &mut ChatState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Frame { width, height } => {
            state.terminal_size = (width, height);
            // Transcript pane height minus its borders.
            state.viewport_height =
                usize::from(height.saturating_sub(INPUT_PANE_HEIGHT).saturating_sub(2));
            Vec::new()
        }
        UiEvent::Terminal(event) => handle_terminal_event(state, &event),
        UiEvent::Tick { now } => handle_tick(state, now),
        UiEvent::Answer { result } => handle_answer(state, result),
    }
}

fn handle_terminal_event(state: &mut ChatState, event: &Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
            handle_key(state, key)
        }
        Event::Resize(width, height) => update(
            state,
            UiEvent::Frame {
                width: *width,
                height: *height,
            },
        ),
        _ => Vec::new(),
    }
}

fn handle_key(state: &mut ChatState, key: &KeyEvent) -> Vec<UiEffect> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return quit(state),
            KeyCode::Char('a') => state.input.move_home(),
            KeyCode::Char('e') => state.input.move_end(),
            _ => {}
        }
        return Vec::new();
    }

    match key.code {
        KeyCode::Enter => return submit(state),
        KeyCode::Esc => return cancel_pending(state),
        KeyCode::Char(ch) => state.input.insert(ch),
        KeyCode::Backspace => state.input.backspace(),
        KeyCode::Left => state.input.move_left(),
        KeyCode::Right => state.input.move_right(),
        KeyCode::Home => state.input.move_home(),
        KeyCode::End => state.input.move_end(),
        KeyCode::Up => state.scroll.scroll_up(1, state.viewport_height),
        KeyCode::Down => state.scroll.scroll_down(1, state.viewport_height),
        KeyCode::PageUp => state.scroll.page_up(state.viewport_height),
        KeyCode::PageDown => state.scroll.page_down(state.viewport_height),
        _ => {}
    }
    Vec::new()
}

fn quit(state: &mut ChatState) -> Vec<UiEffect> {
    state.should_quit = true;
    cancel_pending(state)
}

fn cancel_pending(state: &mut ChatState) -> Vec<UiEffect> {
    match state.pending.take() {
        Some(pending) => vec![UiEffect::CancelQuery {
            token: pending.token,
        }],
        None => Vec::new(),
    }
}

/// Submits the input buffer as a new user turn.
///
/// A turn in flight blocks further submits (one request per turn). Any
/// reveal still ticking is snapped to completion so the transcript never
/// animates two messages at once.
fn submit(state: &mut ChatState) -> Vec<UiEffect> {
    if state.input.is_blank() || state.pending.is_some() {
        return Vec::new();
    }

    finish_active_reveal(state);

    let text = state.input.take();
    let id = state.transcript.push_user(text.clone());
    state.trees.insert(id, span_tree(&text));
    state.scroll.scroll_to_bottom();

    let token = CancellationToken::new();
    state.pending = Some(PendingQuery {
        token: token.clone(),
    });
    vec![UiEffect::SubmitQuery { text, token }]
}

fn finish_active_reveal(state: &mut ChatState) {
    if let Some(mut reveal) = state.reveal.take() {
        reveal.typewriter.finish();
        state.transcript.apply(reveal.id, RevealEvent::Finish);
    }
}

fn handle_tick(state: &mut ChatState, now: Instant) -> Vec<UiEffect> {
    if state.reveal.is_none() {
        return Vec::new();
    }

    let Some(interval) = state.config.reveal_interval() else {
        // Animation disabled mid-reveal; snap to the end.
        finish_active_reveal(state);
        return Vec::new();
    };

    let Some(reveal) = &mut state.reveal else {
        return Vec::new();
    };

    // Ticks arrive on the frame cadence, not the reveal cadence, so one
    // tick may owe several leaves. Advance every leaf that came due since
    // the last advance and carry the remainder into the next tick.
    let steps = match reveal.last_advance {
        None => {
            reveal.last_advance = Some(now);
            1
        }
        Some(last) => {
            let elapsed = now.duration_since(last).as_micros() / interval.as_micros();
            let due = u32::try_from(elapsed).unwrap_or(u32::MAX);
            if due == 0 {
                return Vec::new();
            }
            reveal.last_advance = Some(last + interval * due);
            due
        }
    };

    let id = reveal.id;
    let mut completed = false;
    for _ in 0..steps {
        if reveal.typewriter.advance() == Tick::Completed {
            completed = true;
            break;
        }
    }
    if completed {
        state.reveal = None;
        state.transcript.apply(id, RevealEvent::Finish);
    }
    Vec::new()
}

/// Installs the answer (or the fallback text) as a new assistant message
/// and starts its reveal.
fn handle_answer(state: &mut ChatState, result: Result<String, String>) -> Vec<UiEffect> {
    // A delivery with no turn in flight is stale (cancelled or superseded).
    if state.pending.take().is_none() {
        return Vec::new();
    }

    let text = match result {
        Ok(answer) => answer,
        Err(error) => {
            tracing::warn!(%error, "query failed, showing fallback answer");
            FALLBACK_ANSWER.to_string()
        }
    };

    let id = state.transcript.push_assistant(text.clone());
    let tree = span_tree(&text);
    let typewriter = Typewriter::new(tree.clone());
    state.trees.insert(id, tree);

    if state.config.reveal_interval().is_none() || typewriter.is_complete() {
        state.transcript.apply(id, RevealEvent::Finish);
    } else {
        state.transcript.apply(id, RevealEvent::Start);
        state.reveal = Some(ActiveReveal {
            id,
            typewriter,
            last_advance: None,
        });
    }
    state.scroll.scroll_to_bottom();
    Vec::new()
}
