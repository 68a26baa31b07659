//! Widget runtime: owns the terminal, runs the event loop, executes
//! effects.
//!
//! All side effects happen here. The reducer stays pure and returns
//! effects; this module spawns the query tasks and delivers their
//! results back through an inbox channel that is drained every frame.

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use platen_core::config::{Config, paths};
use platen_core::conversation;
use platen_core::query::QueryClient;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::ChatState;
use crate::{render, terminal, update};

/// Tick cadence while a reveal or request is active (~60fps).
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when nothing is animating; reduces CPU usage.
const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

struct ChatRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: ChatState,
    client: QueryClient,
    /// Handlers send async results here.
    inbox_tx: mpsc::UnboundedSender<UiEvent>,
    /// Drained every loop iteration.
    inbox_rx: mpsc::UnboundedReceiver<UiEvent>,
    last_tick: Instant,
    /// Keeps the tick fast while the user is typing or scrolling.
    last_terminal_event: Instant,
}

/// Runs the chat widget until the user quits.
///
/// Must be called from within a tokio runtime; the event loop itself is
/// blocking, query requests run as spawned tasks.
pub fn run(config: Config) -> Result<()> {
    let conversation_id = conversation::load_or_create(&paths::conversation_path())
        .context("Failed to load conversation token")?;
    let client = QueryClient::from_config(&config, conversation_id)?;

    terminal::install_panic_hook();
    let term = terminal::setup_terminal()?;

    let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
    let now = Instant::now();
    let mut runtime = ChatRuntime {
        terminal: term,
        state: ChatState::new(config),
        client,
        inbox_tx,
        inbox_rx,
        last_tick: now,
        last_terminal_event: now,
    };

    let result = runtime.event_loop();
    terminal::restore_terminal()?;
    result
}

impl ChatRuntime {
    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            // Frame goes first so layout is current before other events.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                // Renders are batched to the tick cadence.
                if matches!(&event, UiEvent::Tick { .. } | UiEvent::Answer { .. }) {
                    dirty = true;
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                let mut total_lines = 0;
                self.terminal.draw(|frame| {
                    total_lines = render::render(&self.state, frame);
                })?;
                self.state.scroll.update_line_count(total_lines);
                dirty = false;
            }
        }

        Ok(())
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let recent_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let needs_fast_poll =
            self.state.reveal.is_some() || self.state.pending.is_some() || recent_activity;
        let tick_interval = if needs_fast_poll {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Block until the next tick is due unless events are already
        // waiting; input wakes the poll early.
        let time_until_tick = tick_interval.saturating_sub(self.last_tick.elapsed());
        let poll_duration = if events.is_empty() {
            time_until_tick
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick {
                now: Instant::now(),
            });
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::SubmitQuery { text, token } => {
                let client = self.client.clone();
                let tx = self.inbox_tx.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        () = token.cancelled() => {}
                        result = client.ask(&text) => {
                            let result = result.map_err(|err| format!("{err:#}"));
                            let _ = tx.send(UiEvent::Answer { result });
                        }
                    }
                });
            }
            UiEffect::CancelQuery { token } => token.cancel(),
        }
    }
}
