//! UI event types.
//!
//! Everything that can happen to the widget arrives as a `UiEvent`:
//! terminal input, the runtime's tick, layout changes, and results of
//! spawned tasks delivered through the inbox channel.

use std::time::Instant;

/// Events consumed by the reducer.
#[derive(Debug)]
pub enum UiEvent {
    /// Raw terminal input.
    Terminal(crossterm::event::Event),

    /// Periodic tick; drives the reveal animation and render cadence.
    Tick { now: Instant },

    /// Emitted once per loop iteration with the current terminal size so
    /// layout updates happen before other events.
    Frame { width: u16, height: u16 },

    /// The answer endpoint replied (or failed). Sent through the inbox by
    /// the query task; never sent after its cancellation token fires.
    Answer { result: Result<String, String> },
}
