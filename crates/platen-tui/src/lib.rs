//! platen-tui: the embeddable terminal chat widget.
//!
//! Elm-style split: `state` holds the widget state, `update` is the pure
//! reducer producing `effects`, and `runtime` owns the terminal, runs the
//! event loop, and executes effects (query requests, cancellation). The
//! reveal animation is driven by the runtime's tick cadence; the kernel in
//! `platen-core` decides what each tick shows.

mod effects;
mod events;
mod render;
mod runtime;
mod state;
mod terminal;
mod update;
mod wrap;

pub use runtime::run;
