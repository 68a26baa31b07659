//! platen-core: the chat widget kernel plus its ambient collaborators.
//!
//! The kernel is a constrained markdown-to-markup formatter and an
//! incremental typewriter renderer that keeps the emitted markup
//! well-formed at every animation step:
//!
//! - [`format`]: the five-rule formatter (`format_message`)
//! - [`tree`]: leaf extraction from a formatted fragment ([`tree::SpanTree`])
//! - [`diff`]: pure path diffing between consecutive leaves
//! - [`reveal`]: the per-leaf typewriter ([`reveal::Typewriter`])
//! - [`message`]: message model, reveal state machine, transcript
//!
//! Everything else is the plumbing the widget needs to talk to the
//! outside world: [`config`], [`conversation`] (the persisted opaque
//! conversation token), and [`query`] (the remote answer endpoint).

pub mod config;
pub mod conversation;
pub mod diff;
pub mod format;
pub mod message;
pub mod query;
pub mod reveal;
pub mod tree;
