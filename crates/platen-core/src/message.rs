//! Message model and per-message reveal state machine.
//!
//! A message is created on send or receive and never mutated afterwards,
//! except for the one-way reveal state transition. The transcript is an
//! ordered, append-only sequence owned by the host.

/// Identifies a message within a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

/// Per-message animation state.
///
/// `Pending → Revealing → Complete`, driven through a single transition
/// entry point. `Complete` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealState {
    /// Not yet typed.
    #[default]
    Pending,
    /// Ticking.
    Revealing,
    /// Fully visible. Terminal.
    Complete,
}

/// Inputs to the reveal state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealEvent {
    /// The typewriter started ticking.
    Start,
    /// The typewriter revealed the last leaf.
    Finish,
}

impl RevealState {
    /// Applies an event; returns true if the state changed.
    ///
    /// Invalid or repeated events are no-ops, so a finish delivered twice
    /// (or after a reveal was snapped to completion) mutates nothing.
    pub fn transition(&mut self, event: RevealEvent) -> bool {
        let next = match (*self, event) {
            (Self::Pending, RevealEvent::Start) => Self::Revealing,
            (Self::Pending | Self::Revealing, RevealEvent::Finish) => Self::Complete,
            _ => return false,
        };
        *self = next;
        true
    }
}

/// One transcript entry.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    /// Raw, unformatted text.
    pub text: String,
    pub is_user: bool,
    state: RevealState,
}

impl Message {
    /// A user message is complete on creation: no animation.
    fn user(id: MessageId, text: String) -> Self {
        Self {
            id,
            text,
            is_user: true,
            state: RevealState::Complete,
        }
    }

    fn assistant(id: MessageId, text: String) -> Self {
        Self {
            id,
            text,
            is_user: false,
            state: RevealState::Pending,
        }
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == RevealState::Complete
    }

    /// Applies a reveal event; returns true if the state changed.
    pub fn apply(&mut self, event: RevealEvent) -> bool {
        self.state.transition(event)
    }
}

/// Ordered, append-only conversation transcript.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a user message (immediately complete).
    pub fn push_user(&mut self, text: impl Into<String>) -> MessageId {
        let id = self.mint_id();
        self.messages.push(Message::user(id, text.into()));
        id
    }

    /// Appends an assistant message in the pending state.
    pub fn push_assistant(&mut self, text: impl Into<String>) -> MessageId {
        let id = self.mint_id();
        self.messages.push(Message::assistant(id, text.into()));
        id
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Applies a reveal event to the identified message.
    ///
    /// Returns false for unknown ids (e.g. a stale tick after the host
    /// discarded the message) and for no-op transitions.
    pub fn apply(&mut self, id: MessageId, event: RevealEvent) -> bool {
        self.messages
            .iter_mut()
            .find(|m| m.id == id)
            .is_some_and(|m| m.apply(event))
    }

    fn mint_id(&mut self) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_state_happy_path() {
        let mut state = RevealState::Pending;
        assert!(state.transition(RevealEvent::Start));
        assert_eq!(state, RevealState::Revealing);
        assert!(state.transition(RevealEvent::Finish));
        assert_eq!(state, RevealState::Complete);
    }

    #[test]
    fn test_complete_is_terminal() {
        let mut state = RevealState::Complete;
        assert!(!state.transition(RevealEvent::Start));
        assert!(!state.transition(RevealEvent::Finish));
        assert_eq!(state, RevealState::Complete);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut state = RevealState::Revealing;
        assert!(state.transition(RevealEvent::Finish));
        assert!(!state.transition(RevealEvent::Finish));
    }

    #[test]
    fn test_user_message_skips_animation() {
        let mut transcript = Transcript::new();
        let id = transcript.push_user("hi");
        assert!(transcript.get(id).unwrap().is_complete());
    }

    #[test]
    fn test_assistant_message_starts_pending() {
        let mut transcript = Transcript::new();
        let id = transcript.push_assistant("answer");
        let msg = transcript.get(id).unwrap();
        assert_eq!(msg.state(), RevealState::Pending);
        assert!(!msg.is_complete());
    }

    #[test]
    fn test_transcript_is_append_only_and_ordered() {
        let mut transcript = Transcript::new();
        let a = transcript.push_user("one");
        let b = transcript.push_assistant("two");
        let c = transcript.push_user("three");
        assert!(a < b && b < c);
        let texts: Vec<_> = transcript.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["one", "two", "three"]);
    }

    #[test]
    fn test_apply_to_unknown_id_is_noop() {
        let mut transcript = Transcript::new();
        let id = transcript.push_assistant("x");
        assert!(transcript.apply(id, RevealEvent::Start));
        // A stale tick for a message this transcript never held.
        assert!(!transcript.apply(MessageId(999), RevealEvent::Start));
    }
}
