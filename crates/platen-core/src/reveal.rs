//! The typewriter reveal.
//!
//! Reveals a message one leaf per tick while keeping the emitted markup
//! well-formed at every step. A naive character-count truncation of the
//! formatted fragment would leave tags dangling mid-reveal; instead the
//! typewriter walks the span tree, closing to the common ancestor and
//! reopening the new suffix for each leaf (see `diff`).
//!
//! The typewriter knows nothing about timers: an external scheduler calls
//! [`Typewriter::advance`] at its own cadence and stops calling on
//! cancellation. Completion is reported exactly once.

use crate::tree::{PathElement, SpanTree, append_leaf, close_open, render_leaves};

/// Outcome of a single reveal tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// One more leaf is visible; more remain.
    Advanced,
    /// This tick revealed the final leaf. Returned exactly once.
    Completed,
    /// The reveal had already completed; the tick was a no-op.
    Idle,
}

/// Stateful per-message reveal.
///
/// Keeps an incremental buffer of everything revealed so far plus the
/// stack of currently open elements, so each tick does O(depth) work and
/// [`markup`](Self::markup) only has to close the open suffix.
#[derive(Debug, Clone)]
pub struct Typewriter {
    tree: SpanTree,
    shown: usize,
    buffer: String,
    open: Vec<PathElement>,
}

impl Typewriter {
    /// Creates a reveal at prefix length zero.
    ///
    /// An empty tree is complete from the start: zero ticks, empty markup.
    pub fn new(tree: SpanTree) -> Self {
        Self {
            tree,
            shown: 0,
            buffer: String::new(),
            open: Vec::new(),
        }
    }

    pub fn tree(&self) -> &SpanTree {
        &self.tree
    }

    /// Number of leaves currently visible.
    pub fn shown(&self) -> usize {
        self.shown
    }

    pub fn leaf_count(&self) -> usize {
        self.tree.leaf_count()
    }

    pub fn is_complete(&self) -> bool {
        self.shown == self.tree.leaf_count()
    }

    /// Reveals the next leaf.
    ///
    /// Idempotent past the end: once complete, further ticks return
    /// [`Tick::Idle`] and mutate nothing.
    pub fn advance(&mut self) -> Tick {
        if self.is_complete() {
            return Tick::Idle;
        }
        let leaf = self.tree.leaves()[self.shown].clone();
        append_leaf(&mut self.buffer, &mut self.open, &leaf);
        self.shown += 1;
        if self.is_complete() {
            Tick::Completed
        } else {
            Tick::Advanced
        }
    }

    /// Reveals all remaining leaves at once.
    ///
    /// Used when the host snaps a reveal to its final state (a new turn
    /// started while this one was still ticking). Returns
    /// [`Tick::Completed`] if this call finished the reveal, [`Tick::Idle`]
    /// if it was already complete.
    pub fn finish(&mut self) -> Tick {
        if self.is_complete() {
            return Tick::Idle;
        }
        while !self.is_complete() {
            self.advance();
        }
        Tick::Completed
    }

    /// The minimal well-formed fragment for the current prefix.
    pub fn markup(&self) -> String {
        let mut out = self.buffer.clone();
        close_open(&mut out, &self.open);
        out
    }
}

/// Pure rendering of the first `n` leaves, clamped to the leaf count.
///
/// `render_prefix(tree, tree.leaf_count())` equals `tree.to_markup()`.
pub fn render_prefix(tree: &SpanTree, n: usize) -> String {
    let n = n.min(tree.leaf_count());
    render_leaves(&tree.leaves()[..n])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{format_message, span_tree};

    #[test]
    fn test_prefix_reopens_and_closes_inline_element() {
        // After "Hello **w" the visible chars are "Hello w": the strong
        // element is opened and immediately closed, never left dangling.
        let tree = span_tree("Hello **world**!");
        assert_eq!(render_prefix(&tree, 7), "Hello <strong>w</strong>");
    }

    #[test]
    fn test_final_prefix_matches_formatter() {
        for text in [
            "Hello **world**!",
            "a *b* `c` [d](https://e)",
            "para1\n\npara2\nbreak",
            "plain",
        ] {
            let tree = span_tree(text);
            assert_eq!(render_prefix(&tree, tree.leaf_count()), format_message(text));
        }
    }

    #[test]
    fn test_every_prefix_is_well_formed() {
        let tree = span_tree("x *a **b** c* y\n\n`z`");
        for n in 0..=tree.leaf_count() {
            let fragment = render_prefix(&tree, n);
            // A well-formed fragment is a fixed point of extract+serialize.
            assert_eq!(
                SpanTree::from_markup(&fragment).to_markup(),
                fragment,
                "prefix {n} not well-formed: {fragment:?}"
            );
        }
    }

    #[test]
    fn test_prefix_consistency() {
        let tree = span_tree("**ab** cd *ef*");
        let full = SpanTree::from_markup(&render_prefix(&tree, tree.leaf_count())).source_text();
        for n in 0..=tree.leaf_count() {
            let visible = SpanTree::from_markup(&render_prefix(&tree, n)).source_text();
            assert!(
                full.starts_with(&visible),
                "prefix {n}: {visible:?} is not a prefix of {full:?}"
            );
        }
    }

    #[test]
    fn test_prefix_clamps_past_leaf_count() {
        let tree = span_tree("hi");
        assert_eq!(render_prefix(&tree, 100), render_prefix(&tree, 2));
    }

    #[test]
    fn test_paragraph_boundary_mid_reveal() {
        let tree = span_tree("line1\n\nline2");
        // Five chars of line1, then the first char of line2.
        assert_eq!(render_prefix(&tree, 6), "<p>line1</p><p>l</p>");
    }

    #[test]
    fn test_typewriter_matches_pure_rendering() {
        let tree = span_tree("a **b** c\nd");
        let mut tw = Typewriter::new(tree.clone());
        assert_eq!(tw.markup(), "");
        for n in 1..=tree.leaf_count() {
            let tick = tw.advance();
            assert_eq!(tw.shown(), n);
            assert_eq!(tw.markup(), render_prefix(&tree, n));
            if n == tree.leaf_count() {
                assert_eq!(tick, Tick::Completed);
            } else {
                assert_eq!(tick, Tick::Advanced);
            }
        }
    }

    #[test]
    fn test_completion_fires_once() {
        let mut tw = Typewriter::new(span_tree("ab"));
        assert_eq!(tw.advance(), Tick::Advanced);
        assert_eq!(tw.advance(), Tick::Completed);
        assert_eq!(tw.advance(), Tick::Idle);
        assert_eq!(tw.advance(), Tick::Idle);
    }

    #[test]
    fn test_empty_message_completes_with_zero_ticks() {
        let mut tw = Typewriter::new(span_tree(""));
        assert!(tw.is_complete());
        assert_eq!(tw.markup(), "");
        assert_eq!(tw.advance(), Tick::Idle);
    }

    #[test]
    fn test_finish_snaps_to_full_markup() {
        let tree = span_tree("**snap** to end");
        let mut tw = Typewriter::new(tree.clone());
        tw.advance();
        assert_eq!(tw.finish(), Tick::Completed);
        assert_eq!(tw.markup(), tree.to_markup());
        assert_eq!(tw.finish(), Tick::Idle);
    }
}
