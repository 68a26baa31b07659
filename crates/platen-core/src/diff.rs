//! Pure path diffing between consecutive leaves.
//!
//! Given the previous leaf's element path and the next leaf's, compute
//! which elements must close (innermost first) and which must open
//! (root to leaf) so the emitted markup stays well-formed. Independent
//! of any rendering target; the serializer in `tree` and the typewriter
//! in `reveal` both consume it.

use crate::tree::{ElementDesc, PathElement};

/// The operations needed to move from one leaf path to the next.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathDiff {
    /// Elements to close, innermost first.
    pub close: Vec<ElementDesc>,
    /// Elements to open, root to leaf.
    pub open: Vec<ElementDesc>,
}

/// Returns the first index at which the two paths diverge.
///
/// Divergence is a differing tag name, attribute set, or element
/// instance, or simply one path running out.
pub fn divergence_index(prev: &[PathElement], next: &[PathElement]) -> usize {
    prev.iter()
        .zip(next.iter())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Computes the close/open operations between two consecutive leaf paths.
pub fn diff_paths(prev: &[PathElement], next: &[PathElement]) -> PathDiff {
    let common = divergence_index(prev, next);
    PathDiff {
        close: prev[common..].iter().rev().map(|el| el.desc.clone()).collect(),
        open: next[common..].iter().map(|el| el.desc.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(tag: &str, instance: u64) -> PathElement {
        PathElement {
            desc: ElementDesc::new(tag),
            instance,
        }
    }

    #[test]
    fn test_identical_paths_no_ops() {
        let path = vec![el("p", 0), el("strong", 1)];
        let diff = diff_paths(&path, &path);
        assert!(diff.close.is_empty());
        assert!(diff.open.is_empty());
    }

    #[test]
    fn test_enter_nested_element() {
        let prev = vec![el("p", 0)];
        let next = vec![el("p", 0), el("strong", 1)];
        let diff = diff_paths(&prev, &next);
        assert!(diff.close.is_empty());
        assert_eq!(diff.open, vec![ElementDesc::new("strong")]);
    }

    #[test]
    fn test_leave_nested_element() {
        let prev = vec![el("p", 0), el("strong", 1), el("em", 2)];
        let next = vec![el("p", 0)];
        let diff = diff_paths(&prev, &next);
        // Innermost first.
        assert_eq!(
            diff.close,
            vec![ElementDesc::new("em"), ElementDesc::new("strong")]
        );
        assert!(diff.open.is_empty());
    }

    #[test]
    fn test_sibling_element_closes_and_reopens() {
        // Same descriptor, different instance: consecutive paragraphs.
        let prev = vec![el("p", 0)];
        let next = vec![el("p", 1)];
        let diff = diff_paths(&prev, &next);
        assert_eq!(diff.close, vec![ElementDesc::new("p")]);
        assert_eq!(diff.open, vec![ElementDesc::new("p")]);
    }

    #[test]
    fn test_divergence_on_attributes() {
        let a = PathElement {
            desc: ElementDesc::with_attrs("a", &[("href", "https://x")]),
            instance: 0,
        };
        let b = PathElement {
            desc: ElementDesc::with_attrs("a", &[("href", "https://y")]),
            instance: 0,
        };
        assert_eq!(divergence_index(&[a.clone()], &[b.clone()]), 0);
        let diff = diff_paths(&[a], &[b]);
        assert_eq!(diff.close.len(), 1);
        assert_eq!(diff.open.len(), 1);
    }

    #[test]
    fn test_empty_paths() {
        let diff = diff_paths(&[], &[]);
        assert_eq!(diff, PathDiff::default());
    }
}
