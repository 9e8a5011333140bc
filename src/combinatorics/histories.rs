//! Exact count of labeled histories
//!
//! A labeled history is a linear order of the internal vertices in which
//! every ancestor precedes its descendants. For a vertex with children of
//! `a` and `b` internal vertices the two child orders interleave in
//! C(a+b, a) ways, so H(v) = H(left) · H(right) · C(a+b, a).

use crate::tree::Tree;
use crate::RankError;

use super::binomial::nchoose_exact;

/// Number of labeled histories of `tree`
///
/// Evaluated bottom-up with an explicit stack. Fails with
/// [`RankError::Overflow`] once the count leaves `u128`.
pub fn history_count(tree: &Tree) -> Result<u128, RankError> {
    // Post-order: children are finished before their parent is popped again
    let mut stack: Vec<(&Tree, bool)> = vec![(tree, false)];
    let mut counts: Vec<u128> = Vec::new();

    while let Some((node, expanded)) = stack.pop() {
        let Some((left, right)) = node.children() else {
            counts.push(1);
            continue;
        };

        if !expanded {
            stack.push((node, true));
            stack.push((right, false));
            stack.push((left, false));
            continue;
        }

        let h_right = counts.pop().ok_or_else(|| {
            RankError::InvalidTree("unbalanced history stack".to_string())
        })?;
        let h_left = counts.pop().ok_or_else(|| {
            RankError::InvalidTree("unbalanced history stack".to_string())
        })?;

        let a = left.internal_count() as u64;
        let b = right.internal_count() as u64;
        let interleavings = nchoose_exact(a + b, a)
            .ok_or(RankError::Overflow("interleaving count"))?;

        let h = h_left
            .checked_mul(h_right)
            .and_then(|h| h.checked_mul(interleavings))
            .ok_or(RankError::Overflow("labeled history count"))?;
        counts.push(h);
    }

    counts
        .pop()
        .ok_or_else(|| RankError::InvalidTree("empty tree".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cherry(label: u32) -> Tree {
        Tree::internal(label, Tree::leaf(), Tree::leaf())
    }

    #[test]
    fn test_leaf_and_cherry() {
        assert_eq!(history_count(&Tree::leaf()).unwrap(), 1);
        assert_eq!(history_count(&cherry(1)).unwrap(), 1);
    }

    #[test]
    fn test_caterpillar_has_one_history() {
        let mut tree = cherry(10);
        for label in (1..10).rev() {
            tree = Tree::internal(label, tree, Tree::leaf());
        }
        assert_eq!(history_count(&tree).unwrap(), 1);
    }

    #[test]
    fn test_balanced_four_leaves() {
        // Root then the two cherries in either order
        let tree = Tree::internal(1, cherry(2), cherry(3));
        assert_eq!(history_count(&tree).unwrap(), 2);
    }
}
