//! Tagged-variant binary tree
//!
//! Leaf = no payload
//! Internal = label + leaves_below + two exclusively owned children
//!
//! Trees are assembled by the caller and read-only afterwards.

use std::collections::HashSet;
use std::fmt;
use std::mem;

use crate::RankError;

/// Label of an internal vertex (positive, unique within one tree)
pub type Label = u32;

/// Rooted binary tree with labeled internal vertices
#[derive(Debug, Default)]
pub enum Tree {
    /// A leaf; contributes one to `leaves_below` of its ancestors
    #[default]
    Leaf,

    /// An internal vertex
    Internal {
        /// Identity of the vertex
        label: Label,
        /// Number of leaves in the subtree rooted here
        leaves_below: usize,
        /// Left child
        left: Box<Tree>,
        /// Right child
        right: Box<Tree>,
    },
}

impl Tree {
    /// A single leaf
    pub fn leaf() -> Self {
        Tree::Leaf
    }

    /// Internal vertex over `left` and `right`; `leaves_below` is derived
    pub fn internal(label: Label, left: Tree, right: Tree) -> Self {
        let leaves_below = left.leaves_below() + right.leaves_below();
        Self::with_leaf_count(label, leaves_below, left, right)
    }

    /// Internal vertex with a caller-supplied leaf count
    ///
    /// The count is not checked here; see [`Tree::validate`].
    pub fn with_leaf_count(label: Label, leaves_below: usize, left: Tree, right: Tree) -> Self {
        Tree::Internal {
            label,
            leaves_below,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Check if leaf
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Tree::Leaf)
    }

    /// Label of an internal vertex, `None` for a leaf
    #[inline]
    pub fn label(&self) -> Option<Label> {
        match self {
            Tree::Leaf => None,
            Tree::Internal { label, .. } => Some(*label),
        }
    }

    /// Leaves in this subtree (1 for a leaf)
    #[inline]
    pub fn leaves_below(&self) -> usize {
        match self {
            Tree::Leaf => 1,
            Tree::Internal { leaves_below, .. } => *leaves_below,
        }
    }

    /// Internal vertices in this subtree: `leaves_below - 1`
    #[inline]
    pub fn internal_count(&self) -> usize {
        self.leaves_below().saturating_sub(1)
    }

    /// `(left, right)` of an internal vertex
    #[inline]
    pub fn children(&self) -> Option<(&Tree, &Tree)> {
        match self {
            Tree::Leaf => None,
            Tree::Internal { left, right, .. } => Some((&**left, &**right)),
        }
    }

    /// Labels of all internal vertices in preorder
    pub fn labels(&self) -> Vec<Label> {
        let mut labels = Vec::with_capacity(self.internal_count());
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Tree::Internal {
                label, left, right, ..
            } = node
            {
                labels.push(*label);
                stack.push(right);
                stack.push(left);
            }
        }
        labels
    }

    /// Check the structural invariants
    ///
    /// - every internal `leaves_below` equals the sum over its children
    /// - labels are positive and unique
    pub fn validate(&self) -> Result<(), RankError> {
        let mut seen = HashSet::new();
        let mut stack = vec![self];

        while let Some(node) = stack.pop() {
            let Tree::Internal {
                label,
                leaves_below,
                left,
                right,
            } = node
            else {
                continue;
            };

            if *label == 0 {
                return Err(RankError::InvalidTree("label 0 is not allowed".to_string()));
            }
            if !seen.insert(*label) {
                return Err(RankError::InvalidTree(format!(
                    "label {label} occurs more than once"
                )));
            }

            let expected = left.leaves_below() + right.leaves_below();
            if *leaves_below != expected {
                return Err(RankError::InvalidTree(format!(
                    "vertex {label} records {leaves_below} leaves below, children hold {expected}"
                )));
            }

            stack.push(right);
            stack.push(left);
        }

        Ok(())
    }
}

impl Drop for Tree {
    // Unlink children onto a heap stack so dropping a caterpillar tree does
    // not recurse once per level.
    fn drop(&mut self) {
        let Tree::Internal { left, right, .. } = self else {
            return;
        };
        if left.is_leaf() && right.is_leaf() {
            return;
        }

        let mut pending = vec![mem::take(left.as_mut()), mem::take(right.as_mut())];
        while let Some(mut node) = pending.pop() {
            if let Tree::Internal { left, right, .. } = &mut node {
                pending.push(mem::take(left.as_mut()));
                pending.push(mem::take(right.as_mut()));
            }
        }
    }
}

/// Pending output while rendering a tree
enum Frame<'a> {
    Open(&'a Tree),
    Comma,
    Close(Label),
}

impl fmt::Display for Tree {
    /// Newick-style rendering with internal labels, e.g. `((,)4,)3`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut frames = vec![Frame::Open(self)];
        while let Some(frame) = frames.pop() {
            match frame {
                Frame::Open(Tree::Leaf) => {}
                Frame::Open(Tree::Internal {
                    label, left, right, ..
                }) => {
                    f.write_str("(")?;
                    frames.push(Frame::Close(*label));
                    frames.push(Frame::Open(&**right));
                    frames.push(Frame::Comma);
                    frames.push(Frame::Open(&**left));
                }
                Frame::Comma => f.write_str(",")?,
                Frame::Close(label) => write!(f, "){label}")?,
            }
        }
        Ok(())
    }
}
