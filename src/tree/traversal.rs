//! Root-to-vertex walks
//!
//! Both walks keep an explicit stack of ancestors instead of recursing, so
//! their stack use is O(1) regardless of tree height.
//!
//! - descendant_path: own size + sibling sizes up to the root
//! - split_at_lca: the LCA and the child subtrees holding each label

use std::ptr;

use super::{Label, Tree};
use crate::RankError;

/// Sizes met on the walk from a vertex up to the root
///
/// Element 0 is the target's own internal vertex count (`leaves_below - 1`);
/// element `k` is the internal vertex count of the sibling subtree at the
/// `k`-th ancestor (0 when that sibling is a leaf).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct DescendantPath(Vec<usize>);

impl DescendantPath {
    /// Wrap raw sizes; element 0 must be at least 1
    pub fn new(sizes: Vec<usize>) -> Self {
        Self(sizes)
    }

    /// All sizes, own size first
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Internal vertices in the target's own subtree
    pub fn own_size(&self) -> usize {
        self.0.first().copied().unwrap_or(0)
    }

    /// Sibling sizes from the nearest ancestor to the root
    pub fn sibling_sizes(&self) -> &[usize] {
        self.0.get(1..).unwrap_or(&[])
    }

    /// Number of levels (1 for the root)
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no level was recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How the two queried vertices relate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum Relation {
    /// `u` is the LCA: `v` descends from `u` (or `u == v`)
    UAncestor,

    /// `v` is the LCA: `u` descends from `v`
    VAncestor,

    /// Neither is an ancestor of the other
    Incomparable,
}

/// Result of splitting a tree at the LCA of two labels
#[derive(Debug, Clone, Copy)]
pub struct LcaSplit<'a> {
    /// Subtree rooted at the lowest common ancestor
    pub lca: &'a Tree,

    /// Child of the LCA containing `u`, or the LCA itself if it is `u`
    pub u_side: &'a Tree,

    /// Child of the LCA containing `v`, or the LCA itself if it is `v`
    pub v_side: &'a Tree,

    /// Ancestor relation between `u` and `v`
    pub relation: Relation,
}

/// Ancestors of `label` from the root down to the vertex itself
///
/// Fails with `VertexNotFound` if the label is absent and with
/// `InvalidTree` if it occurs more than once.
pub fn ancestor_chain(tree: &Tree, label: Label) -> Result<Vec<&Tree>, RankError> {
    let mut stack: Vec<(&Tree, usize)> = vec![(tree, 0)];
    let mut chain: Vec<&Tree> = Vec::new();
    let mut found: Option<Vec<&Tree>> = None;

    while let Some((node, depth)) = stack.pop() {
        let Tree::Internal {
            label: node_label,
            left,
            right,
            ..
        } = node
        else {
            continue;
        };

        chain.truncate(depth);
        chain.push(node);

        if *node_label == label {
            if found.is_some() {
                return Err(RankError::InvalidTree(format!(
                    "label {label} occurs more than once"
                )));
            }
            found = Some(chain.clone());
        }

        stack.push((&**right, depth + 1));
        stack.push((&**left, depth + 1));
    }

    found.ok_or(RankError::VertexNotFound(label))
}

/// The child of `parent` that is not `child`
fn sibling_of<'a>(parent: &'a Tree, child: &Tree) -> Option<&'a Tree> {
    let (left, right) = parent.children()?;
    if ptr::eq(left, child) {
        Some(right)
    } else if ptr::eq(right, child) {
        Some(left)
    } else {
        None
    }
}

/// Own size of `label` followed by the sibling sizes up to the root
pub fn descendant_path(tree: &Tree, label: Label) -> Result<DescendantPath, RankError> {
    let chain = ancestor_chain(tree, label)?;
    let target = chain
        .last()
        .copied()
        .ok_or(RankError::VertexNotFound(label))?;

    if target.leaves_below() < 2 {
        return Err(RankError::InvalidTree(format!(
            "vertex {label} has fewer than two leaves below"
        )));
    }

    let mut sizes = Vec::with_capacity(chain.len());
    sizes.push(target.internal_count());

    for pair in chain.windows(2).rev() {
        let sibling = sibling_of(pair[0], pair[1]).ok_or_else(|| {
            RankError::InvalidTree(format!("broken ancestor chain above {label}"))
        })?;
        sizes.push(sibling.internal_count());
    }

    Ok(DescendantPath(sizes))
}

/// Split `tree` at the lowest common ancestor of `u` and `v`
///
/// Fails with `VertexNotFound(u)` first, then `VertexNotFound(v)`.
pub fn split_at_lca(tree: &Tree, u: Label, v: Label) -> Result<LcaSplit<'_>, RankError> {
    let chain_u = ancestor_chain(tree, u)?;
    let chain_v = ancestor_chain(tree, v)?;

    let shared = chain_u
        .iter()
        .zip(chain_v.iter())
        .take_while(|(a, b)| ptr::eq(**a, **b))
        .count();
    // Both chains start at the root
    let lca = chain_u[shared - 1];

    let u_is_lca = shared == chain_u.len();
    let v_is_lca = shared == chain_v.len();

    let split = if u_is_lca {
        LcaSplit {
            lca,
            u_side: lca,
            v_side: chain_v.get(shared).copied().unwrap_or(lca),
            relation: Relation::UAncestor,
        }
    } else if v_is_lca {
        LcaSplit {
            lca,
            u_side: chain_u[shared],
            v_side: lca,
            relation: Relation::VAncestor,
        }
    } else {
        LcaSplit {
            lca,
            u_side: chain_u[shared],
            v_side: chain_v[shared],
            relation: Relation::Incomparable,
        }
    };

    Ok(split)
}
