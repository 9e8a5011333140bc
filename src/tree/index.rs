//! Label index over a validated tree
//!
//! Internal vertices are flattened into an arena (preorder) with parent
//! links, so a descendant path or an LCA split costs O(depth) instead of a
//! full search per query.

use std::collections::HashMap;

use super::traversal::{DescendantPath, Relation};
use super::{Label, Tree};
use crate::RankError;

type VertexId = usize;

#[derive(Debug, Clone)]
struct IndexedVertex {
    label: Label,
    leaves_below: usize,
    parent: Option<VertexId>,
    /// Internal vertex count of the other child of `parent`
    sibling_size: usize,
    depth: usize,
}

/// LCA split expressed in labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedSplit {
    /// Label of the lowest common ancestor
    pub lca: Label,
    /// Root of the side holding `u`; `None` when that side is the LCA
    pub u_side: Option<Label>,
    /// Root of the side holding `v`; `None` when that side is the LCA
    pub v_side: Option<Label>,
    /// Ancestor relation between `u` and `v`
    pub relation: Relation,
}

/// Arena index of the internal vertices of one tree
#[derive(Debug, Clone)]
pub struct TreeIndex {
    vertices: Vec<IndexedVertex>,
    by_label: HashMap<Label, VertexId>,
}

impl TreeIndex {
    /// Validate `tree` and index its internal vertices
    pub fn build(tree: &Tree) -> Result<Self, RankError> {
        tree.validate()?;

        let mut vertices = Vec::with_capacity(tree.internal_count());
        let mut by_label = HashMap::with_capacity(tree.internal_count());
        let mut stack: Vec<(&Tree, Option<VertexId>, usize, usize)> = vec![(tree, None, 0, 0)];

        while let Some((node, parent, sibling_size, depth)) = stack.pop() {
            let Tree::Internal {
                label,
                leaves_below,
                left,
                right,
            } = node
            else {
                continue;
            };

            let id = vertices.len();
            vertices.push(IndexedVertex {
                label: *label,
                leaves_below: *leaves_below,
                parent,
                sibling_size,
                depth,
            });
            if by_label.insert(*label, id).is_some() {
                return Err(RankError::InvalidTree(format!(
                    "label {label} occurs more than once"
                )));
            }

            stack.push((&**right, Some(id), left.internal_count(), depth + 1));
            stack.push((&**left, Some(id), right.internal_count(), depth + 1));
        }

        Ok(Self { vertices, by_label })
    }

    /// Number of internal vertices
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True for a single-leaf tree
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Label of the root, `None` for a single-leaf tree
    pub fn root_label(&self) -> Option<Label> {
        self.vertices.first().map(|v| v.label)
    }

    /// Labels in preorder
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.vertices.iter().map(|v| v.label)
    }

    /// Distance from the root (root = 0)
    pub fn depth(&self, label: Label) -> Result<usize, RankError> {
        Ok(self.vertices[self.id(label)?].depth)
    }

    /// Internal vertices in the subtree rooted at `label`
    pub fn internal_count(&self, label: Label) -> Result<usize, RankError> {
        Ok(self.vertices[self.id(label)?].leaves_below - 1)
    }

    /// Descendant path of `label` up to the root
    pub fn descendant_path(&self, label: Label) -> Result<DescendantPath, RankError> {
        let id = self.id(label)?;
        Ok(self.path_until(id, None))
    }

    /// Descendant path of `label` within the subtree rooted at `subroot`
    ///
    /// Fails with [`RankError::NotDescendant`] when `label` lies outside it.
    pub fn descendant_path_within(
        &self,
        label: Label,
        subroot: Label,
    ) -> Result<DescendantPath, RankError> {
        let id = self.id(label)?;
        let root_id = self.id(subroot)?;
        if !self.is_ancestor_or_self(root_id, id) {
            return Err(RankError::NotDescendant {
                label,
                ancestor: subroot,
            });
        }
        Ok(self.path_until(id, Some(root_id)))
    }

    /// Split at the lowest common ancestor of `u` and `v`
    pub fn split_at_lca(&self, u: Label, v: Label) -> Result<IndexedSplit, RankError> {
        let u_id = self.id(u)?;
        let v_id = self.id(v)?;

        // Climb the deeper vertex first, remembering the child we came from
        let (mut a, mut b) = (u_id, v_id);
        let (mut below_a, mut below_b) = (None, None);
        while self.vertices[a].depth > self.vertices[b].depth {
            below_a = Some(a);
            a = self.parent(a)?;
        }
        while self.vertices[b].depth > self.vertices[a].depth {
            below_b = Some(b);
            b = self.parent(b)?;
        }
        while a != b {
            below_a = Some(a);
            a = self.parent(a)?;
            below_b = Some(b);
            b = self.parent(b)?;
        }

        let relation = if a == u_id {
            Relation::UAncestor
        } else if a == v_id {
            Relation::VAncestor
        } else {
            Relation::Incomparable
        };

        Ok(IndexedSplit {
            lca: self.vertices[a].label,
            u_side: below_a.map(|id| self.vertices[id].label),
            v_side: below_b.map(|id| self.vertices[id].label),
            relation,
        })
    }

    fn id(&self, label: Label) -> Result<VertexId, RankError> {
        self.by_label
            .get(&label)
            .copied()
            .ok_or(RankError::VertexNotFound(label))
    }

    fn parent(&self, id: VertexId) -> Result<VertexId, RankError> {
        self.vertices[id].parent.ok_or_else(|| {
            RankError::InvalidTree(format!(
                "vertex {} has no parent above it",
                self.vertices[id].label
            ))
        })
    }

    fn is_ancestor_or_self(&self, ancestor: VertexId, mut id: VertexId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.vertices[id].parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn path_until(&self, id: VertexId, stop: Option<VertexId>) -> DescendantPath {
        let mut sizes = vec![self.vertices[id].leaves_below - 1];
        let mut current = id;
        while Some(current) != stop {
            let vertex = &self.vertices[current];
            let Some(parent) = vertex.parent else {
                break;
            };
            sizes.push(vertex.sibling_size);
            current = parent;
        }
        DescendantPath::new(sizes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::descendant_path;

    fn cherry(label: Label) -> Tree {
        Tree::internal(label, Tree::leaf(), Tree::leaf())
    }

    fn sample() -> Tree {
        let t1 = Tree::internal(3, cherry(4), Tree::leaf());
        let t2 = Tree::internal(6, cherry(7), cherry(8));
        let t4 = Tree::internal(2, t1, cherry(5));
        Tree::internal(1, t2, t4)
    }

    #[test]
    fn test_index_layout() {
        let index = TreeIndex::build(&sample()).unwrap();
        assert_eq!(index.len(), 8);
        assert_eq!(index.root_label(), Some(1));
        assert_eq!(index.labels().collect::<Vec<_>>(), vec![1, 6, 7, 8, 2, 3, 4, 5]);
        assert_eq!(index.depth(4).unwrap(), 3);
        assert_eq!(index.internal_count(2).unwrap(), 4);
        assert!(matches!(index.depth(9), Err(RankError::VertexNotFound(9))));
    }

    #[test]
    fn test_paths_match_direct_walk() {
        let tree = sample();
        let index = TreeIndex::build(&tree).unwrap();
        for label in tree.labels() {
            assert_eq!(
                index.descendant_path(label).unwrap(),
                descendant_path(&tree, label).unwrap()
            );
        }
    }

    #[test]
    fn test_path_within_subtree() {
        let index = TreeIndex::build(&sample()).unwrap();
        let path = index.descendant_path_within(4, 3).unwrap();
        assert_eq!(path.as_slice(), &[1, 0]);
        let path = index.descendant_path_within(3, 3).unwrap();
        assert_eq!(path.as_slice(), &[2]);
        assert!(matches!(
            index.descendant_path_within(7, 3),
            Err(RankError::NotDescendant { label: 7, ancestor: 3 })
        ));
    }

    #[test]
    fn test_split() {
        let index = TreeIndex::build(&sample()).unwrap();

        let split = index.split_at_lca(5, 4).unwrap();
        assert_eq!(split.lca, 2);
        assert_eq!(split.u_side, Some(5));
        assert_eq!(split.v_side, Some(3));
        assert_eq!(split.relation, Relation::Incomparable);

        let split = index.split_at_lca(6, 8).unwrap();
        assert_eq!(split.relation, Relation::UAncestor);
        assert_eq!(split.u_side, None);

        let split = index.split_at_lca(4, 2).unwrap();
        assert_eq!(split.relation, Relation::VAncestor);
        assert_eq!(split.u_side, Some(3));
    }

    #[test]
    fn test_build_rejects_invalid_tree() {
        let tree = Tree::internal(1, cherry(2), cherry(2));
        assert!(TreeIndex::build(&tree).is_err());
    }
}
