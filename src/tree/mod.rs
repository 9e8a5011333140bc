//! Labeled binary trees
//!
//! [`Tree`] is the owned input model. The walks in `traversal` answer one
//! query per search; [`TreeIndex`] flattens a tree once for many queries.

mod index;
mod node;
mod traversal;

pub use index::{IndexedSplit, TreeIndex};
pub use node::{Label, Tree};
pub use traversal::{
    ancestor_chain, descendant_path, split_at_lca, DescendantPath, LcaSplit, Relation,
};
