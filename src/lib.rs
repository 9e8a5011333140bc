//! # Rank probabilities in ranked binary trees
//!
//! Under the labeled-history model every linear order of the internal
//! vertices that places ancestors before descendants is equally likely.
//! This crate computes, for a tree with labeled internal vertices:
//!
//! 1. **Rank distribution**: P(rank of `u` = i) for every i
//! 2. **Moments**: expected rank and its variance
//! 3. **Precedence**: P(`u` comes before `v`)
//!
//! Rank 1 is the root. All work goes through a [`RankEngine`], which owns
//! the binomial cache shared by its queries.
//!
//! ## Usage Example
//!
//! ```
//! use rankprob::{RankEngine, Tree};
//!
//! let t1 = Tree::internal(3, Tree::internal(4, Tree::leaf(), Tree::leaf()), Tree::leaf());
//! let t3 = Tree::internal(5, Tree::leaf(), Tree::leaf());
//! let tree = Tree::internal(2, t1, t3);
//!
//! let mut engine = RankEngine::default();
//! let p = engine.compare(&tree, 5, 4)?;
//! assert!((p - 2.0 / 3.0).abs() < 1e-12);
//! # Ok::<(), rankprob::RankError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod combinatorics; // Binomial coefficients and history counts
pub mod rank; // Rank distribution, moments, precedence
pub mod tree; // Tree model, walks and label index
/// Python bindings for exposing the rank engine to external runtimes.
#[cfg(feature = "python-bindings")]
pub mod python_bindings;

// Re-exports for convenience
pub use combinatorics::BinomialCache;
pub use rank::{moments, RankDistribution, RankSummary};
pub use tree::{
    descendant_path, split_at_lca, DescendantPath, Label, LcaSplit, Relation, Tree, TreeIndex,
};

use thiserror::Error;
use tracing::debug;

/// Configuration for a [`RankEngine`]
#[derive(Debug, Clone)]
pub struct RankConfig {
    /// Validate leaf counts and label uniqueness before each tree query
    pub validate_trees: bool,

    /// Allowed drift of a distribution's sum from 1 before a warning
    pub sum_tolerance: f64,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            validate_trees: true,
            sum_tolerance: 1e-9,
        }
    }
}

impl RankConfig {
    /// Enable or disable per-query validation
    pub fn with_validation(mut self, validate_trees: bool) -> Self {
        self.validate_trees = validate_trees;
        self
    }

    /// Set the sum tolerance
    pub fn with_sum_tolerance(mut self, sum_tolerance: f64) -> Self {
        self.sum_tolerance = sum_tolerance;
        self
    }
}

/// Errors raised by rank queries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RankError {
    /// Label does not occur in the tree
    #[error("vertex {0} not found in tree")]
    VertexNotFound(Label),

    /// Structure or leaf counts are inconsistent
    #[error("invalid tree: {0}")]
    InvalidTree(String),

    /// Label lies outside the requested subtree
    #[error("vertex {label} is not a descendant of {ancestor}")]
    NotDescendant {
        /// Queried vertex
        label: Label,
        /// Root of the subtree it was expected in
        ancestor: Label,
    },

    /// Exact count does not fit in 128 bits
    #[error("{0} exceeds 128 bits")]
    Overflow(&'static str),
}

/// Computation context for rank queries
///
/// Owns one [`BinomialCache`]; separate engines share no state.
#[derive(Debug, Clone, Default)]
pub struct RankEngine {
    cache: BinomialCache,
    config: RankConfig,
}

impl RankEngine {
    /// Create engine with `config`
    pub fn new(config: RankConfig) -> Self {
        Self {
            cache: BinomialCache::new(),
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Binomial cache, for diagnostics
    pub fn cache(&self) -> &BinomialCache {
        &self.cache
    }

    /// C(n, j) from the engine's cache
    pub fn nchoose(&mut self, n: usize, j: usize) -> f64 {
        self.cache.nchoose(n, j)
    }

    /// Distribution of the rank of `label` in `tree`
    pub fn rank_distribution(
        &mut self,
        tree: &Tree,
        label: Label,
    ) -> Result<RankDistribution, RankError> {
        self.check(tree)?;
        let path = tree::descendant_path(tree, label)?;
        self.distribution_from_path(&path)
    }

    /// Distribution for an already extracted descendant path
    pub fn distribution_from_path(
        &mut self,
        path: &DescendantPath,
    ) -> Result<RankDistribution, RankError> {
        rank::distribution_from_path(&mut self.cache, path, self.config.sum_tolerance)
    }

    /// `(mean, variance)` of the rank of `label`
    pub fn expected_rank(&mut self, tree: &Tree, label: Label) -> Result<(f64, f64), RankError> {
        Ok(self.rank_distribution(tree, label)?.moments())
    }

    /// Probability that `u` precedes `v` (the rank of `v` lies below that of `u`)
    ///
    /// 1.0 if `u` is an ancestor of `v` (or `u == v`), 0.0 if `v` is an
    /// ancestor of `u`.
    pub fn compare(&mut self, tree: &Tree, u: Label, v: Label) -> Result<f64, RankError> {
        self.check(tree)?;
        let split = tree::split_at_lca(tree, u, v)?;
        debug!(u, v, lca = ?split.lca.label(), relation = ?split.relation, "lca split");

        match split.relation {
            Relation::UAncestor => Ok(1.0),
            Relation::VAncestor => Ok(0.0),
            Relation::Incomparable => {
                let x = self.distribution_from_path(&tree::descendant_path(split.u_side, u)?)?;
                let y = self.distribution_from_path(&tree::descendant_path(split.v_side, v)?)?;
                Ok(rank::precedence_probability(
                    &mut self.cache,
                    &x,
                    &y,
                    split.u_side.internal_count(),
                    split.v_side.internal_count(),
                ))
            }
        }
    }

    /// [`RankEngine::rank_distribution`] through a prebuilt index
    pub fn rank_distribution_indexed(
        &mut self,
        index: &TreeIndex,
        label: Label,
    ) -> Result<RankDistribution, RankError> {
        let path = index.descendant_path(label)?;
        self.distribution_from_path(&path)
    }

    /// [`RankEngine::compare`] through a prebuilt index
    pub fn compare_indexed(
        &mut self,
        index: &TreeIndex,
        u: Label,
        v: Label,
    ) -> Result<f64, RankError> {
        let split = index.split_at_lca(u, v)?;
        let (u_side, v_side) = match (split.relation, split.u_side, split.v_side) {
            (Relation::UAncestor, _, _) => return Ok(1.0),
            (Relation::VAncestor, _, _) => return Ok(0.0),
            (Relation::Incomparable, Some(u_side), Some(v_side)) => (u_side, v_side),
            (Relation::Incomparable, _, _) => {
                return Err(RankError::InvalidTree(format!(
                    "split of {u} and {v} below {} is missing a side",
                    split.lca
                )))
            }
        };

        let x = self.distribution_from_path(&index.descendant_path_within(u, u_side)?)?;
        let y = self.distribution_from_path(&index.descendant_path_within(v, v_side)?)?;
        Ok(rank::precedence_probability(
            &mut self.cache,
            &x,
            &y,
            index.internal_count(u_side)?,
            index.internal_count(v_side)?,
        ))
    }

    /// Mean and variance of the rank of every internal vertex, in preorder
    pub fn rank_summary(&mut self, index: &TreeIndex) -> Result<Vec<RankSummary>, RankError> {
        let mut summary = Vec::with_capacity(index.len());
        for label in index.labels() {
            let (mean, variance) = self.rank_distribution_indexed(index, label)?.moments();
            summary.push(RankSummary {
                label,
                depth: index.depth(label)?,
                mean,
                variance,
            });
        }
        Ok(summary)
    }

    /// Exact number of labeled histories of `tree`
    pub fn history_count(&self, tree: &Tree) -> Result<u128, RankError> {
        self.check(tree)?;
        combinatorics::history_count(tree)
    }

    fn check(&self, tree: &Tree) -> Result<(), RankError> {
        if self.config.validate_trees {
            tree.validate()?;
        }
        Ok(())
    }
}

/// Rank distribution of `label` with a fresh engine
pub fn rank_distribution(tree: &Tree, label: Label) -> Result<RankDistribution, RankError> {
    RankEngine::default().rank_distribution(tree, label)
}

/// `(mean, variance)` of the rank of `label` with a fresh engine
pub fn expected_rank(tree: &Tree, label: Label) -> Result<(f64, f64), RankError> {
    RankEngine::default().expected_rank(tree, label)
}

/// Probability that `u` precedes `v`, with a fresh engine
pub fn compare(tree: &Tree, u: Label, v: Label) -> Result<f64, RankError> {
    RankEngine::default().compare(tree, u, v)
}
