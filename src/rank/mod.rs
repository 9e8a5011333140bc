//! Rank statistics under the labeled-history model
//!
//! - distribution: forward recurrence along a descendant path
//! - moments: mean and variance
//! - compare: precedence of two vertices across their LCA

mod compare;
mod distribution;
mod moments;

pub use compare::precedence_probability;
pub use distribution::{distribution_from_path, RankDistribution};
pub use moments::{moments, RankSummary};
