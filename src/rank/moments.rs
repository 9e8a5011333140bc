//! Mean and variance of a rank distribution

use crate::tree::Label;

/// `(mean, variance)` of a distribution indexed by rank
///
/// mean = Σ i·p[i], variance = Σ i²·p[i] − mean². Rounding can push the
/// variance of a point mass a hair below zero; it is clamped to 0.
pub fn moments(probabilities: &[f64]) -> (f64, f64) {
    let (mean, second) = probabilities
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(mean, second), (rank, &p)| {
            let r = rank as f64;
            (mean + r * p, second + r * r * p)
        });
    (mean, (second - mean * mean).max(0.0))
}

/// Rank statistics of one internal vertex
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct RankSummary {
    /// Vertex label
    pub label: Label,
    /// Distance from the root (root = 0)
    pub depth: usize,
    /// Expected rank
    pub mean: f64,
    /// Variance of the rank
    pub variance: f64,
}
