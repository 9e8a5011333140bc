//! Forward recurrence for the rank of one vertex
//!
//! Walking up the descendant path, each ancestor merges the current subtree
//! (mass L, target at rank i') with a sibling subtree (mass R) under a new
//! root. A target rank i in the merged order arises from rank i-j-1 when j
//! of the sibling's R vertices land above it:
//!
//!   rp_new[i] += rp_old[i-j-1] · C(L+R-(i-1), R-j) · C(i-2, j)
//!
//! Each level is evaluated in the log domain, shifted by its largest term,
//! and renormalized. That only rescales the level by a constant, which the
//! final normalization would remove anyway.

use tracing::{debug, trace, warn};

use crate::combinatorics::BinomialCache;
use crate::tree::DescendantPath;
use crate::RankError;

use super::moments::moments;

/// Probability of each rank; index 0 is always 0 and rank 1 is the root
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct RankDistribution {
    probabilities: Vec<f64>,
}

impl RankDistribution {
    /// The distribution of the root: rank 1 with certainty
    pub fn root() -> Self {
        Self {
            probabilities: vec![0.0, 1.0],
        }
    }

    /// Probabilities indexed by rank
    pub fn as_slice(&self) -> &[f64] {
        &self.probabilities
    }

    /// Probability of `rank` (0 beyond the support)
    pub fn probability(&self, rank: usize) -> f64 {
        self.probabilities.get(rank).copied().unwrap_or(0.0)
    }

    /// Length including the rank-0 placeholder
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// True if there is no entry at all
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Sum of all probabilities
    pub fn total(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// `(mean, variance)` of the rank
    pub fn moments(&self) -> (f64, f64) {
        moments(&self.probabilities)
    }

    /// Expected rank
    pub fn mean(&self) -> f64 {
        self.moments().0
    }

    /// Variance of the rank
    pub fn variance(&self) -> f64 {
        self.moments().1
    }

    /// `cdf[k]` = P(rank ≤ k), padded with ones up to `len`
    pub fn cumulative(&self, len: usize) -> Vec<f64> {
        let mut cdf = Vec::with_capacity(len.max(self.len()));
        let mut running = 0.0;
        for rank in 0..len.max(self.len()) {
            running += self.probability(rank);
            cdf.push(running);
        }
        cdf
    }

    /// `(rank, probability)` pairs with non-zero probability
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.probabilities
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, p)| *p > 0.0)
    }
}

impl AsRef<[f64]> for RankDistribution {
    fn as_ref(&self) -> &[f64] {
        &self.probabilities
    }
}

/// Run the recurrence over `path`
///
/// `tolerance` bounds how far the normalized sum may drift from 1 before a
/// warning is logged.
pub fn distribution_from_path(
    cache: &mut BinomialCache,
    path: &DescendantPath,
    tolerance: f64,
) -> Result<RankDistribution, RankError> {
    if path.is_empty() || path.own_size() == 0 {
        return Err(RankError::InvalidTree(
            "descendant path must start with a positive size".to_string(),
        ));
    }

    let mut left_mass = path.own_size();
    let mut start = 1usize;
    let mut end = 1usize;
    let mut rp = vec![0.0, 1.0];

    debug!(levels = path.len(), own = left_mass, "rank recurrence");

    for &right_mass in path.sibling_sizes() {
        let new_start = start + 1;
        let new_end = end + right_mass + 1;
        // Touch the largest factorial once so the inner loops never grow the table
        cache.ln_factorial(left_mass + right_mass + 1);

        let mut shift = f64::NEG_INFINITY;
        for i in new_start..=new_end {
            for j in split_range(i, end, right_mass) {
                if let Some(w) = log_term(cache, &rp, i, j, left_mass, right_mass) {
                    shift = shift.max(w);
                }
            }
        }
        if !shift.is_finite() {
            return Err(RankError::InvalidTree(format!(
                "no admissible rank after merging a sibling of size {right_mass}"
            )));
        }

        let mut next = vec![0.0; new_end + 1];
        for (i, slot) in next.iter_mut().enumerate().skip(new_start) {
            for j in split_range(i, end, right_mass) {
                if let Some(w) = log_term(cache, &rp, i, j, left_mass, right_mass) {
                    *slot += (w - shift).exp();
                }
            }
        }
        normalize(&mut next)?;

        trace!(left_mass, right_mass, new_end, "merged level");
        rp = next;
        start = new_start;
        end = new_end;
        left_mass += right_mass + 1;
    }

    normalize(&mut rp)?;

    let total: f64 = rp.iter().sum();
    if (total - 1.0).abs() > tolerance {
        warn!(total, tolerance, "rank distribution sum drifted");
    }

    Ok(RankDistribution { probabilities: rp })
}

/// Admissible counts `j` of sibling vertices placed above rank `i`
fn split_range(i: usize, end: usize, right_mass: usize) -> std::ops::RangeInclusive<usize> {
    let lo = (i - 1).saturating_sub(end);
    let hi = right_mass.min(i - 2);
    lo..=hi
}

/// ln(rp_old[i-j-1] · C(L+R-(i-1), R-j) · C(i-2, j)), `None` for a zero term
fn log_term(
    cache: &mut BinomialCache,
    rp: &[f64],
    i: usize,
    j: usize,
    left_mass: usize,
    right_mass: usize,
) -> Option<f64> {
    let prev = *rp.get(i - j - 1)?;
    if prev <= 0.0 {
        return None;
    }
    let below = (left_mass + right_mass + 1).checked_sub(i)?;
    let w = prev.ln() + cache.ln_nchoose(below, right_mass - j) + cache.ln_nchoose(i - 2, j);
    w.is_finite().then_some(w)
}

fn normalize(weights: &mut [f64]) -> Result<(), RankError> {
    let total: f64 = weights.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(RankError::InvalidTree(format!(
            "rank weights sum to {total}"
        )));
    }
    for w in weights.iter_mut() {
        *w /= total;
    }
    Ok(())
}
