//! Pairwise precedence across an LCA split
//!
//! Below the LCA, the `u_size` vertices of Tu and the `v_size` vertices of Tv
//! are ordered independently and then interleaved uniformly. With `v` at
//! local rank i and j vertices of Tu placed before it, the interleaving
//! count is C(i-1+j, j) · C(v_size-i+u_size-j, u_size-j) out of
//! C(u_size+v_size, v_size); `u` precedes `v` when its local rank is ≤ j.

use crate::combinatorics::BinomialCache;

use super::RankDistribution;

/// P(u precedes v) given the local distributions on either side of the LCA
///
/// `x` is the distribution of `u` within Tu (`u_size` internal vertices),
/// `y` that of `v` within Tv (`v_size` internal vertices).
pub fn precedence_probability(
    cache: &mut BinomialCache,
    x: &RankDistribution,
    y: &RankDistribution,
    u_size: usize,
    v_size: usize,
) -> f64 {
    // xcum[j] = P(rank_u ≤ j), x zero-padded to u_size + 2 entries
    let xcum = x.cumulative(u_size + 2);
    let ln_total = cache.ln_nchoose(u_size + v_size, v_size);

    let mut probability = 0.0;
    for (i, yi) in y.iter() {
        if i == 0 {
            continue;
        }
        for (j, &below) in xcum.iter().enumerate().take(u_size + 1).skip(1) {
            if below <= 0.0 {
                continue;
            }
            let Some(rest) = (v_size + u_size).checked_sub(i + j) else {
                continue;
            };
            let ln_ways =
                cache.ln_nchoose(i - 1 + j, j) + cache.ln_nchoose(rest, u_size - j) - ln_total;
            probability += yi * below * ln_ways.exp();
        }
    }

    probability.clamp(0.0, 1.0)
}
