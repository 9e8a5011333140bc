use approx::abs_diff_eq;
use proptest::prelude::*;
use proptest::sample::Index;
use rankprob::combinatorics::gcd_divide;
use rankprob::{split_at_lca, RankEngine, Relation, TreeIndex};

mod common;
use common::*;

fn merges(max_leaves: usize) -> impl Strategy<Value = Vec<(Index, Index)>> {
    (2..=max_leaves).prop_flat_map(|leaves| {
        proptest::collection::vec((any::<Index>(), any::<Index>()), leaves - 1)
    })
}

proptest! {
    #[test]
    fn distributions_sum_to_one(plan in merges(40)) {
        let tree = tree_from_merges(&plan);
        let mut engine = RankEngine::default();
        for label in tree.labels() {
            let dist = engine.rank_distribution(&tree, label).expect("label exists");
            prop_assert!(abs_diff_eq!(dist.total(), 1.0, epsilon = 1e-9), "sum {}", dist.total());
            prop_assert_eq!(dist.probability(0), 0.0);
            prop_assert!(dist.as_slice().iter().all(|p| *p >= 0.0));

            let (mean, variance) = dist.moments();
            prop_assert!(variance >= 0.0);
            prop_assert!(mean >= 1.0 && mean <= tree.internal_count() as f64 + 1e-9);
        }
    }

    #[test]
    fn root_always_has_rank_one(plan in merges(40)) {
        let tree = tree_from_merges(&plan);
        let root = tree.label().expect("at least one internal vertex");
        let dist = rankprob::rank_distribution(&tree, root).expect("root exists");
        prop_assert_eq!(dist.as_slice(), &[0.0, 1.0][..]);
    }

    #[test]
    fn precedence_is_consistent(plan in merges(16)) {
        let tree = tree_from_merges(&plan);
        let mut engine = RankEngine::default();
        let labels = tree.labels();
        for &u in &labels {
            for &v in &labels {
                let p = engine.compare(&tree, u, v).expect("labels exist");
                prop_assert!((0.0..=1.0).contains(&p));

                match split_at_lca(&tree, u, v).expect("labels exist").relation {
                    Relation::UAncestor => prop_assert_eq!(p, 1.0),
                    Relation::VAncestor => prop_assert_eq!(p, 0.0),
                    Relation::Incomparable => {
                        let q = engine.compare(&tree, v, u).expect("labels exist");
                        prop_assert!(abs_diff_eq!(p + q, 1.0, epsilon = 1e-9), "{} + {}", p, q);
                    }
                }
            }
        }
    }

    #[test]
    fn indexed_and_direct_agree(plan in merges(24)) {
        let tree = tree_from_merges(&plan);
        let index = TreeIndex::build(&tree).expect("generated trees are valid");
        let mut engine = RankEngine::default();
        let labels = tree.labels();
        for &u in &labels {
            prop_assert_eq!(
                engine.rank_distribution_indexed(&index, u).expect("label exists"),
                engine.rank_distribution(&tree, u).expect("label exists")
            );
        }
        for pair in labels.windows(2) {
            let direct = engine.compare(&tree, pair[0], pair[1]).expect("labels exist");
            let indexed = engine.compare_indexed(&index, pair[0], pair[1]).expect("labels exist");
            prop_assert!(abs_diff_eq!(direct, indexed, epsilon = 1e-15));
        }
    }

    #[test]
    fn small_trees_match_enumeration(plan in merges(7)) {
        let tree = tree_from_merges(&plan);
        let mut engine = RankEngine::default();
        let labels = tree.labels();

        let histories = labeled_histories(&tree).len() as u128;
        prop_assert_eq!(engine.history_count(&tree).expect("fits"), histories);

        for &u in &labels {
            let dist = engine.rank_distribution(&tree, u).expect("label exists");
            let expected = brute_force_distribution(&tree, u);
            for (rank, want) in expected.iter().enumerate() {
                prop_assert!(abs_diff_eq!(dist.probability(rank), *want, epsilon = 1e-9));
            }
            for &v in &labels {
                if u == v {
                    continue;
                }
                let (before, total) = brute_force_precedence(&tree, u, v);
                let p = engine.compare(&tree, u, v).expect("labels exist");
                prop_assert!(abs_diff_eq!(p, gcd_divide(before, total), epsilon = 1e-9));
            }
        }
    }

    #[test]
    fn binomial_boundaries(n in 0usize..200, j in 0usize..200) {
        let mut engine = RankEngine::default();
        if j > n {
            prop_assert_eq!(engine.nchoose(n, j), 0.0);
        }
        prop_assert_eq!(engine.nchoose(n, 0), 1.0);
        prop_assert_eq!(engine.nchoose(n, n), 1.0);
    }
}
