#![allow(dead_code)]

use std::collections::HashMap;

use proptest::sample::Index;
use rankprob::{Label, Tree};

pub fn cherry(label: Label) -> Tree {
    Tree::internal(label, Tree::leaf(), Tree::leaf())
}

/// (((,)4,)3,(,)5)2
pub fn sample_subtree() -> Tree {
    let t1 = Tree::internal(3, cherry(4), Tree::leaf());
    Tree::internal(2, t1, cherry(5))
}

/// (((,)7,(,)8)6,(((,)4,)3,(,)5)2)1
pub fn sample_tree() -> Tree {
    let t2 = Tree::internal(6, cherry(7), cherry(8));
    Tree::internal(1, t2, sample_subtree())
}

/// Caterpillar with internal labels 1..=n, root = 1
pub fn caterpillar(n: Label) -> Tree {
    let mut tree = cherry(n);
    for label in (1..n).rev() {
        tree = Tree::internal(label, tree, Tree::leaf());
    }
    tree
}

/// Join forest members pairwise as directed by `merges`; labels count up
/// from 1 so the root carries the largest label.
pub fn tree_from_merges(merges: &[(Index, Index)]) -> Tree {
    let mut forest: Vec<Tree> = (0..=merges.len()).map(|_| Tree::leaf()).collect();
    let mut next_label: Label = 1;

    for (a, b) in merges {
        if forest.len() < 2 {
            break;
        }
        let left = forest.swap_remove(a.index(forest.len()));
        let right = forest.swap_remove(b.index(forest.len()));
        forest.push(Tree::internal(next_label, left, right));
        next_label += 1;
    }

    forest.pop().unwrap_or_default()
}

/// Parent label of every internal vertex (`None` for the root)
pub fn parents(tree: &Tree) -> HashMap<Label, Option<Label>> {
    let mut map = HashMap::new();
    let mut stack = vec![(tree, None)];
    while let Some((node, parent)) = stack.pop() {
        if let (Some(label), Some((left, right))) = (node.label(), node.children()) {
            map.insert(label, parent);
            stack.push((left, Some(label)));
            stack.push((right, Some(label)));
        }
    }
    map
}

/// Every labeled history as label → rank (1-based)
pub fn labeled_histories(tree: &Tree) -> Vec<HashMap<Label, usize>> {
    let parents = parents(tree);
    let mut labels: Vec<Label> = parents.keys().copied().collect();
    labels.sort_unstable();

    let mut out = Vec::new();
    let mut order = Vec::with_capacity(labels.len());
    extend_histories(&parents, &labels, &mut order, &mut out);
    out
}

fn extend_histories(
    parents: &HashMap<Label, Option<Label>>,
    labels: &[Label],
    order: &mut Vec<Label>,
    out: &mut Vec<HashMap<Label, usize>>,
) {
    if order.len() == labels.len() {
        out.push(
            order
                .iter()
                .enumerate()
                .map(|(pos, &label)| (label, pos + 1))
                .collect(),
        );
        return;
    }
    for &label in labels {
        if order.contains(&label) {
            continue;
        }
        let ready = match parents[&label] {
            None => true,
            Some(parent) => order.contains(&parent),
        };
        if ready {
            order.push(label);
            extend_histories(parents, labels, order, out);
            order.pop();
        }
    }
}

/// Rank distribution by enumeration
pub fn brute_force_distribution(tree: &Tree, label: Label) -> Vec<f64> {
    let histories = labeled_histories(tree);
    let mut dist = vec![0.0; tree.internal_count() + 1];
    let weight = 1.0 / histories.len() as f64;
    for history in &histories {
        dist[history[&label]] += weight;
    }
    dist
}

/// (histories with `u` before `v`, all histories)
pub fn brute_force_precedence(tree: &Tree, u: Label, v: Label) -> (u128, u128) {
    let histories = labeled_histories(tree);
    let before = histories.iter().filter(|h| h[&u] < h[&v]).count();
    (before as u128, histories.len() as u128)
}
