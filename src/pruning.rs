//! Cost-complexity pruning.
//!
//! The weakest-link machinery that turns an oversized tree into its
//! pruning path, and the prune-at-parameter operation consumers use to
//! extract the subtree a selected complexity parameter implies.
use crate::constants::CP_TIE_EPS;
use crate::errors::CartError;
use crate::tree::tree::Tree;
use crate::utils::validate_positive_float_parameter;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// One node of the cost-complexity pruning path: the subtree reached at
/// a given complexity parameter, with its cross-validated error estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSubtree {
    /// Penalty per leaf at which this subtree becomes optimal.
    pub complexity_parameter: f64,
    /// Number of terminal leaves remaining at this complexity level.
    pub tree_size: usize,
    /// Cross-validated estimate of prediction error at this complexity level.
    pub estimated_error: f64,
    /// Standard error of the estimate.
    pub error_std_error: f64,
}

/// The ordered pruning path of an oversized tree: largest subtree first,
/// root-only subtree last. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PruningPath {
    candidates: Vec<CandidateSubtree>,
}

impl PruningPath {
    /// Build a path from candidate records, normalizing to the canonical
    /// order of decreasing tree size. Candidates may be supplied in either
    /// monotone orientation; anything unordered is rejected.
    pub fn new(mut candidates: Vec<CandidateSubtree>) -> Result<Self, CartError> {
        if candidates.len() > 1 && candidates[0].tree_size < candidates[candidates.len() - 1].tree_size {
            candidates.reverse();
        }
        for c in &candidates {
            if !(c.complexity_parameter >= 0.0) {
                return Err(CartError::InvalidParameter(
                    "complexity_parameter".to_string(),
                    "non-negative real value".to_string(),
                    c.complexity_parameter.to_string(),
                ));
            }
            if c.tree_size == 0 {
                return Err(CartError::InvalidParameter(
                    "tree_size".to_string(),
                    "positive leaf count".to_string(),
                    c.tree_size.to_string(),
                ));
            }
        }
        for w in candidates.windows(2) {
            if w[1].tree_size >= w[0].tree_size || w[1].complexity_parameter < w[0].complexity_parameter {
                return Err(CartError::InvalidParameter(
                    "pruning_path".to_string(),
                    "candidates ordered by decreasing tree size and non-decreasing complexity".to_string(),
                    format!(
                        "size {} at cp {} after size {} at cp {}",
                        w[1].tree_size, w[1].complexity_parameter, w[0].tree_size, w[0].complexity_parameter
                    ),
                ));
            }
        }
        Ok(PruningPath { candidates })
    }

    pub fn candidates(&self) -> &[CandidateSubtree] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateSubtree> {
        self.candidates.iter()
    }

    /// The largest complexity parameter on the path.
    pub fn max_complexity(&self) -> Option<f64> {
        self.candidates.last().map(|c| c.complexity_parameter)
    }
}

impl Display for PruningPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{:>12} {:>6} {:>10} {:>10}", "CP", "size", "xerror", "xstd")?;
        for c in &self.candidates {
            writeln!(
                f,
                "{:>12.6} {:>6} {:>10.6} {:>10.6}",
                c.complexity_parameter, c.tree_size, c.estimated_error, c.error_std_error
            )?;
        }
        Ok(())
    }
}

/// The (complexity parameter, tree size) sequence of an oversized tree,
/// computed by repeatedly collapsing its weakest links. First entry is
/// the full tree at parameter zero, last entry the root-only tree.
pub fn complexity_sequence(tree: &Tree) -> Vec<(f64, usize)> {
    let mut t = tree.clone();
    let mut seq: Vec<(f64, usize)> = vec![(0.0, t.n_leaves)];
    let mut last_alpha = 0.0;

    while t.n_leaves > 1 {
        let (idx, g) = t.weakest_link().expect("a tree with more than one leaf has an internal node");
        // The weakest-link values are non-decreasing across steps, clamp
        // away floating point noise.
        let alpha = g.max(last_alpha);
        t.collapse(idx);
        // Collapse every link tied at this level in the same step,
        // including ancestors whose link value fell to it.
        while let Some((idx2, g2)) = t.weakest_link() {
            if g2 <= alpha + CP_TIE_EPS {
                t.collapse(idx2);
            } else {
                break;
            }
        }
        t.refresh_stats();

        if alpha - last_alpha <= CP_TIE_EPS {
            // Same complexity level as the previous record, keep the
            // smaller subtree.
            if let Some(last) = seq.last_mut() {
                last.1 = t.n_leaves;
            }
        } else {
            seq.push((alpha, t.n_leaves));
        }
        last_alpha = alpha;
    }
    seq
}

impl Tree {
    /// Total leaf risk and leaf count of the subtree rooted at `idx`.
    pub(crate) fn subtree_stats(&self, idx: usize) -> (f64, usize) {
        let mut risk = 0.0;
        let mut leaves = 0;
        let mut stack = vec![idx];
        while let Some(i) = stack.pop() {
            let node = &self.nodes[&i];
            if node.is_leaf {
                risk += node.risk;
                leaves += 1;
            } else {
                stack.push(node.left_child);
                stack.push(node.right_child);
            }
        }
        (risk, leaves)
    }

    /// The internal node whose collapse costs the least error increase
    /// per removed leaf, with its link value
    /// `g(t) = (R(t) - R(T_t)) / (|T_t| - 1)`.
    /// Ties resolve to the smallest node index.
    pub(crate) fn weakest_link(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for idx in self.internal_indices() {
            let node = &self.nodes[&idx];
            let (subtree_risk, subtree_leaves) = self.subtree_stats(idx);
            let g = ((node.risk - subtree_risk) / (subtree_leaves as f64 - 1.0)).max(0.0);
            match best {
                Some((_, best_g)) if g >= best_g => {}
                _ => best = Some((idx, g)),
            }
        }
        best
    }

    /// Turn the node at `idx` into a leaf, discarding its subtree.
    pub(crate) fn collapse(&mut self, idx: usize) {
        let (left, right) = {
            let node = &self.nodes[&idx];
            (node.left_child, node.right_child)
        };
        let mut stack = vec![left, right];
        while let Some(i) = stack.pop() {
            if let Some(n) = self.nodes.remove(&i) {
                if !n.is_leaf {
                    stack.push(n.left_child);
                    stack.push(n.right_child);
                }
            }
        }
        if let Some(n) = self.nodes.get_mut(&idx) {
            n.is_leaf = true;
        }
    }

    /// Collapse every weakest link whose value does not exceed `cp`.
    /// No range validation, callers that accept external parameters go
    /// through [`Tree::prune_at`].
    pub(crate) fn pruned(&self, cp: f64) -> Tree {
        let mut t = self.clone();
        while let Some((idx, g)) = t.weakest_link() {
            if g <= cp + CP_TIE_EPS {
                t.collapse(idx);
            } else {
                break;
            }
        }
        t.refresh_stats();
        t
    }

    /// The largest complexity parameter defined for this tree, the level
    /// at which it collapses to its root.
    pub fn max_complexity(&self) -> f64 {
        complexity_sequence(self).last().map(|r| r.0).unwrap_or(0.0)
    }

    /// Prune the tree at the given complexity parameter, returning a new
    /// independent tree. The parameter must be non-negative and must not
    /// exceed the largest parameter on the tree's pruning path.
    ///
    /// Pruning is idempotent at a fixed parameter, and monotone: a larger
    /// parameter never yields a larger tree.
    pub fn prune_at(&self, cp: f64) -> Result<Tree, CartError> {
        validate_positive_float_parameter(cp, "complexity_parameter")?;
        let ceiling = self.max_complexity();
        if cp > ceiling {
            return Err(CartError::InvalidParameter(
                "complexity_parameter".to_string(),
                format!("value within the tree's pruning path, at most {}", ceiling),
                cp.to_string(),
            ));
        }
        Ok(self.pruned(cp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Matrix;
    use crate::grower::GrowPolicy;
    use crate::metric::Task;
    use crate::splitter::Splitter;

    fn splitter() -> Splitter {
        Splitter {
            task: Task::Regression,
            min_samples_split: 2,
            min_samples_leaf: 1,
            min_impurity_decrease: 0.0,
            max_depth: 16,
        }
    }

    /// Four pure blocks of four records each, so the full tree has
    /// exactly four leaves and hand-checkable link values.
    fn block_tree() -> (Vec<f64>, Vec<f64>, Tree) {
        let x: Vec<f64> = (0..16).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..16)
            .map(|i| match i / 4 {
                0 => 1.0,
                1 => 2.0,
                2 => 8.0,
                _ => 12.0,
            })
            .collect();
        let data = Matrix::new(&x, 16, 1);
        let mut tree = Tree::new();
        tree.fit(&data, data.index.to_owned(), &y, &splitter(), &GrowPolicy::DepthWise);
        (x, y, tree)
    }

    #[test]
    fn test_complexity_sequence() {
        let (_x, _y, tree) = block_tree();
        assert_eq!(tree.n_leaves, 4);

        let seq = complexity_sequence(&tree);
        let sizes: Vec<usize> = seq.iter().map(|r| r.1).collect();
        assert_eq!(sizes, vec![4, 3, 2, 1]);

        let alphas: Vec<f64> = seq.iter().map(|r| r.0).collect();
        assert_eq!(alphas[0], 0.0);
        // Hand-computed link values for the block data.
        assert!((alphas[1] - 0.125).abs() < 1e-9);
        assert!((alphas[2] - 2.0).abs() < 1e-9);
        assert!((alphas[3] - 18.0625).abs() < 1e-9);
        // Non-decreasing along the path.
        for w in alphas.windows(2) {
            assert!(w[0] <= w[1]);
        }
        assert!((tree.max_complexity() - 18.0625).abs() < 1e-9);
    }

    #[test]
    fn test_prune_at_sizes() {
        let (_x, _y, tree) = block_tree();
        assert_eq!(tree.prune_at(0.0).unwrap().n_leaves, 4);
        assert_eq!(tree.prune_at(1.0).unwrap().n_leaves, 3);
        assert_eq!(tree.prune_at(2.0).unwrap().n_leaves, 2);
        assert_eq!(tree.prune_at(5.0).unwrap().n_leaves, 2);
        assert_eq!(tree.prune_at(18.0625).unwrap().n_leaves, 1);
    }

    #[test]
    fn test_prune_at_idempotent() {
        let (_x, _y, tree) = block_tree();
        let once = tree.prune_at(2.0).unwrap();
        let twice = once.prune_at(2.0).unwrap();
        assert_eq!(once.n_leaves, twice.n_leaves);
        assert_eq!(once.leaf_indices(), twice.leaf_indices());
        assert_eq!(once.nodes.len(), twice.nodes.len());
    }

    #[test]
    fn test_prune_at_monotone() {
        let (_x, _y, tree) = block_tree();
        let seq = complexity_sequence(&tree);
        let max_cp = seq.last().unwrap().0;
        let mut last_size = usize::MAX;
        for step in 0..10 {
            let cp = max_cp * step as f64 / 9.0;
            let size = tree.prune_at(cp).unwrap().n_leaves;
            assert!(size <= last_size);
            last_size = size;
        }
        assert_eq!(last_size, 1);
    }

    #[test]
    fn test_prune_at_rejects_out_of_range() {
        let (_x, _y, tree) = block_tree();
        assert!(matches!(tree.prune_at(-1.0), Err(CartError::InvalidParameter(_, _, _))));
        assert!(matches!(tree.prune_at(f64::NAN), Err(CartError::InvalidParameter(_, _, _))));
        let too_big = tree.max_complexity() + 1.0;
        assert!(matches!(tree.prune_at(too_big), Err(CartError::InvalidParameter(_, _, _))));
    }

    #[test]
    fn test_pruned_tree_predicts() {
        let (x, y, tree) = block_tree();
        let data = Matrix::new(&x, 16, 1);
        let pruned = tree.prune_at(2.0).unwrap();
        // Two leaves left, low block vs high block.
        let preds = pruned.predict(&data, false);
        assert_eq!(preds[0], 1.5);
        assert_eq!(preds[15], 10.0);
        let err = pruned.evaluate(&data, &y).unwrap();
        assert!(err > 0.0);
        assert!(err < tree.prune_at(tree.max_complexity()).unwrap().evaluate(&data, &y).unwrap());
    }

    #[test]
    fn test_path_construction_and_ordering() {
        let path = PruningPath::new(vec![
            CandidateSubtree {
                complexity_parameter: 0.01,
                tree_size: 9,
                estimated_error: 0.24,
                error_std_error: 0.03,
            },
            CandidateSubtree {
                complexity_parameter: 0.1,
                tree_size: 4,
                estimated_error: 0.25,
                error_std_error: 0.03,
            },
            CandidateSubtree {
                complexity_parameter: 0.5,
                tree_size: 1,
                estimated_error: 0.40,
                error_std_error: 0.05,
            },
        ])
        .unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.candidates()[0].tree_size, 9);
        assert_eq!(path.max_complexity(), Some(0.5));
        println!("{}", path);

        // Reversed orientation is normalized to the same canonical order.
        let reversed = PruningPath::new(vec![
            CandidateSubtree {
                complexity_parameter: 0.5,
                tree_size: 1,
                estimated_error: 0.40,
                error_std_error: 0.05,
            },
            CandidateSubtree {
                complexity_parameter: 0.1,
                tree_size: 4,
                estimated_error: 0.25,
                error_std_error: 0.03,
            },
            CandidateSubtree {
                complexity_parameter: 0.01,
                tree_size: 9,
                estimated_error: 0.24,
                error_std_error: 0.03,
            },
        ])
        .unwrap();
        assert_eq!(reversed.candidates()[0].tree_size, 9);

        // Unordered candidates are rejected.
        let bad = PruningPath::new(vec![
            CandidateSubtree {
                complexity_parameter: 0.01,
                tree_size: 9,
                estimated_error: 0.24,
                error_std_error: 0.03,
            },
            CandidateSubtree {
                complexity_parameter: 0.5,
                tree_size: 1,
                estimated_error: 0.40,
                error_std_error: 0.05,
            },
            CandidateSubtree {
                complexity_parameter: 0.1,
                tree_size: 4,
                estimated_error: 0.25,
                error_std_error: 0.03,
            },
        ]);
        assert!(bad.is_err());

        // Negative complexity is rejected.
        let negative = PruningPath::new(vec![CandidateSubtree {
            complexity_parameter: -0.1,
            tree_size: 1,
            estimated_error: 0.4,
            error_std_error: 0.05,
        }]);
        assert!(matches!(negative, Err(CartError::InvalidParameter(_, _, _))));

        // An empty path is constructible, selection rejects it later.
        assert!(PruningPath::new(vec![]).unwrap().is_empty());
    }
}
