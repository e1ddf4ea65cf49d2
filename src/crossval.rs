//! Cross-validation of the pruning path.
//!
//! Grows one tree per fold, prunes each fold tree along the master
//! tree's complexity sequence, and scores the held-out records to
//! attach an error estimate and standard error to every candidate
//! subtree on the path.
use crate::data::Matrix;
use crate::errors::CartError;
use crate::grower::GrowPolicy;
use crate::metric::Task;
use crate::pruning::{complexity_sequence, CandidateSubtree, PruningPath};
use crate::splitter::Splitter;
use crate::tree::tree::Tree;
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

/// Assign each row to one of `n_folds` held-out sets, shuffled by `seed`.
/// Fold sizes differ by at most one row.
pub fn kfold_indices(n_rows: usize, n_folds: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut rows: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    rows.shuffle(&mut rng);
    let mut folds = vec![Vec::new(); n_folds];
    for (i, row) in rows.into_iter().enumerate() {
        folds[i % n_folds].push(row);
    }
    folds
}

/// The complexity parameter used to score a path interval: the geometric
/// mean of adjacent master parameters, so fold trees prune to the level
/// the interval represents rather than to one of its endpoints.
fn typical_parameters(master: &[(f64, usize)]) -> Vec<f64> {
    let m = master.len();
    master
        .iter()
        .enumerate()
        .map(|(i, record)| {
            if i + 1 < m {
                (record.0 * master[i + 1].0).sqrt()
            } else {
                record.0
            }
        })
        .collect()
}

fn holdout_loss(task: &Task, y: f64, yhat: f64) -> f64 {
    match task {
        Task::Regression => (y - yhat) * (y - yhat),
        Task::Classification => {
            if y == yhat {
                0.0
            } else {
                1.0
            }
        }
    }
}

/// Cross-validate the master complexity sequence, returning the pruning
/// path with per-candidate error estimates. Folds are scored in
/// parallel; callers only observe the assembled path.
pub fn cross_validated_path(
    data: &Matrix<f64>,
    y: &[f64],
    splitter: &Splitter,
    grow_policy: &GrowPolicy,
    master: &[(f64, usize)],
    n_folds: usize,
    seed: u64,
) -> Result<PruningPath, CartError> {
    let n = data.rows;
    if n_folds < 2 || n_folds > n {
        return Err(CartError::InvalidParameter(
            "n_folds".to_string(),
            format!("integer between 2 and the number of records ({})", n),
            n_folds.to_string(),
        ));
    }

    let typical = typical_parameters(master);
    let folds = kfold_indices(n, n_folds, seed);

    let per_fold: Vec<Vec<Vec<f64>>> = folds
        .par_iter()
        .map(|holdout| {
            let mut in_holdout = vec![false; n];
            for &row in holdout {
                in_holdout[row] = true;
            }
            let train: Vec<usize> = (0..n).filter(|&i| !in_holdout[i]).collect();

            let mut fold_tree = Tree::new();
            fold_tree.fit(data, train, y, splitter, grow_policy);

            // Pruning is nested, so each level starts from the previous
            // pruned tree instead of the full fold tree.
            let mut losses: Vec<Vec<f64>> = vec![Vec::with_capacity(holdout.len()); typical.len()];
            let mut pruned = fold_tree;
            for (k, cp) in typical.iter().enumerate() {
                pruned = pruned.pruned(*cp);
                for &row in holdout {
                    let yhat = pruned.predict_row(data, row);
                    losses[k].push(holdout_loss(&splitter.task, y[row], yhat));
                }
            }
            losses
        })
        .collect();

    let mut candidates = Vec::with_capacity(master.len());
    for (k, record) in master.iter().enumerate() {
        let mut losses: Vec<f64> = Vec::with_capacity(n);
        for fold in &per_fold {
            losses.extend_from_slice(&fold[k]);
        }
        let nf = losses.len() as f64;
        let mean = losses.iter().sum::<f64>() / nf;
        let std_error = if losses.len() > 1 {
            let var = losses.iter().map(|l| (l - mean) * (l - mean)).sum::<f64>() / (nf - 1.0);
            (var / nf).sqrt()
        } else {
            0.0
        };
        candidates.push(CandidateSubtree {
            complexity_parameter: record.0,
            tree_size: record.1,
            estimated_error: mean,
            error_std_error: std_error,
        });
    }
    PruningPath::new(candidates)
}

/// Grow an intentionally oversized tree on the full training data and
/// cross-validate its pruning path. This is the single entry point that
/// produces the `(tree, path)` pair consumed by selection and pruning.
pub fn grow_oversized_tree(
    data: &Matrix<f64>,
    y: &[f64],
    splitter: &Splitter,
    grow_policy: &GrowPolicy,
    n_folds: usize,
    seed: u64,
) -> Result<(Tree, PruningPath), CartError> {
    if data.rows == 0 || y.len() != data.rows {
        return Err(CartError::SchemaMismatch(
            format!("{} target records", data.rows),
            format!("{} target records", y.len()),
        ));
    }

    let mut tree = Tree::new();
    tree.fit(data, data.index.to_owned(), y, splitter, grow_policy);
    let master = complexity_sequence(&tree);
    let path = cross_validated_path(data, y, splitter, grow_policy, &master, n_folds, seed)?;
    info!(
        "Grew oversized tree with {} leaves at depth {}, pruning path has {} candidates.",
        tree.n_leaves,
        tree.depth,
        path.len()
    );
    Ok((tree, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{select_optimal_complexity, TieBreak};

    fn splitter() -> Splitter {
        Splitter {
            task: Task::Regression,
            min_samples_split: 4,
            min_samples_leaf: 2,
            min_impurity_decrease: 0.0,
            max_depth: 12,
        }
    }

    /// Stepwise target over one informative feature and one noise feature.
    fn synthetic() -> (Vec<f64>, Vec<f64>) {
        let n = 60;
        let mut flat = Vec::with_capacity(n * 2);
        // Informative column.
        for i in 0..n {
            flat.push(i as f64 / n as f64);
        }
        // Pseudo-noise column, deterministic but uncorrelated with y.
        for i in 0..n {
            flat.push(((i * 37) % n) as f64 / n as f64);
        }
        let y: Vec<f64> = (0..n)
            .map(|i| {
                let x = i as f64 / n as f64;
                let base = if x < 0.5 { 10.0 } else { 20.0 };
                base + ((i * 7) % 5) as f64 * 0.1
            })
            .collect();
        (flat, y)
    }

    #[test]
    fn test_kfold_partition() {
        let folds = kfold_indices(23, 5, 42);
        assert_eq!(folds.len(), 5);
        let mut seen: Vec<usize> = folds.iter().flatten().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..23).collect::<Vec<usize>>());
        for fold in &folds {
            assert!(fold.len() == 4 || fold.len() == 5);
        }
        // Same seed reproduces the same folds.
        assert_eq!(folds, kfold_indices(23, 5, 42));
        assert_ne!(folds, kfold_indices(23, 5, 43));
    }

    #[test]
    fn test_typical_parameters() {
        let master = vec![(0.0, 9), (0.04, 4), (0.16, 2), (0.64, 1)];
        let typical = typical_parameters(&master);
        assert_eq!(typical[0], 0.0);
        assert!((typical[1] - 0.08).abs() < 1e-12);
        assert!((typical[2] - 0.32).abs() < 1e-12);
        assert_eq!(typical[3], 0.64);
    }

    #[test]
    fn test_grow_oversized_tree_path() {
        let (flat, y) = synthetic();
        let data = Matrix::new(&flat, 60, 2);
        let (tree, path) = grow_oversized_tree(&data, &y, &splitter(), &GrowPolicy::DepthWise, 5, 7).unwrap();

        assert!(tree.n_leaves > 2);
        assert!(!path.is_empty());
        // First candidate is the full tree, last is the root-only tree.
        assert_eq!(path.candidates()[0].tree_size, tree.n_leaves);
        assert_eq!(path.candidates().last().unwrap().tree_size, 1);
        for c in path.iter() {
            assert!(c.estimated_error >= 0.0);
            assert!(c.error_std_error >= 0.0);
        }

        // The selected parameter prunes to a tree that beats the stump
        // on the training step structure.
        let cp = select_optimal_complexity(&path, TieBreak::SmallestTree).unwrap();
        assert!(path.iter().any(|c| c.complexity_parameter == cp));
        let pruned = tree.prune_at(cp).unwrap();
        assert!(pruned.n_leaves >= 2);
        let stump_err = path.candidates().last().unwrap().estimated_error;
        let chosen = path.iter().find(|c| c.complexity_parameter == cp).unwrap();
        assert!(chosen.estimated_error <= stump_err);
    }

    #[test]
    fn test_classification_path() {
        let n = 40;
        let flat: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..n).map(|i| if i < 25 { 0.0 } else { 1.0 }).collect();
        let data = Matrix::new(&flat, n, 1);
        let mut s = splitter();
        s.task = Task::Classification;
        let (tree, path) = grow_oversized_tree(&data, &y, &s, &GrowPolicy::DepthWise, 4, 3).unwrap();
        assert!(tree.n_leaves >= 2);
        for c in path.iter() {
            assert!(c.estimated_error >= 0.0);
            assert!(c.estimated_error <= 1.0);
        }
    }

    #[test]
    fn test_bad_fold_counts() {
        let (flat, y) = synthetic();
        let data = Matrix::new(&flat, 60, 2);
        let master = vec![(0.0, 3), (0.5, 1)];
        for n_folds in [0, 1, 61] {
            let res = cross_validated_path(&data, &y, &splitter(), &GrowPolicy::DepthWise, &master, n_folds, 0);
            assert!(matches!(res, Err(CartError::InvalidParameter(_, _, _))));
        }
    }

    #[test]
    fn test_target_length_mismatch() {
        let (flat, _) = synthetic();
        let data = Matrix::new(&flat, 60, 2);
        let y_short = vec![1.0; 10];
        let res = grow_oversized_tree(&data, &y_short, &splitter(), &GrowPolicy::DepthWise, 5, 0);
        assert!(matches!(res, Err(CartError::SchemaMismatch(_, _))));
    }
}
