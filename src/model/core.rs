use crate::crossval::grow_oversized_tree;
use crate::data::Matrix;
use crate::errors::CartError;
use crate::model::config::{ModelIO, TreeConfig};
use crate::pruning::PruningPath;
use crate::selector::select_optimal_complexity;
use crate::tree::tree::Tree;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A CART tree estimator: grows an oversized tree, cross-validates its
/// cost-complexity pruning path, and prunes back to the complexity
/// parameter the configured policy selects.
#[derive(Clone, Serialize, Deserialize)]
pub struct CartTree {
    pub cfg: TreeConfig,
    pub tree: Tree,
    /// Cross-validated pruning path of the oversized tree. Present
    /// between fitting and pruning, dropped once a subtree is extracted.
    pub path: Option<PruningPath>,
    pub metadata: HashMap<String, String>,
}

impl Default for CartTree {
    fn default() -> Self {
        CartTree {
            cfg: TreeConfig::default(),
            tree: Tree::new(),
            path: None,
            metadata: HashMap::new(),
        }
    }
}

impl CartTree {
    /// Create a new tree estimator from a configuration.
    pub fn new(cfg: TreeConfig) -> Self {
        CartTree {
            cfg,
            ..Default::default()
        }
    }

    /// Fit the oversized tree and cross-validate its pruning path.
    ///
    /// * `data` - Feature matrix, one column per feature.
    /// * `y` - Response, one record per matrix row.
    pub fn fit(&mut self, data: &Matrix<f64>, y: &[f64]) -> Result<(), CartError> {
        self.cfg.validate()?;
        let splitter = self.cfg.splitter();

        let (tree, path) = match self.cfg.num_threads {
            Some(num_threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .map_err(|e| {
                        CartError::InvalidParameter("num_threads".to_string(), "buildable thread pool".to_string(), e.to_string())
                    })?;
                pool.install(|| {
                    grow_oversized_tree(data, y, &splitter, &self.cfg.grow_policy, self.cfg.n_folds, self.cfg.seed)
                })?
            }
            None => grow_oversized_tree(data, y, &splitter, &self.cfg.grow_policy, self.cfg.n_folds, self.cfg.seed)?,
        };

        self.tree = tree;
        self.path = Some(path);
        Ok(())
    }

    /// Whether the estimator holds a grown tree.
    pub fn is_fitted(&self) -> bool {
        !self.tree.nodes.is_empty()
    }

    /// The cross-validated pruning path, if the tree is grown and not
    /// yet pruned.
    pub fn pruning_path(&self) -> Option<&PruningPath> {
        self.path.as_ref()
    }

    /// Select the optimal complexity parameter from the pruning path
    /// under the configured tie-break policy.
    pub fn select_cp(&self) -> Result<f64, CartError> {
        match &self.path {
            Some(path) => select_optimal_complexity(path, self.cfg.tie_break),
            None => Err(CartError::EmptyPath),
        }
    }

    /// Prune the grown tree at the given complexity parameter. The
    /// pruning path is consumed: once a subtree is extracted the path no
    /// longer describes the held tree.
    pub fn prune(&mut self, cp: f64) -> Result<(), CartError> {
        self.tree = self.tree.prune_at(cp)?;
        self.path = None;
        Ok(())
    }

    /// Select the optimal complexity parameter and prune at it,
    /// returning the parameter that was applied.
    pub fn prune_selected(&mut self) -> Result<f64, CartError> {
        let cp = self.select_cp()?;
        self.prune(cp)?;
        info!(
            "Pruned at complexity parameter {}, tree has {} leaves at depth {}.",
            cp, self.tree.n_leaves, self.tree.depth
        );
        Ok(cp)
    }

    /// Predicted values for every record in the data.
    pub fn predict(&self, data: &Matrix<f64>) -> Result<Vec<f64>, CartError> {
        self.tree.validate_features(data)?;
        Ok(self.tree.predict(data, true))
    }

    /// Prediction error of the held tree on the given data: mean squared
    /// error for regression, misclassification rate for classification.
    pub fn evaluate(&self, data: &Matrix<f64>, y: &[f64]) -> Result<f64, CartError> {
        self.tree.evaluate(data, y)
    }

    /// Insert metadata into the model.
    ///
    /// * `key` - String value for the metadata key.
    /// * `value` - value to assign to the metadata key.
    pub fn insert_metadata(&mut self, key: String, value: String) {
        self.metadata.insert(key, value);
    }

    /// Get metadata on the model, if a value is present.
    pub fn get_metadata(&self, key: &String) -> Option<String> {
        self.metadata.get(key).cloned()
    }
}

impl ModelIO for CartTree {}
