//! Model Configuration
//!
//! Defines the configuration for growing, cross-validating, and pruning
//! a tree, plus the JSON persistence trait shared by saved models.
use crate::constants::DEFAULT_FOLDS;
use crate::errors::CartError;
use crate::grower::GrowPolicy;
use crate::metric::Task;
use crate::selector::TieBreak;
use crate::splitter::Splitter;
use crate::utils::validate_positive_float_parameter;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_max_depth() -> usize {
    30
}
fn default_min_samples_split() -> usize {
    10
}
fn default_min_samples_leaf() -> usize {
    5
}
fn default_min_impurity_decrease() -> f64 {
    0.0
}
fn default_n_folds() -> usize {
    DEFAULT_FOLDS
}
fn default_seed() -> u64 {
    0
}

/// Configuration for a [`CartTree`](crate::model::CartTree).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Whether the response is continuous or categorical.
    #[serde(default)]
    pub task: Task,
    /// Maximum depth of the oversized tree.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Minimum number of records a node needs to be considered for a split.
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    /// Minimum number of records either side of a candidate split.
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    /// Minimum decrease in node impurity a split must achieve.
    #[serde(default = "default_min_impurity_decrease")]
    pub min_impurity_decrease: f64,
    /// Number of cross-validation folds used to estimate path errors.
    #[serde(default = "default_n_folds")]
    pub n_folds: usize,
    /// Seed for the fold shuffle.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Policy for choosing among equally good candidate subtrees.
    #[serde(default)]
    pub tie_break: TieBreak,
    /// Order in which growable nodes are split.
    #[serde(default)]
    pub grow_policy: GrowPolicy,
    /// Number of threads for parallel tasks.
    #[serde(default)]
    pub num_threads: Option<usize>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            task: Task::Regression,
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            min_impurity_decrease: default_min_impurity_decrease(),
            n_folds: default_n_folds(),
            seed: default_seed(),
            tie_break: TieBreak::default(),
            grow_policy: GrowPolicy::default(),
            num_threads: None,
        }
    }
}

impl TreeConfig {
    /// Reject configurations that cannot grow or cross-validate a tree.
    pub fn validate(&self) -> Result<(), CartError> {
        if self.max_depth == 0 {
            return Err(CartError::InvalidParameter(
                "max_depth".to_string(),
                "positive integer".to_string(),
                self.max_depth.to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(CartError::InvalidParameter(
                "min_samples_split".to_string(),
                "integer of at least 2".to_string(),
                self.min_samples_split.to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(CartError::InvalidParameter(
                "min_samples_leaf".to_string(),
                "positive integer".to_string(),
                self.min_samples_leaf.to_string(),
            ));
        }
        if self.n_folds < 2 {
            return Err(CartError::InvalidParameter(
                "n_folds".to_string(),
                "integer of at least 2".to_string(),
                self.n_folds.to_string(),
            ));
        }
        validate_positive_float_parameter(self.min_impurity_decrease, "min_impurity_decrease")?;
        Ok(())
    }

    /// The splitter this configuration describes.
    pub fn splitter(&self) -> Splitter {
        Splitter {
            task: self.task,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            min_impurity_decrease: self.min_impurity_decrease,
            max_depth: self.max_depth,
        }
    }
}

/// IO
pub trait ModelIO: Serialize + DeserializeOwned + Sized {
    /// Save a model as a json object to a file.
    ///
    /// * `path` - Path to save model.
    fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<(), CartError> {
        fs::write(path, self.json_dump()?).map_err(|e| CartError::UnableToWrite(e.to_string()))
    }

    /// Dump a model as a json object
    fn json_dump(&self) -> Result<String, CartError> {
        serde_json::to_string(self).map_err(|e| CartError::UnableToWrite(e.to_string()))
    }

    /// Load a model from Json string
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, CartError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| CartError::UnableToRead(e.to_string()))
    }

    /// Load a model from a path to a json model object.
    ///
    /// * `path` - Path to load model from.
    fn load_model<P: AsRef<Path>>(path: P) -> Result<Self, CartError> {
        let json_str = fs::read_to_string(path).map_err(|e| CartError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl ModelIO for TreeConfig {}
