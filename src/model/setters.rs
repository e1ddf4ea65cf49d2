use crate::grower::GrowPolicy;
use crate::metric::Task;
use crate::model::CartTree;
use crate::selector::TieBreak;

impl CartTree {
    // Set methods for parameters

    /// Set the task on the model.
    /// * `task` - Whether the response is continuous or categorical.
    pub fn set_task(mut self, task: Task) -> Self {
        self.cfg.task = task;
        self
    }

    /// Set the maximum depth of the oversized tree.
    /// * `max_depth` - Maximum depth grown before a node is left as a leaf.
    pub fn set_max_depth(mut self, max_depth: usize) -> Self {
        self.cfg.max_depth = max_depth;
        self
    }

    /// Set the minimum number of records a node needs to be split.
    /// * `min_samples_split` - Nodes with fewer records stay leaves.
    pub fn set_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.cfg.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of records either side of a split.
    /// * `min_samples_leaf` - Candidate splits leaving fewer records in a
    ///   child are skipped.
    pub fn set_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.cfg.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the minimum impurity decrease a split must achieve.
    /// * `min_impurity_decrease` - Splits below this decrease are skipped.
    pub fn set_min_impurity_decrease(mut self, min_impurity_decrease: f64) -> Self {
        self.cfg.min_impurity_decrease = min_impurity_decrease;
        self
    }

    /// Set the number of cross-validation folds.
    /// * `n_folds` - Fold count used to estimate path errors, typically 5 or 10.
    pub fn set_n_folds(mut self, n_folds: usize) -> Self {
        self.cfg.n_folds = n_folds;
        self
    }

    /// Set the seed used to shuffle records into folds.
    /// * `seed` - Integer value used to seed randomness.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.cfg.seed = seed;
        self
    }

    /// Set the tie-break policy used when selecting the complexity parameter.
    /// * `tie_break` - Policy for equally good candidate subtrees.
    pub fn set_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.cfg.tie_break = tie_break;
        self
    }

    /// Set the growth ordering of the oversized tree.
    /// * `grow_policy` - Depth-wise or error-guided node ordering.
    pub fn set_grow_policy(mut self, grow_policy: GrowPolicy) -> Self {
        self.cfg.grow_policy = grow_policy;
        self
    }

    /// Set the number of threads used for parallel tasks.
    /// * `num_threads` - Set the number of threads to be used during fitting.
    pub fn set_num_threads(mut self, num_threads: Option<usize>) -> Self {
        self.cfg.num_threads = num_threads;
        self
    }
}
