use crate::data::Matrix;
use crate::metric::Task;
use crate::utils::{class_counts, gini_impurity, majority_class};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The best split found for a node.
#[derive(Debug, Clone, Default)]
pub struct SplitInfo {
    pub split_feature: usize,
    pub split_value: f64,
    /// Decrease in mean node impurity achieved by the split.
    pub decrease: f64,
    pub n_left: usize,
    pub n_right: usize,
}

/// Summary statistics of the records in a node.
#[derive(Debug, Clone)]
pub struct NodeSummary {
    pub predicted_value: f64,
    pub impurity: f64,
    /// Unnormalized error mass: sum of squared deviations for regression,
    /// misclassified record count for classification.
    pub risk_sum: f64,
}

/// Greedy split search with the stopping criteria that keep the grown
/// tree from degenerating. The criteria are deliberately permissive by
/// default, the tree is grown oversized and pruned back afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Splitter {
    pub task: Task,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub min_impurity_decrease: f64,
    pub max_depth: usize,
}

impl Splitter {
    /// Prediction, impurity and error mass for the records in `index`.
    pub fn node_summary(&self, y: &[f64], index: &[usize]) -> NodeSummary {
        let n = index.len();
        let nf = n as f64;
        match self.task {
            Task::Regression => {
                let sum: f64 = index.iter().map(|&i| y[i]).sum();
                let sum_sq: f64 = index.iter().map(|&i| y[i] * y[i]).sum();
                let mean = sum / nf;
                let sse = (sum_sq - sum * sum / nf).max(0.0);
                NodeSummary {
                    predicted_value: mean,
                    impurity: sse / nf,
                    risk_sum: sse,
                }
            }
            Task::Classification => {
                let counts = class_counts(y, index);
                let (label, count) = majority_class(&counts);
                NodeSummary {
                    predicted_value: label,
                    impurity: gini_impurity(&counts, n),
                    risk_sum: (n - count) as f64,
                }
            }
        }
    }

    /// Scan all features and thresholds for the split that most decreases
    /// the weighted child impurity. Returns `None` when the node is pure,
    /// too small to split, or no candidate clears the configured decrease.
    ///
    /// Ties on the decrease keep the first candidate found, so the search
    /// is deterministic in feature and threshold order.
    pub fn best_split(&self, data: &Matrix<f64>, y: &[f64], index: &[usize], parent_impurity: f64) -> Option<SplitInfo> {
        let n = index.len();
        if n < self.min_samples_split || n < 2 * self.min_samples_leaf || parent_impurity <= 0.0 {
            return None;
        }
        let mut best: Option<SplitInfo> = None;
        for feature in 0..data.cols {
            let candidate = match self.task {
                Task::Regression => self.best_split_regression(data, y, index, parent_impurity, feature),
                Task::Classification => self.best_split_classification(data, y, index, parent_impurity, feature),
            };
            if let Some(c) = candidate {
                match best {
                    Some(ref b) if c.decrease <= b.decrease => {}
                    _ => best = Some(c),
                }
            }
        }
        best
    }

    fn sorted_by_feature(&self, data: &Matrix<f64>, index: &[usize], feature: usize) -> Vec<usize> {
        let mut order = index.to_vec();
        order.sort_unstable_by(|&a, &b| data.get(a, feature).total_cmp(data.get(b, feature)));
        order
    }

    fn best_split_regression(
        &self,
        data: &Matrix<f64>,
        y: &[f64],
        index: &[usize],
        parent_impurity: f64,
        feature: usize,
    ) -> Option<SplitInfo> {
        let n = index.len();
        let nf = n as f64;
        let order = self.sorted_by_feature(data, index, feature);

        let total_sum: f64 = order.iter().map(|&i| y[i]).sum();
        let total_sum_sq: f64 = order.iter().map(|&i| y[i] * y[i]).sum();

        let mut sum_l = 0.0;
        let mut sum_sq_l = 0.0;
        let mut best: Option<SplitInfo> = None;

        for i in 1..n {
            let prev = order[i - 1];
            sum_l += y[prev];
            sum_sq_l += y[prev] * y[prev];

            let x_prev = *data.get(prev, feature);
            let x_next = *data.get(order[i], feature);
            if x_prev == x_next {
                continue;
            }
            let n_l = i;
            let n_r = n - i;
            if n_l < self.min_samples_leaf || n_r < self.min_samples_leaf {
                continue;
            }

            let nf_l = n_l as f64;
            let nf_r = n_r as f64;
            let sse_l = (sum_sq_l - sum_l * sum_l / nf_l).max(0.0);
            let sum_r = total_sum - sum_l;
            let sum_sq_r = total_sum_sq - sum_sq_l;
            let sse_r = (sum_sq_r - sum_r * sum_r / nf_r).max(0.0);
            let decrease = parent_impurity - (sse_l + sse_r) / nf;
            if decrease <= 0.0 || decrease < self.min_impurity_decrease {
                continue;
            }
            if best.as_ref().map_or(true, |b| decrease > b.decrease) {
                best = Some(SplitInfo {
                    split_feature: feature,
                    split_value: threshold_between(x_prev, x_next),
                    decrease,
                    n_left: n_l,
                    n_right: n_r,
                });
            }
        }
        best
    }

    fn best_split_classification(
        &self,
        data: &Matrix<f64>,
        y: &[f64],
        index: &[usize],
        parent_impurity: f64,
        feature: usize,
    ) -> Option<SplitInfo> {
        let n = index.len();
        let nf = n as f64;
        let order = self.sorted_by_feature(data, index, feature);

        let mut counts_l: HashMap<u64, usize> = HashMap::new();
        let mut counts_r = class_counts(y, index);
        let mut best: Option<SplitInfo> = None;

        for i in 1..n {
            let prev = order[i - 1];
            let bits = y[prev].to_bits();
            *counts_l.entry(bits).or_insert(0) += 1;
            if let Some(c) = counts_r.get_mut(&bits) {
                *c -= 1;
            }

            let x_prev = *data.get(prev, feature);
            let x_next = *data.get(order[i], feature);
            if x_prev == x_next {
                continue;
            }
            let n_l = i;
            let n_r = n - i;
            if n_l < self.min_samples_leaf || n_r < self.min_samples_leaf {
                continue;
            }

            let gini_l = gini_impurity(&counts_l, n_l);
            let gini_r = gini_impurity(&counts_r, n_r);
            let decrease = parent_impurity - (n_l as f64 * gini_l + n_r as f64 * gini_r) / nf;
            if decrease <= 0.0 || decrease < self.min_impurity_decrease {
                continue;
            }
            if best.as_ref().map_or(true, |b| decrease > b.decrease) {
                best = Some(SplitInfo {
                    split_feature: feature,
                    split_value: threshold_between(x_prev, x_next),
                    decrease,
                    n_left: n_l,
                    n_right: n_r,
                });
            }
        }
        best
    }
}

/// Midpoint threshold between two adjacent distinct feature values.
/// Falls back to the upper value when the midpoint rounds down onto the
/// lower one, so `x < threshold` always reproduces the scanned partition.
fn threshold_between(lower: f64, upper: f64) -> f64 {
    let mid = (lower + upper) / 2.0;
    if mid <= lower {
        upper
    } else {
        mid
    }
}
