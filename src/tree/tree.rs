use crate::constants::N_NODES_LIMIT;
use crate::data::Matrix;
use crate::grower::GrowPolicy;
use crate::metric::Task;
use crate::node::{Node, SplittableNode};
use crate::splitter::Splitter;
use crate::utils::pivot_on_split;
use log::warn;
use serde::{Deserialize, Serialize};
use std::cmp::max;
use std::collections::HashMap;
use std::fmt::{self, Display};

/// Why growth stopped.
#[derive(Deserialize, Serialize, Clone, PartialEq, Debug)]
pub enum TreeStopper {
    /// No growable node had an admissible split left.
    Exhausted,
    /// The node allocation limit was reached first.
    NodeLimit,
}

/// A single CART tree, grown greedily and oversized, to be cut back by
/// cost-complexity pruning.
#[derive(Deserialize, Serialize, Clone)]
pub struct Tree {
    pub nodes: HashMap<usize, Node>,
    pub stopper: TreeStopper,
    pub depth: usize,
    pub n_leaves: usize,
    /// Number of feature columns the tree was grown on.
    pub n_features: usize,
    /// Number of records the tree was grown on.
    pub n_samples: usize,
    pub task: Task,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            nodes: HashMap::new(),
            stopper: TreeStopper::Exhausted,
            depth: 0,
            n_leaves: 0,
            n_features: 0,
            n_samples: 0,
            task: Task::Regression,
        }
    }

    /// Grow the tree over the records in `index`. Growth at each node
    /// stops only when the splitter finds no admissible split, so with
    /// permissive stopping criteria the result deliberately overfits.
    pub fn fit(&mut self, data: &Matrix<f64>, mut index: Vec<usize>, y: &[f64], splitter: &Splitter, grow_policy: &GrowPolicy) {
        let n_total = index.len();
        self.n_features = data.cols;
        self.n_samples = n_total;
        self.task = splitter.task;
        self.stopper = TreeStopper::Exhausted;

        let root_summary = splitter.node_summary(y, &index);
        let root = SplittableNode::from_summary(0, 0, 0, 0, n_total, &root_summary);
        self.nodes.insert(0, root.as_node(n_total));
        self.n_leaves = 1;
        self.depth = 0;

        let mut growable = grow_policy.grower();
        growable.add_node(root);
        let mut n_nodes = 1;

        while !growable.is_empty() {
            if n_nodes + 2 > N_NODES_LIMIT {
                self.stopper = TreeStopper::NodeLimit;
                warn!("Reached node limit of {} while growing, tree left partially grown.", N_NODES_LIMIT);
                break;
            }

            let mut node = growable.get_next_node();
            if node.depth >= splitter.max_depth {
                continue;
            }

            let split_info = match splitter.best_split(data, y, &index[node.start_idx..node.stop_idx], node.impurity) {
                None => continue,
                Some(info) => info,
            };

            let n_left = pivot_on_split(
                &mut index[node.start_idx..node.stop_idx],
                data,
                split_info.split_feature,
                split_info.split_value,
            );
            let mid = node.start_idx + n_left;

            let left_summary = splitter.node_summary(y, &index[node.start_idx..mid]);
            let right_summary = splitter.node_summary(y, &index[mid..node.stop_idx]);
            let left = SplittableNode::from_summary(n_nodes, node.num, node.depth + 1, node.start_idx, mid, &left_summary);
            let right =
                SplittableNode::from_summary(n_nodes + 1, node.num, node.depth + 1, mid, node.stop_idx, &right_summary);

            node.update_children(left.num, right.num, &split_info);
            let parent_num = node.num;
            let parent_depth = node.depth;
            if let Some(x) = self.nodes.get_mut(&parent_num) {
                x.make_parent_node(node);
            }

            self.depth = max(self.depth, parent_depth + 1);
            self.n_leaves += 1;
            n_nodes += 2;

            self.nodes.insert(left.num, left.as_node(n_total));
            self.nodes.insert(right.num, right.as_node(n_total));
            growable.add_node(left);
            growable.add_node(right);
        }
    }

    /// Node indices of the leaves, sorted for deterministic traversal.
    pub fn leaf_indices(&self) -> Vec<usize> {
        let mut leaves: Vec<usize> = self.nodes.values().filter(|n| n.is_leaf).map(|n| n.num).collect();
        leaves.sort_unstable();
        leaves
    }

    /// Node indices of internal nodes, sorted for deterministic traversal.
    pub fn internal_indices(&self) -> Vec<usize> {
        let mut internal: Vec<usize> = self.nodes.values().filter(|n| !n.is_leaf).map(|n| n.num).collect();
        internal.sort_unstable();
        internal
    }

    /// Recompute depth and leaf count from the node map, after pruning
    /// has removed nodes.
    pub(crate) fn refresh_stats(&mut self) {
        self.n_leaves = self.nodes.values().filter(|n| n.is_leaf).count();
        self.depth = self.nodes.values().map(|n| n.depth).max().unwrap_or(0);
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut print_buffer: Vec<usize> = vec![0];
        let mut r = String::new();
        while let Some(idx) = print_buffer.pop() {
            let node = &self.nodes[&idx];
            r += format!("{}{}\n", "      ".repeat(node.depth).as_str(), node).as_str();
            if !node.is_leaf {
                print_buffer.push(node.right_child);
                print_buffer.push(node.left_child);
            }
        }
        write!(f, "{}", r)
    }
}
