use crate::data::FloatData;
use crate::splitter::{NodeSummary, SplitInfo};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A node of a fitted tree. Non-leaf nodes route records to their
/// children by comparing the split feature against the split value.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Node {
    pub num: usize,
    pub parent_node: usize,
    pub left_child: usize,
    pub right_child: usize,
    pub is_leaf: bool,
    pub split_feature: usize,
    pub split_value: f64,
    pub predicted_value: f64,
    pub n_samples: usize,
    /// Resubstitution error mass of this node, as a fraction of the
    /// records the tree was grown on.
    pub risk: f64,
    pub depth: usize,
}

impl Node {
    /// Update all the info that is needed if this node is a
    /// parent node, this consumes the SplittableNode.
    pub fn make_parent_node(&mut self, split_node: SplittableNode) {
        self.is_leaf = false;
        self.split_feature = split_node.split_feature;
        self.split_value = split_node.split_value;
        self.left_child = split_node.left_child;
        self.right_child = split_node.right_child;
    }

    /// Get the path that should be traveled down, given a value.
    pub fn get_child_idx(&self, v: &f64) -> usize {
        if v < &self.split_value {
            self.left_child
        } else {
            self.right_child
        }
    }
}

/// A node that is still being grown, carrying the range of the shared
/// row-index buffer it owns and its split-search state.
#[derive(Debug, Deserialize, Serialize)]
pub struct SplittableNode {
    pub num: usize,
    pub parent_node: usize,
    pub depth: usize,
    pub start_idx: usize,
    pub stop_idx: usize,
    pub impurity: f64,
    pub predicted_value: f64,
    /// Unnormalized error mass; divided by the total record count when
    /// converted to a [`Node`].
    pub risk_sum: f64,
    pub split_feature: usize,
    pub split_value: f64,
    pub left_child: usize,
    pub right_child: usize,
    pub is_leaf: bool,
}

impl SplittableNode {
    /// Create a default splitable node,
    /// we default to the node being a leaf.
    pub fn from_summary(
        num: usize,
        parent_node: usize,
        depth: usize,
        start_idx: usize,
        stop_idx: usize,
        summary: &NodeSummary,
    ) -> Self {
        SplittableNode {
            num,
            parent_node,
            depth,
            start_idx,
            stop_idx,
            impurity: summary.impurity,
            predicted_value: summary.predicted_value,
            risk_sum: summary.risk_sum,
            split_feature: 0,
            split_value: f64::ZERO,
            left_child: 0,
            right_child: 0,
            is_leaf: true,
        }
    }

    pub fn update_children(&mut self, left_child: usize, right_child: usize, split_info: &SplitInfo) {
        self.left_child = left_child;
        self.right_child = right_child;
        self.split_feature = split_info.split_feature;
        self.split_value = split_info.split_value;
        self.is_leaf = false;
    }

    pub fn n_samples(&self) -> usize {
        self.stop_idx - self.start_idx
    }

    pub fn as_node(&self, n_total: usize) -> Node {
        Node {
            num: self.num,
            parent_node: self.parent_node,
            left_child: self.left_child,
            right_child: self.right_child,
            is_leaf: self.is_leaf,
            split_feature: self.split_feature,
            split_value: self.split_value,
            predicted_value: self.predicted_value,
            n_samples: self.n_samples(),
            risk: self.risk_sum / n_total as f64,
            depth: self.depth,
        }
    }
}

impl Ord for SplittableNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.risk_sum.total_cmp(&other.risk_sum)
    }
}

impl PartialOrd for SplittableNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SplittableNode {
    fn eq(&self, other: &Self) -> bool {
        self.risk_sum == other.risk_sum
    }
}

impl Eq for SplittableNode {}

impl fmt::Display for Node {
    // This trait requires `fmt` with this exact signature.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_leaf {
            write!(
                f,
                "{}:leaf={},n={},risk={}",
                self.num, self.predicted_value, self.n_samples, self.risk
            )
        } else {
            write!(
                f,
                "{}:[{} < {}] yes={},no={},n={},risk={}",
                self.num, self.split_feature, self.split_value, self.left_child, self.right_child, self.n_samples, self.risk
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::NodeSummary;

    fn summary() -> NodeSummary {
        NodeSummary {
            predicted_value: 1.5,
            impurity: 0.25,
            risk_sum: 2.0,
        }
    }

    #[test]
    fn test_as_node() {
        let s = SplittableNode::from_summary(0, 0, 0, 0, 8, &summary());
        let node = s.as_node(8);
        assert!(node.is_leaf);
        assert_eq!(node.n_samples, 8);
        assert_eq!(node.risk, 0.25);
        assert_eq!(node.predicted_value, 1.5);
    }

    #[test]
    fn test_child_routing() {
        let mut s = SplittableNode::from_summary(0, 0, 0, 0, 8, &summary());
        s.update_children(
            1,
            2,
            &SplitInfo {
                split_feature: 0,
                split_value: 3.0,
                decrease: 0.1,
                n_left: 4,
                n_right: 4,
            },
        );
        let node = s.as_node(8);
        assert!(!node.is_leaf);
        assert_eq!(node.get_child_idx(&2.5), 1);
        assert_eq!(node.get_child_idx(&3.0), 2);
        assert_eq!(node.get_child_idx(&4.1), 2);
    }

    #[test]
    fn test_splittable_ordering() {
        let a = SplittableNode::from_summary(0, 0, 0, 0, 8, &summary());
        let mut high = summary();
        high.risk_sum = 5.0;
        let b = SplittableNode::from_summary(1, 0, 1, 0, 4, &high);
        assert!(b > a);
    }
}
