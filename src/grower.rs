use serde::Deserialize;
use serde::Serialize;

use crate::errors::CartError;
use crate::node::SplittableNode;
use crate::utils::items_to_strings;
use std::collections::BinaryHeap;
use std::collections::VecDeque;
use std::str::FromStr;

/// Trait for handling the growth of the tree.
pub trait Grower {
    /// Add a node to the grower.
    fn add_node(&mut self, node: SplittableNode);
    /// Get the next node to split.
    fn get_next_node(&mut self) -> SplittableNode;
    /// Check if the grower is empty.
    fn is_empty(&self) -> bool;
}

impl Grower for BinaryHeap<SplittableNode> {
    fn add_node(&mut self, node: SplittableNode) {
        self.push(node);
    }

    fn get_next_node(&mut self) -> SplittableNode {
        self.pop().expect("Grower should not be empty")
    }

    fn is_empty(&self) -> bool {
        self.is_empty()
    }
}

impl Grower for VecDeque<SplittableNode> {
    fn add_node(&mut self, node: SplittableNode) {
        self.push_front(node);
    }

    fn get_next_node(&mut self) -> SplittableNode {
        self.pop_back().expect("Grower should not be empty")
    }

    fn is_empty(&self) -> bool {
        self.is_empty()
    }
}

/// Policy for growing the tree.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowPolicy {
    /// Depth-wise growth (level-wise).
    #[default]
    DepthWise,
    /// Error-guided growth, splitting the node with the largest error mass first.
    LossGuide,
}

impl GrowPolicy {
    /// The grower backing this policy.
    pub fn grower(&self) -> Box<dyn Grower> {
        match self {
            GrowPolicy::DepthWise => Box::new(VecDeque::<SplittableNode>::new()),
            GrowPolicy::LossGuide => Box::new(BinaryHeap::<SplittableNode>::new()),
        }
    }
}

impl FromStr for GrowPolicy {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DepthWise" => Ok(GrowPolicy::DepthWise),
            "LossGuide" => Ok(GrowPolicy::LossGuide),
            _ => Err(CartError::ParseString(
                s.to_string(),
                "GrowPolicy".to_string(),
                items_to_strings(vec!["DepthWise", "LossGuide"]),
            )),
        }
    }
}
