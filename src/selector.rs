//! Complexity-parameter selection.
//!
//! Scans a pruning path for the candidate subtree with the best
//! cross-validated error. The tie-break between statistically
//! indistinguishable candidates is an explicit policy choice, not a
//! hardwired default.
use crate::errors::CartError;
use crate::metric::is_comparison_better;
use crate::pruning::{CandidateSubtree, PruningPath};
use crate::utils::items_to_strings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How to choose among candidates with equally good error estimates.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// First candidate on the path attaining the minimum estimated error.
    FirstMinimum,
    /// Among candidates attaining the minimum estimated error, the one
    /// with the fewest leaves.
    #[default]
    SmallestTree,
    /// Largest complexity parameter whose estimated error is within one
    /// standard error of the minimum (the 1-SE rule).
    OneStdError,
}

impl FromStr for TieBreak {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FirstMinimum" => Ok(TieBreak::FirstMinimum),
            "SmallestTree" => Ok(TieBreak::SmallestTree),
            "OneStdError" => Ok(TieBreak::OneStdError),
            _ => Err(CartError::ParseString(
                s.to_string(),
                "TieBreak".to_string(),
                items_to_strings(vec!["FirstMinimum", "SmallestTree", "OneStdError"]),
            )),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TieBreak::FirstMinimum => write!(f, "FirstMinimum"),
            TieBreak::SmallestTree => write!(f, "SmallestTree"),
            TieBreak::OneStdError => write!(f, "OneStdError"),
        }
    }
}

/// Select the complexity parameter of the candidate subtree that
/// minimizes the estimated prediction error, applying the given
/// tie-break policy. The returned value is always the exact
/// `complexity_parameter` of one candidate on the path.
pub fn select_optimal_complexity(path: &PruningPath, policy: TieBreak) -> Result<f64, CartError> {
    if path.is_empty() {
        return Err(CartError::EmptyPath);
    }

    let candidates = path.candidates();
    let mut best: &CandidateSubtree = &candidates[0];
    for c in &candidates[1..] {
        if is_comparison_better(best.estimated_error, c.estimated_error, false) {
            best = c;
        }
    }

    match policy {
        TieBreak::FirstMinimum => Ok(best.complexity_parameter),
        TieBreak::SmallestTree => {
            // Candidates are ordered by decreasing size, the last exact
            // tie is the simplest subtree.
            let mut chosen = best;
            for c in candidates {
                if c.estimated_error == best.estimated_error && c.tree_size <= chosen.tree_size {
                    chosen = c;
                }
            }
            Ok(chosen.complexity_parameter)
        }
        TieBreak::OneStdError => {
            let threshold = best.estimated_error + best.error_std_error;
            let mut chosen = best;
            for c in candidates {
                if !c.estimated_error.is_nan()
                    && c.estimated_error <= threshold
                    && c.complexity_parameter >= chosen.complexity_parameter
                {
                    chosen = c;
                }
            }
            Ok(chosen.complexity_parameter)
        }
    }
}
