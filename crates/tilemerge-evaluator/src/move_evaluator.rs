//! Move evaluation: scoring the grid reached by one candidate move.
//!
//! A [`MoveEvaluator`] turns a [`MoveAnalysis`] into a single score (higher
//! is better). The weighted policy asks it once per direction each turn and
//! ranks the directions by the result.
//!
//! [`FeatureBasedMoveEvaluator`] is a linear model over the six grid
//! features:
//!
//! ```text
//! score = w₁·f₁ + w₂·f₂ + ... + w₆·f₆
//! ```
//!
//! Weights may be negative; the optimizer learns them.
//!
//! # Example
//!
//! ```
//! use tilemerge_engine::{Direction, Grid};
//! use tilemerge_evaluator::{
//!     move_analysis::MoveAnalysis,
//!     move_evaluator::{FeatureBasedMoveEvaluator, MoveEvaluator},
//!     search_tree::SearchTree,
//! };
//!
//! let grid = Grid::new([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]])?;
//! let tree = SearchTree::two_ply(grid);
//! let left = tree.node(SearchTree::ROOT).children().unwrap()[Direction::Left.index()];
//! let analysis = MoveAnalysis::from_node(&tree, left);
//!
//! // only count empty cells
//! let evaluator = FeatureBasedMoveEvaluator::new([0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
//! assert_eq!(evaluator.evaluate_move(&analysis), 15.0);
//! # Ok::<(), tilemerge_engine::InvalidGridError>(())
//! ```

use std::fmt;

use crate::{
    grid_feature::{FeatureVector, FeatureWeights},
    move_analysis::MoveAnalysis,
};

/// Evaluates candidate moves by assigning scores.
pub trait MoveEvaluator: fmt::Debug + Send + Sync {
    /// Evaluates a move and returns a score (higher is better).
    fn evaluate_move(&self, analysis: &MoveAnalysis) -> f32;
}

/// Weighted sum of the six grid features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBasedMoveEvaluator {
    weights: FeatureWeights,
}

impl FeatureBasedMoveEvaluator {
    #[must_use]
    pub fn new(weights: FeatureWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &FeatureWeights {
        &self.weights
    }
}

impl MoveEvaluator for FeatureBasedMoveEvaluator {
    #[inline]
    fn evaluate_move(&self, analysis: &MoveAnalysis) -> f32 {
        FeatureVector::from_analysis(analysis).weighted_sum(&self.weights)
    }
}
