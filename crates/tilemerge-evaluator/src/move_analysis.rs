//! Measurements of the grid reached by one candidate move.
//!
//! [`MoveAnalysis`] gathers everything the grid features read from a
//! first-level [`SearchTree`] node: the score it gained, the best
//! score available one move later, and the maximum tile with all of its
//! positions.
//!
//! ```
//! use tilemerge_engine::{Direction, Grid};
//! use tilemerge_evaluator::{move_analysis::MoveAnalysis, search_tree::SearchTree};
//!
//! let grid = Grid::new([[2, 2, 4, 0], [0; 4], [0; 4], [0; 4]])?;
//! let mut tree = SearchTree::new(grid);
//! let right = tree.expand(SearchTree::ROOT)[Direction::Right.index()];
//! tree.expand(right);
//!
//! let analysis = MoveAnalysis::from_node(&tree, right);
//! assert_eq!(analysis.score_delta(), 4);
//! assert_eq!(analysis.best_next_score(), 8);
//! assert_eq!(analysis.max_tile().value(), 4);
//! # Ok::<(), tilemerge_engine::InvalidGridError>(())
//! ```

use tilemerge_engine::MaxTile;

use crate::search_tree::{NodeId, SearchTree};

#[derive(Debug, Clone)]
pub struct MoveAnalysis {
    score_delta: u32,
    best_next_score: u32,
    max_tile: MaxTile,
    zeros: usize,
}

impl MoveAnalysis {
    /// Analyzes node `id`; its children, if expanded, supply the best next score.
    #[must_use]
    pub fn from_node(tree: &SearchTree, id: NodeId) -> Self {
        let node = tree.node(id);
        let grid = node.grid();
        Self {
            score_delta: node.score_delta(),
            best_next_score: tree.best_child_score(id),
            max_tile: grid.max_tile(),
            zeros: grid.count_zeros(),
        }
    }

    #[must_use]
    pub fn score_delta(&self) -> u32 {
        self.score_delta
    }

    #[must_use]
    pub fn best_next_score(&self) -> u32 {
        self.best_next_score
    }

    /// Own score plus the best score one move later.
    #[must_use]
    pub fn two_step_score(&self) -> u32 {
        self.score_delta + self.best_next_score
    }

    #[must_use]
    pub fn max_tile(&self) -> &MaxTile {
        &self.max_tile
    }

    #[must_use]
    pub fn zeros(&self) -> usize {
        self.zeros
    }
}
