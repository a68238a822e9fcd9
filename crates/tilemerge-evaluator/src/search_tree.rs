//! Two-ply lookahead over the four move directions.
//!
//! The tree is rebuilt from scratch every turn and dropped right after. Nodes
//! live in a flat arena ([`SearchTree`]) and refer to each other by
//! [`NodeId`], so there is no recursive ownership and no sharing between
//! turns.
//!
//! ```text
//! root (current grid)
//!  ├─ up    ── up / down / left / right
//!  ├─ down  ── up / down / left / right
//!  ├─ left  ── up / down / left / right
//!  └─ right ── up / down / left / right
//! ```
//!
//! Children are only created by an explicit [`SearchTree::expand`] call.
//!
//! # Example
//!
//! ```
//! use tilemerge_engine::{Direction, Grid};
//! use tilemerge_evaluator::search_tree::SearchTree;
//!
//! let grid = Grid::new([[2, 2, 4, 0], [0; 4], [0; 4], [0; 4]])?;
//! let tree = SearchTree::two_ply(grid);
//! let scores = tree.potential_scores();
//! // left: 2+2 -> 4 (score 4), then 4+4 -> 8 (score 8)
//! assert_eq!(scores[Direction::Left.index()], (Direction::Left, 12));
//! # Ok::<(), tilemerge_engine::InvalidGridError>(())
//! ```

use arrayvec::ArrayVec;
use tilemerge_engine::{Direction, Grid};

/// Deepest ply that can be created below the root.
pub const MAX_DEPTH: u8 = 2;

// root + 4 children + 16 grandchildren
const MAX_NODES: usize = 1 + Direction::LEN + Direction::LEN * Direction::LEN;

/// Index of a node inside its [`SearchTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u8);

/// A grid reached during lookahead.
#[derive(Debug, Clone)]
pub struct SearchNode {
    grid: Grid,
    score_delta: u32,
    direction: Option<Direction>,
    depth: u8,
    children: Option<[NodeId; Direction::LEN]>,
}

impl SearchNode {
    #[must_use]
    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Score gained by the move that produced this node (0 for the root).
    #[must_use]
    pub fn score_delta(&self) -> u32 {
        self.score_delta
    }

    /// Direction that produced this node, `None` for the root.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    #[must_use]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Children in [`Direction::ALL`] order, or `None` if not expanded yet.
    #[must_use]
    pub fn children(&self) -> Option<[NodeId; Direction::LEN]> {
        self.children
    }
}

/// Arena holding a root grid and the nodes expanded below it.
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: ArrayVec<SearchNode, MAX_NODES>,
}

impl SearchTree {
    pub const ROOT: NodeId = NodeId(0);

    /// Creates a tree holding only the root.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        let mut nodes = ArrayVec::new();
        nodes.push(SearchNode {
            grid,
            score_delta: 0,
            direction: None,
            depth: 0,
            children: None,
        });
        Self { nodes }
    }

    /// Creates a tree with the root and every first-level child expanded.
    #[must_use]
    pub fn two_ply(grid: Grid) -> Self {
        let mut tree = Self::new(grid);
        for child in tree.expand(Self::ROOT) {
            tree.expand(child);
        }
        tree
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[usize::from(id.0)]
    }

    /// Creates the four children of `id`, one per direction.
    ///
    /// Expanding an already expanded node returns the existing children.
    ///
    /// # Panics
    ///
    /// Panics if `id` is already at [`MAX_DEPTH`].
    pub fn expand(&mut self, id: NodeId) -> [NodeId; Direction::LEN] {
        let parent = self.node(id);
        if let Some(children) = parent.children {
            return children;
        }
        assert!(
            parent.depth < MAX_DEPTH,
            "cannot expand beyond depth {MAX_DEPTH}"
        );
        let depth = parent.depth + 1;
        let moves = parent.grid.all_moves();

        let children = Direction::ALL.map(|direction| {
            let outcome = moves.get(direction);
            let child = NodeId(
                u8::try_from(self.nodes.len()).expect("arena is bounded by MAX_NODES"),
            );
            self.nodes.push(SearchNode {
                grid: outcome.grid,
                score_delta: outcome.score_delta,
                direction: Some(direction),
                depth,
                children: None,
            });
            child
        });
        self.nodes[usize::from(id.0)].children = Some(children);
        children
    }

    /// Highest score delta among the children of `id`, or 0 if it has none.
    #[must_use]
    pub fn best_child_score(&self, id: NodeId) -> u32 {
        self.node(id)
            .children
            .into_iter()
            .flatten()
            .map(|child| self.node(child).score_delta)
            .max()
            .unwrap_or(0)
    }

    /// Score of `id` plus the best score reachable one move later.
    #[must_use]
    pub fn best_two_ply_score(&self, id: NodeId) -> u32 {
        self.node(id).score_delta + self.best_child_score(id)
    }

    /// Best two-ply score for each first-level direction, in [`Direction::ALL`] order.
    ///
    /// Ties are kept as they are; choosing among equally scored directions is
    /// left to the caller.
    ///
    /// # Panics
    ///
    /// Panics if the root has not been expanded.
    #[must_use]
    pub fn potential_scores(&self) -> [(Direction, u32); Direction::LEN] {
        let children = self
            .node(Self::ROOT)
            .children
            .expect("root must be expanded before scoring");
        Direction::ALL
            .map(|direction| (direction, self.best_two_ply_score(children[direction.index()])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(cells: [[u32; 4]; 4]) -> Grid {
        Grid::new(cells).unwrap()
    }

    #[test]
    fn test_new_has_no_children() {
        let tree = SearchTree::new(grid([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]));
        let root = tree.node(SearchTree::ROOT);
        assert!(root.children().is_none());
        assert_eq!(root.direction(), None);
        assert_eq!(tree.best_child_score(SearchTree::ROOT), 0);
    }

    #[test]
    fn test_expand_is_lazy_and_idempotent() {
        let g = grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut tree = SearchTree::new(g);
        let first = tree.expand(SearchTree::ROOT);
        let second = tree.expand(SearchTree::ROOT);
        assert_eq!(first, second);
        for (dir, id) in Direction::ALL.into_iter().zip(first) {
            let node = tree.node(id);
            assert_eq!(node.direction(), Some(dir));
            assert_eq!(node.depth(), 1);
            assert_eq!(node.grid(), g.apply(dir).grid);
            assert!(node.children().is_none());
        }
    }

    #[test]
    #[should_panic(expected = "cannot expand beyond depth")]
    fn test_expand_past_max_depth_panics() {
        let mut tree = SearchTree::two_ply(grid([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]));
        let child = tree.expand(SearchTree::ROOT)[0];
        let grandchild = tree.expand(child)[0];
        let _ = tree.expand(grandchild);
    }

    #[test]
    fn test_potential_scores_without_merges_are_zero() {
        let g = grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let tree = SearchTree::two_ply(g);
        let scores = tree.potential_scores();
        assert_eq!(scores.len(), 4);
        for (i, (dir, score)) in scores.into_iter().enumerate() {
            assert_eq!(dir, Direction::ALL[i]);
            assert_eq!(score, 0);
        }
    }

    #[test]
    fn test_best_two_ply_score() {
        let g = grid([[2, 2, 4, 0], [0; 4], [0; 4], [0; 4]]);
        let tree = SearchTree::two_ply(g);
        let scores = tree.potential_scores();
        assert_eq!(scores[Direction::Left.index()].1, 4 + 8);
        assert_eq!(scores[Direction::Right.index()].1, 4 + 8);
        // up/down do nothing, then a horizontal move merges 2+2
        assert_eq!(scores[Direction::Up.index()].1, 4);
        assert_eq!(scores[Direction::Down.index()].1, 4);
    }
}
