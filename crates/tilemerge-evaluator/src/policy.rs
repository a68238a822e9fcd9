//! Move policies: ranking the four directions for the current turn.
//!
//! A [`MovePolicy`] returns all four directions, best first. The game driver
//! tries them in that order and plays the first one that changes the grid,
//! so a policy never needs to know which moves are legal.
//!
//! [`WeightedPolicy`] is the learned policy: for every direction it builds the
//! child grid, looks one more move ahead, extracts the grid features and
//! scores them with a [`MoveEvaluator`]. The remaining policies are fixed
//! baselines used to compare trained weights against.
//!
//! | policy | order |
//! |---|---|
//! | [`WeightedPolicy`] | descending evaluator score, ties in [`Direction::ALL`] order |
//! | [`GreedyTwoStepPolicy`] | descending best two-move score, ties at random |
//! | [`GreedyNoLeftPolicy`] | as above over right, up and down, then left |
//! | [`RandomPolicy`] | uniformly shuffled |
//! | [`PriorityPolicy`] | right, down, up, left |
//! | [`CyclePolicy`] | right, up, left, down, rotated by one each turn |
//! | [`NoLeftRandomPolicy`] | right, up, down shuffled, then left |
//! | [`RightTrendPolicy`] | right, up and down shuffled, then left |

use std::{cmp::Reverse, fmt, iter};

use rand::{RngCore, seq::SliceRandom as _};
use tilemerge_engine::{Direction, Grid};

use crate::{
    grid_feature::FeatureWeights,
    move_analysis::MoveAnalysis,
    move_evaluator::{FeatureBasedMoveEvaluator, MoveEvaluator},
    search_tree::SearchTree,
};

pub trait MovePolicy: fmt::Debug {
    /// Returns the four directions ordered from most to least preferred.
    fn rank_moves(&mut self, grid: Grid, rng: &mut dyn RngCore) -> [Direction; Direction::LEN];
}

/// Ranks directions by a weighted sum of grid features.
#[derive(Debug)]
pub struct WeightedPolicy {
    evaluator: Box<dyn MoveEvaluator>,
}

impl WeightedPolicy {
    #[must_use]
    pub fn new(evaluator: Box<dyn MoveEvaluator>) -> Self {
        Self { evaluator }
    }

    #[must_use]
    pub fn from_weights(weights: FeatureWeights) -> Self {
        Self::new(Box::new(FeatureBasedMoveEvaluator::new(weights)))
    }

    /// Evaluator score of each direction, in [`Direction::ALL`] order.
    #[must_use]
    pub fn score_moves(&self, grid: Grid) -> [(Direction, f32); Direction::LEN] {
        let mut tree = SearchTree::new(grid);
        let children = tree.expand(SearchTree::ROOT);
        let mut scores = Direction::ALL.map(|direction| (direction, 0.0));
        for ((_, score), child) in iter::zip(&mut scores, children) {
            tree.expand(child);
            let analysis = MoveAnalysis::from_node(&tree, child);
            // `+ 0.0` folds -0.0 into 0.0 so that total_cmp sees them as equal
            *score = self.evaluator.evaluate_move(&analysis) + 0.0;
        }
        scores
    }
}

impl MovePolicy for WeightedPolicy {
    fn rank_moves(&mut self, grid: Grid, _rng: &mut dyn RngCore) -> [Direction; Direction::LEN] {
        let mut scores = self.score_moves(grid);
        // stable: equal scores keep Direction::ALL order
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores.map(|(direction, _)| direction)
    }
}

/// Ranks directions by the best score reachable within two moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyTwoStepPolicy;

impl MovePolicy for GreedyTwoStepPolicy {
    fn rank_moves(&mut self, grid: Grid, rng: &mut dyn RngCore) -> [Direction; Direction::LEN] {
        let mut scores = SearchTree::two_ply(grid).potential_scores();
        rank_by_score_shuffled(&mut scores, rng);
        scores.map(|(direction, _)| direction)
    }
}

/// Two-step greedy over right, up and down; left only as a last resort.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyNoLeftPolicy;

impl MovePolicy for GreedyNoLeftPolicy {
    fn rank_moves(&mut self, grid: Grid, rng: &mut dyn RngCore) -> [Direction; Direction::LEN] {
        let scores = SearchTree::two_ply(grid).potential_scores();
        let mut head = [Direction::Right, Direction::Up, Direction::Down]
            .map(|direction| scores[direction.index()]);
        rank_by_score_shuffled(&mut head, rng);
        [head[0].0, head[1].0, head[2].0, Direction::Left]
    }
}

fn rank_by_score_shuffled(scores: &mut [(Direction, u32)], rng: &mut dyn RngCore) {
    scores.shuffle(rng);
    scores.sort_by_key(|&(_, score)| Reverse(score));
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl MovePolicy for RandomPolicy {
    fn rank_moves(&mut self, _grid: Grid, rng: &mut dyn RngCore) -> [Direction; Direction::LEN] {
        let mut directions = Direction::ALL;
        directions.shuffle(rng);
        directions
    }
}

/// Always prefers right, then down, then up, then left.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityPolicy;

impl PriorityPolicy {
    pub const ORDER: [Direction; Direction::LEN] = [
        Direction::Right,
        Direction::Down,
        Direction::Up,
        Direction::Left,
    ];
}

impl MovePolicy for PriorityPolicy {
    fn rank_moves(&mut self, _grid: Grid, _rng: &mut dyn RngCore) -> [Direction; Direction::LEN] {
        Self::ORDER
    }
}

/// Walks the path right, up, left, down, one step per turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct CyclePolicy {
    step: usize,
}

impl CyclePolicy {
    pub const PATH: [Direction; Direction::LEN] = [
        Direction::Right,
        Direction::Up,
        Direction::Left,
        Direction::Down,
    ];
}

impl MovePolicy for CyclePolicy {
    fn rank_moves(&mut self, _grid: Grid, _rng: &mut dyn RngCore) -> [Direction; Direction::LEN] {
        let mut path = Self::PATH;
        path.rotate_left(self.step);
        self.step = (self.step + 1) % Direction::LEN;
        path
    }
}

/// Random among right, up and down; left only as a last resort.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLeftRandomPolicy;

impl MovePolicy for NoLeftRandomPolicy {
    fn rank_moves(&mut self, _grid: Grid, rng: &mut dyn RngCore) -> [Direction; Direction::LEN] {
        let mut head = [Direction::Right, Direction::Up, Direction::Down];
        head.shuffle(rng);
        [head[0], head[1], head[2], Direction::Left]
    }
}

/// Right whenever possible, otherwise up or down at random, left last.
#[derive(Debug, Clone, Copy, Default)]
pub struct RightTrendPolicy;

impl MovePolicy for RightTrendPolicy {
    fn rank_moves(&mut self, _grid: Grid, rng: &mut dyn RngCore) -> [Direction; Direction::LEN] {
        let mut middle = [Direction::Up, Direction::Down];
        middle.shuffle(rng);
        [Direction::Right, middle[0], middle[1], Direction::Left]
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn grid(cells: [[u32; 4]; 4]) -> Grid {
        Grid::new(cells).unwrap()
    }

    fn sorted(mut directions: [Direction; 4]) -> [Direction; 4] {
        directions.sort_by_key(|d| d.index());
        directions
    }

    #[test]
    fn test_weighted_policy_ranks_by_score() {
        // only empty cells count: left and right merge the pair, up and down do not
        let mut policy = WeightedPolicy::from_weights([0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        let mut rng = Pcg32::seed_from_u64(0);
        let g = grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(
            policy.rank_moves(g, &mut rng),
            [Direction::Left, Direction::Right, Direction::Up, Direction::Down]
        );
    }

    #[test]
    fn test_weighted_policy_keeps_direction_order_on_ties() {
        let mut policy = WeightedPolicy::from_weights([0.0; 6]);
        let mut rng = Pcg32::seed_from_u64(0);
        let g = grid([[2, 4, 0, 0], [0; 4], [0; 4], [0, 0, 0, 8]]);
        assert_eq!(policy.rank_moves(g, &mut rng), Direction::ALL);
    }

    #[test]
    fn test_weighted_policy_negative_weight_prefers_corner() {
        // penalize distance to the lower-right corner
        let policy = WeightedPolicy::from_weights([0.0, 0.0, 0.0, 0.0, 0.0, -1.0]);
        let g = grid([[8, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let scores = policy.score_moves(g);
        assert_eq!(scores[Direction::Up.index()], (Direction::Up, -6.0));
        assert_eq!(scores[Direction::Down.index()], (Direction::Down, -3.0));
        assert_eq!(scores[Direction::Right.index()], (Direction::Right, -3.0));
    }

    #[test]
    fn test_greedy_two_step_policy() {
        let g = grid([[2, 2, 4, 0], [0; 4], [0; 4], [0; 4]]);
        for seed in 0..8 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let ranking = GreedyTwoStepPolicy.rank_moves(g, &mut rng);
            assert_eq!(
                sorted([ranking[0], ranking[1], Direction::Up, Direction::Down]),
                Direction::ALL
            );
            assert_eq!(
                sorted([ranking[2], ranking[3], Direction::Left, Direction::Right]),
                Direction::ALL
            );
        }
    }

    #[test]
    fn test_greedy_no_left_policy() {
        // left and right both score 12, but left is held back
        let g = grid([[2, 2, 4, 0], [0; 4], [0; 4], [0; 4]]);
        for seed in 0..8 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let ranking = GreedyNoLeftPolicy.rank_moves(g, &mut rng);
            assert_eq!(ranking[0], Direction::Right);
            assert_eq!(
                sorted([ranking[1], ranking[2], Direction::Left, Direction::Right]),
                Direction::ALL
            );
            assert_eq!(ranking[3], Direction::Left);
        }
    }

    #[test]
    fn test_random_policy_is_permutation() {
        let mut rng = Pcg32::seed_from_u64(42);
        let g = Grid::EMPTY;
        for _ in 0..16 {
            assert_eq!(sorted(RandomPolicy.rank_moves(g, &mut rng)), Direction::ALL);
        }
    }

    #[test]
    fn test_priority_policy() {
        let mut rng = Pcg32::seed_from_u64(0);
        assert_eq!(
            PriorityPolicy.rank_moves(Grid::EMPTY, &mut rng),
            PriorityPolicy::ORDER
        );
    }

    #[test]
    fn test_cycle_policy_advances_each_turn() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut policy = CyclePolicy::default();
        let firsts: Vec<_> = (0..5)
            .map(|_| policy.rank_moves(Grid::EMPTY, &mut rng)[0])
            .collect();
        assert_eq!(
            firsts,
            [
                Direction::Right,
                Direction::Up,
                Direction::Left,
                Direction::Down,
                Direction::Right,
            ]
        );
    }

    #[test]
    fn test_left_is_last_resort() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..16 {
            let no_left = NoLeftRandomPolicy.rank_moves(Grid::EMPTY, &mut rng);
            assert_eq!(no_left[3], Direction::Left);
            assert_eq!(sorted(no_left), Direction::ALL);

            let trend = RightTrendPolicy.rank_moves(Grid::EMPTY, &mut rng);
            assert_eq!(trend[0], Direction::Right);
            assert_eq!(trend[3], Direction::Left);
        }
    }
}
