//! The six grid features.

use crate::move_analysis::MoveAnalysis;

use super::GridFeature;

/// log2, with 0 mapped to 0 instead of negative infinity.
#[expect(clippy::cast_precision_loss)]
fn log2_or_zero(value: u32) -> f32 {
    if value == 0 { 0.0 } else { (value as f32).log2() }
}

#[expect(clippy::cast_precision_loss)]
fn count(value: usize) -> f32 {
    value as f32
}

/// log2 of the highest tile on the grid.
///
/// # Panics
///
/// Panics on an all-empty grid, which never occurs during play.
#[derive(Debug, Clone, Copy)]
pub struct HighestTile;

impl GridFeature for HighestTile {
    fn id(&self) -> &'static str {
        "highest_tile"
    }
    fn name(&self) -> &'static str {
        "Highest Tile"
    }
    fn extract(&self, analysis: &MoveAnalysis) -> f32 {
        let value = analysis.max_tile().value();
        assert!(value > 0, "highest tile is undefined on an empty grid");
        log2_or_zero(value)
    }
}

/// log2 of the score gained by the move itself.
#[derive(Debug, Clone, Copy)]
pub struct Score;

impl GridFeature for Score {
    fn id(&self) -> &'static str {
        "score"
    }
    fn name(&self) -> &'static str {
        "Score"
    }
    fn extract(&self, analysis: &MoveAnalysis) -> f32 {
        log2_or_zero(analysis.score_delta())
    }
}

/// Number of empty cells after the move.
#[derive(Debug, Clone, Copy)]
pub struct NumberOfZeros;

impl GridFeature for NumberOfZeros {
    fn id(&self) -> &'static str {
        "number_of_zeros"
    }
    fn name(&self) -> &'static str {
        "Number of Zeros"
    }
    fn extract(&self, analysis: &MoveAnalysis) -> f32 {
        count(analysis.zeros())
    }
}

/// log2 of the move's score plus the best score of the following move.
#[derive(Debug, Clone, Copy)]
pub struct PotentialTwoStepScore;

impl GridFeature for PotentialTwoStepScore {
    fn id(&self) -> &'static str {
        "potential_two_step_score"
    }
    fn name(&self) -> &'static str {
        "Potential Two-Step Score"
    }
    fn extract(&self, analysis: &MoveAnalysis) -> f32 {
        log2_or_zero(analysis.two_step_score())
    }
}

/// Columns between the right wall and the nearest maximum tile.
#[derive(Debug, Clone, Copy)]
pub struct DistanceFromRight;

impl GridFeature for DistanceFromRight {
    fn id(&self) -> &'static str {
        "distance_from_right"
    }
    fn name(&self) -> &'static str {
        "Distance from Right"
    }
    fn extract(&self, analysis: &MoveAnalysis) -> f32 {
        count(analysis.max_tile().distance_to_right_wall())
    }
}

/// Manhattan distance from the nearest maximum tile to the lower-right corner.
#[derive(Debug, Clone, Copy)]
pub struct DistanceFromCorner;

impl GridFeature for DistanceFromCorner {
    fn id(&self) -> &'static str {
        "distance_from_corner"
    }
    fn name(&self) -> &'static str {
        "Distance from Corner"
    }
    fn extract(&self, analysis: &MoveAnalysis) -> f32 {
        count(analysis.max_tile().distance_to_lower_right_corner())
    }
}

#[cfg(test)]
mod tests {
    use tilemerge_engine::{Direction, Grid};

    use crate::{
        grid_feature::{ALL_GRID_FEATURES, FeatureVector, feature_index},
        search_tree::SearchTree,
    };

    use super::*;

    fn analysis_after(cells: [[u32; 4]; 4], direction: Direction) -> MoveAnalysis {
        let mut tree = SearchTree::new(Grid::new(cells).unwrap());
        let child = tree.expand(SearchTree::ROOT)[direction.index()];
        tree.expand(child);
        MoveAnalysis::from_node(&tree, child)
    }

    #[test]
    fn test_feature_ids_are_unique_and_ordered() {
        let ids: Vec<_> = ALL_GRID_FEATURES.iter().map(|f| f.id()).collect();
        assert_eq!(
            ids,
            [
                "highest_tile",
                "score",
                "number_of_zeros",
                "potential_two_step_score",
                "distance_from_right",
                "distance_from_corner",
            ]
        );
        assert_eq!(feature_index("score"), Some(1));
        assert_eq!(feature_index("unknown"), None);
    }

    #[test]
    fn test_features_after_merge() {
        // right: [2,2,4,0] -> [0,0,4,4] (score 4), then right again -> 8 (score 8)
        let analysis = analysis_after([[2, 2, 4, 0], [0; 4], [0; 4], [0, 0, 0, 0]], Direction::Right);
        let features = FeatureVector::from_analysis(&analysis);
        assert_eq!(features.get("highest_tile"), Some(2.0));
        assert_eq!(features.get("score"), Some(2.0));
        assert_eq!(features.get("number_of_zeros"), Some(14.0));
        assert_eq!(features.get("potential_two_step_score"), Some(12f32.log2()));
        assert_eq!(features.get("distance_from_right"), Some(0.0));
        assert_eq!(features.get("distance_from_corner"), Some(3.0));
    }

    #[test]
    fn test_zero_scores_map_to_zero() {
        let analysis = analysis_after([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]], Direction::Up);
        assert_eq!(Score.extract(&analysis), 0.0);
        assert_eq!(PotentialTwoStepScore.extract(&analysis), 0.0);
        assert_eq!(NumberOfZeros.extract(&analysis), 0.0);
    }

    #[test]
    fn test_distances_use_nearest_tied_max_tile() {
        // after moving up the 8s sit at (0, 0) and (0, 3)
        let analysis = analysis_after([[8, 0, 0, 0], [0; 4], [0, 0, 0, 8], [0, 0, 0, 0]], Direction::Up);
        let max = analysis.max_tile();
        assert_eq!(max.value(), 8);
        assert_eq!(max.positions().len(), 2);
        assert_eq!(DistanceFromRight.extract(&analysis), 0.0);
        assert_eq!(DistanceFromCorner.extract(&analysis), 3.0);
    }

    #[test]
    fn test_weighted_sum() {
        let analysis = analysis_after([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]], Direction::Left);
        let features = FeatureVector::from_analysis(&analysis);
        let weights = [1.0, 0.0, 0.5, 0.0, -1.0, 0.0];
        // highest 2.0, zeros 15, distance right 3
        assert_eq!(features.weighted_sum(&weights), 2.0 + 7.5 - 3.0);
    }

    #[test]
    #[should_panic(expected = "empty grid")]
    fn test_highest_tile_on_empty_grid_panics() {
        let analysis = analysis_after([[0; 4]; 4], Direction::Left);
        let _ = HighestTile.extract(&analysis);
    }
}
