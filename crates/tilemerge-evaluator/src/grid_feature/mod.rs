//! Heuristic features of a candidate move.
//!
//! Each feature maps a [`MoveAnalysis`] to one real value. Six features are
//! defined (see [`source`]); [`ALL_GRID_FEATURES`] fixes their order, which is
//! also the order of the weights in a genome.
//!
//! | id | value |
//! |---|---|
//! | `highest_tile` | log2 of the maximum tile |
//! | `score` | log2 of the move's score (0 if nothing merged) |
//! | `number_of_zeros` | count of empty cells |
//! | `potential_two_step_score` | log2 of move score plus best next score (0 if both are 0) |
//! | `distance_from_right` | columns between the nearest max tile and the right wall |
//! | `distance_from_corner` | Manhattan distance from the nearest max tile to the lower-right corner |
//!
//! Score and tile values grow as powers of two, so they enter the linear
//! model on a log2 scale to stay comparable with counts and distances.

use std::{collections::BTreeMap, fmt, iter};

use crate::move_analysis::MoveAnalysis;

pub use self::source::{
    DistanceFromCorner, DistanceFromRight, HighestTile, NumberOfZeros, PotentialTwoStepScore,
    Score,
};

pub mod source;

/// Number of heuristic features.
pub const FEATURE_COUNT: usize = 6;

/// One weight per feature, in [`ALL_GRID_FEATURES`] order.
pub type FeatureWeights = [f32; FEATURE_COUNT];

pub const ALL_GRID_FEATURES: [&dyn GridFeature; FEATURE_COUNT] = [
    &HighestTile,
    &Score,
    &NumberOfZeros,
    &PotentialTwoStepScore,
    &DistanceFromRight,
    &DistanceFromCorner,
];

pub trait GridFeature: fmt::Debug + Send + Sync {
    #[must_use]
    fn id(&self) -> &'static str;
    /// Human-readable label, used when printing weights.
    #[must_use]
    fn name(&self) -> &'static str;
    #[must_use]
    fn extract(&self, analysis: &MoveAnalysis) -> f32;
}

/// Returns the position of the feature with `id` in [`ALL_GRID_FEATURES`].
#[must_use]
pub fn feature_index(id: &str) -> Option<usize> {
    ALL_GRID_FEATURES.iter().position(|f| f.id() == id)
}

/// A weight map did not name every feature exactly once.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum FeatureWeightsError {
    #[display("unknown feature `{id}`")]
    UnknownFeature { id: String },
    #[display("missing weight for feature `{id}`")]
    MissingFeature { id: &'static str },
}

/// Names each weight by its feature id.
#[must_use]
pub fn weights_by_id(weights: &FeatureWeights) -> BTreeMap<String, f32> {
    iter::zip(ALL_GRID_FEATURES, weights)
        .map(|(f, w)| (f.id().to_owned(), *w))
        .collect()
}

/// Inverse of [`weights_by_id`].
pub fn weights_from_ids(by_id: &BTreeMap<String, f32>) -> Result<FeatureWeights, FeatureWeightsError> {
    if let Some(id) = by_id.keys().find(|id| feature_index(id).is_none()) {
        return Err(FeatureWeightsError::UnknownFeature { id: id.clone() });
    }
    let mut weights = [0.0; FEATURE_COUNT];
    for (weight, feature) in iter::zip(&mut weights, ALL_GRID_FEATURES) {
        *weight = *by_id
            .get(feature.id())
            .ok_or(FeatureWeightsError::MissingFeature { id: feature.id() })?;
    }
    Ok(weights)
}

/// Values of all features for one move, in [`ALL_GRID_FEATURES`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    #[must_use]
    pub fn from_analysis(analysis: &MoveAnalysis) -> Self {
        Self(ALL_GRID_FEATURES.map(|f| f.extract(analysis)))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<f32> {
        feature_index(id).map(|i| self.0[i])
    }

    /// Weighted sum `Σ valueᵢ × weightᵢ`.
    #[must_use]
    pub fn weighted_sum(&self, weights: &FeatureWeights) -> f32 {
        iter::zip(&self.0, weights).map(|(v, w)| v * w).sum()
    }
}
