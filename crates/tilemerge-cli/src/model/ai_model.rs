use std::collections::BTreeMap;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tilemerge_evaluator::grid_feature::{self, FeatureWeights};
use tilemerge_training::genetic::Genome;

/// Weights of a trained genome, as saved by `tilemerge train`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AiModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub generation: usize,
    pub max_tile: u32,
    pub final_score: u32,
    /// Feature id to weight
    pub weights: BTreeMap<String, f32>,
}

impl AiModel {
    pub(crate) fn from_genome(name: &str, genome: &Genome) -> anyhow::Result<Self> {
        let outcome = genome
            .outcome()
            .context("Cannot export a genome that has not played")?;
        Ok(Self {
            name: name.to_owned(),
            trained_at: Utc::now(),
            generation: genome.generation(),
            max_tile: outcome.max_tile,
            final_score: outcome.final_score,
            weights: grid_feature::weights_by_id(genome.weights()),
        })
    }

    pub(crate) fn to_feature_weights(&self) -> anyhow::Result<FeatureWeights> {
        grid_feature::weights_from_ids(&self.weights)
            .with_context(|| format!("Model `{}` has invalid weights", self.name))
    }
}

#[cfg(test)]
mod tests {
    use tilemerge_evaluator::game_driver::{TrialEnd, TrialOutcome};

    use super::*;

    fn trained_genome() -> Genome {
        Genome::new([0.1, 0.2, 0.3, 0.4, -0.5, -0.6], 3).evaluated(TrialOutcome {
            max_tile: 512,
            final_score: 6000,
            turns: 420,
            end: TrialEnd::Lost,
        })
    }

    #[test]
    fn test_model_round_trip() {
        let model = AiModel::from_genome("weighted", &trained_genome()).unwrap();
        assert_eq!(model.generation, 3);
        assert_eq!(model.max_tile, 512);

        let json = serde_json::to_string(&model).unwrap();
        let loaded: AiModel = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, model);
        assert_eq!(
            loaded.to_feature_weights().unwrap(),
            [0.1, 0.2, 0.3, 0.4, -0.5, -0.6]
        );
    }

    #[test]
    fn test_unplayed_genome_is_rejected() {
        let genome = Genome::new([0.0; 6], 1);
        assert!(AiModel::from_genome("weighted", &genome).is_err());
    }

    #[test]
    fn test_unknown_feature_is_rejected() {
        let mut model = AiModel::from_genome("weighted", &trained_genome()).unwrap();
        model.weights.insert("monotonicity".to_owned(), 1.0);
        let err = model.to_feature_weights().unwrap_err();
        assert!(format!("{err:#}").contains("unknown feature `monotonicity`"));
    }
}
