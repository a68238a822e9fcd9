//! Records of past generations.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;
use tilemerge_evaluator::{
    game_driver::{TrialEnd, TrialOutcome},
    grid_feature,
};

use crate::genetic::{Genome, Population};

/// Score statistics of one evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub generation: usize,
    pub evaluated: usize,
    pub incomplete: usize,
    pub best_max_tile: u32,
    pub best_score: u32,
    pub mean_score: f64,
    pub min_score: u32,
}

impl GenerationSummary {
    /// Summarizes the evaluated genomes of `population`.
    ///
    /// Returns `None` if no genome has been evaluated yet.
    #[must_use]
    pub fn new(population: &Population) -> Option<Self> {
        let outcomes: Vec<&TrialOutcome> = population
            .genomes()
            .iter()
            .filter_map(Genome::outcome)
            .collect();
        let scores = || outcomes.iter().map(|o| o.final_score);
        let best_score = scores().max()?;
        let min_score = scores().min()?;
        let total: f64 = scores().map(f64::from).sum();
        #[expect(clippy::cast_precision_loss)]
        let mean_score = total / outcomes.len() as f64;
        Some(Self {
            generation: population.generation(),
            evaluated: outcomes.len(),
            incomplete: outcomes.iter().filter(|o| !o.is_complete()).count(),
            best_max_tile: outcomes.iter().map(|o| o.max_tile).max().unwrap_or(0),
            best_score,
            mean_score,
            min_score,
        })
    }
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {}: max tile {}, score best {} / mean {:.1} / min {}",
            self.generation, self.best_max_tile, self.best_score, self.mean_score, self.min_score
        )?;
        if self.incomplete > 0 {
            write!(f, ", {} incomplete", self.incomplete)?;
        }
        Ok(())
    }
}

/// Flat, serializable view of one genome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenomeRecord {
    pub generation: usize,
    pub weights: BTreeMap<String, f32>,
    pub max_tile: Option<u32>,
    pub final_score: Option<u32>,
    pub turns: Option<usize>,
    pub end: Option<TrialEnd>,
    pub completed: bool,
}

impl From<&Genome> for GenomeRecord {
    fn from(genome: &Genome) -> Self {
        let outcome = genome.outcome();
        Self {
            generation: genome.generation(),
            weights: grid_feature::weights_by_id(genome.weights()),
            max_tile: outcome.map(|o| o.max_tile),
            final_score: outcome.map(|o| o.final_score),
            turns: outcome.map(|o| o.turns),
            end: outcome.map(|o| o.end),
            completed: outcome.is_some_and(TrialOutcome::is_complete),
        }
    }
}

/// Every generation of an optimizer run, oldest first.
#[derive(Debug, Clone, Default)]
pub struct PopulationHistory {
    populations: Vec<Population>,
}

impl PopulationHistory {
    pub fn push(&mut self, population: Population) {
        self.populations.push(population);
    }

    #[must_use]
    pub fn populations(&self) -> &[Population] {
        &self.populations
    }

    #[must_use]
    pub fn last(&self) -> Option<&Population> {
        self.populations.last()
    }

    /// Best genome of the most recent generation.
    #[must_use]
    pub fn best(&self) -> Option<&Genome> {
        self.last().and_then(Population::best)
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<GenerationSummary> {
        self.populations
            .iter()
            .filter_map(GenerationSummary::new)
            .collect()
    }

    /// One record per genome, in generation order.
    #[must_use]
    pub fn records(&self) -> Vec<GenomeRecord> {
        self.populations
            .iter()
            .flat_map(Population::genomes)
            .map(GenomeRecord::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genome(final_score: u32, end: TrialEnd) -> Genome {
        Genome::new([0.5; 6], 2).evaluated(TrialOutcome {
            max_tile: final_score / 8,
            final_score,
            turns: 50,
            end,
        })
    }

    #[test]
    fn test_summary() {
        let population = Population::new(
            2,
            vec![
                genome(800, TrialEnd::Lost),
                genome(400, TrialEnd::Lost),
                genome(300, TrialEnd::SessionFailure),
                Genome::new([0.0; 6], 2),
            ],
        );
        let summary = GenerationSummary::new(&population).unwrap();
        assert_eq!(
            summary,
            GenerationSummary {
                generation: 2,
                evaluated: 3,
                incomplete: 1,
                best_max_tile: 100,
                best_score: 800,
                mean_score: 500.0,
                min_score: 300,
            }
        );
        assert_eq!(
            summary.to_string(),
            "generation 2: max tile 100, score best 800 / mean 500.0 / min 300, 1 incomplete"
        );
    }

    #[test]
    fn test_summary_of_unevaluated_population() {
        let population = Population::new(1, vec![Genome::new([0.0; 6], 1)]);
        assert_eq!(GenerationSummary::new(&population), None);
    }

    #[test]
    fn test_records_serialize() {
        let mut history = PopulationHistory::default();
        history.push(Population::new(2, vec![genome(800, TrialEnd::Won)]));
        let records = history.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].completed);

        let json = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(json["generation"], 2);
        assert_eq!(json["final_score"], 800);
        assert_eq!(json["end"], "won");
        assert_eq!(json["weights"]["highest_tile"], 0.5);
    }
}
