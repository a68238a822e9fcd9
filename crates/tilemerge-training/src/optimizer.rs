//! Generation loop of an optimizer run.

use rand::Rng;
use tracing::{info, warn};

use crate::{
    config::{ConfigError, OptimizerConfig},
    genetic::{EvolveError, Population, PopulationEvolver, SessionFactory},
    history::{GenerationSummary, PopulationHistory},
};

/// Runs the evolutionary loop for a validated [`OptimizerConfig`].
///
/// Generations are processed strictly one after another: every genome of the
/// current generation is evaluated before the next one is bred. The run stops
/// after generation `max_generations` has been evaluated.
///
/// # Example
///
/// ```
/// use tilemerge_engine::SimulatedSession;
/// use tilemerge_training::{config::OptimizerConfig, optimizer::Optimizer};
///
/// let config = OptimizerConfig {
///     population_size: 4,
///     max_generations: 2,
///     turn_limit: Some(30),
///     ..Default::default()
/// };
/// let optimizer = Optimizer::new(config)?;
/// let history = optimizer.run(&SimulatedSession::new, &mut rand::rng())?;
/// assert_eq!(history.populations().len(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Optimizer {
    config: OptimizerConfig,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    #[must_use]
    pub fn evolver(&self) -> PopulationEvolver {
        PopulationEvolver {
            elite_count: self.config.elite_count,
            mutation_rate: self.config.mutation_rate,
            mutation_magnitude: self.config.mutation_magnitude,
        }
    }

    /// Evaluates and breeds generations until `max_generations` is reached.
    pub fn run<F, R>(&self, factory: &F, rng: &mut R) -> Result<PopulationHistory, EvolveError>
    where
        F: SessionFactory + ?Sized,
        R: Rng + ?Sized,
    {
        let driver = self.config.game_driver();
        let evolver = self.evolver();
        let mut history = PopulationHistory::default();
        let mut population = Population::random(
            self.config.population_size,
            self.config.weight_half_width,
            rng,
        );

        loop {
            population.evaluate(factory, &driver);
            if let Some(summary) = GenerationSummary::new(&population) {
                log_summary(&summary);
            }
            if population.generation() >= self.config.max_generations {
                history.push(population);
                return Ok(history);
            }
            let next = evolver.evolve(&population, rng)?;
            history.push(population);
            population = next;
        }
    }
}

fn log_summary(summary: &GenerationSummary) {
    info!(
        generation = summary.generation,
        best_max_tile = summary.best_max_tile,
        best_score = summary.best_score,
        mean_score = summary.mean_score,
        min_score = summary.min_score,
        "generation evaluated"
    );
    if summary.incomplete > 0 {
        warn!(
            generation = summary.generation,
            incomplete = summary.incomplete,
            evaluated = summary.evaluated,
            "some trials did not complete"
        );
    }
}
