//! Optimizer parameters.

use serde::{Deserialize, Serialize};
use tilemerge_evaluator::game_driver::{DEFAULT_TURN_ATTEMPTS, GameDriver};

/// Parameters of an optimizer run.
///
/// Every field has a default, so a partial JSON object is a valid configuration:
///
/// ```
/// use tilemerge_training::config::OptimizerConfig;
///
/// let config: OptimizerConfig = serde_json::from_str(r#"{"population_size": 12}"#)?;
/// assert_eq!(config.population_size, 12);
/// assert_eq!(config.elite_count, 1);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Genomes per generation
    pub population_size: usize,
    /// Number of generations to evaluate
    pub max_generations: usize,
    /// Best genomes carried over unchanged, and worst genomes excluded from breeding
    pub elite_count: usize,
    /// Initial weights are drawn from `[-weight_half_width, weight_half_width)`
    pub weight_half_width: f32,
    /// Probability of mutating each weight of a child
    pub mutation_rate: f64,
    /// Mutation offsets are drawn from `[-mutation_magnitude, mutation_magnitude]`
    pub mutation_magnitude: f32,
    /// Consecutive failed attempts allowed for a single turn
    pub turn_attempts: usize,
    /// Optional cap on turns per game
    pub turn_limit: Option<usize>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 5,
            max_generations: 1,
            elite_count: 1,
            weight_half_width: 0.5,
            mutation_rate: 0.05,
            mutation_magnitude: 0.2,
            turn_attempts: DEFAULT_TURN_ATTEMPTS,
            turn_limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display("at least one generation is required")]
    NoGenerations,
    #[display("elite count {elite_count} must be smaller than population size {population_size}")]
    TooManyElites {
        elite_count: usize,
        population_size: usize,
    },
    #[display("weight half width must be positive and finite, got {_0}")]
    InvalidHalfWidth(#[error(not(source))] f32),
    #[display("mutation rate must be within [0, 1], got {_0}")]
    InvalidMutationRate(#[error(not(source))] f64),
    #[display("mutation magnitude must be non-negative and finite, got {_0}")]
    InvalidMutationMagnitude(#[error(not(source))] f32),
    #[display("at least one attempt per turn is required")]
    NoTurnAttempts,
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.max_generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if self.population_size <= self.elite_count {
            return Err(ConfigError::TooManyElites {
                elite_count: self.elite_count,
                population_size: self.population_size,
            });
        }
        if !(self.weight_half_width.is_finite() && self.weight_half_width > 0.0) {
            return Err(ConfigError::InvalidHalfWidth(self.weight_half_width));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::InvalidMutationRate(self.mutation_rate));
        }
        if !(self.mutation_magnitude.is_finite() && self.mutation_magnitude >= 0.0) {
            return Err(ConfigError::InvalidMutationMagnitude(
                self.mutation_magnitude,
            ));
        }
        if self.turn_attempts == 0 {
            return Err(ConfigError::NoTurnAttempts);
        }
        Ok(())
    }

    /// Game driver playing every trial of the run.
    ///
    /// # Panics
    ///
    /// Panics if `turn_attempts` is zero; call [`Self::validate`] first.
    #[must_use]
    pub fn game_driver(&self) -> GameDriver {
        GameDriver::new(self.turn_attempts).with_turn_limit(self.turn_limit)
    }
}
