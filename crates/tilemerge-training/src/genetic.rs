//! Evolutionary algorithm over feature weights.
//!
//! A generation is a [`Population`] of [`Genome`]s. Each genome plays one full
//! game with a [`WeightedPolicy`] built from its weights, and the game's
//! [`TrialOutcome`] is written into the genome exactly once.
//! [`PopulationEvolver::evolve`] then derives the next generation:
//!
//! 1. **Ranking** - Genomes are ordered by [`Fitness`]: max tile, then final
//!    score, both descending. Incomplete trials rank below every completed one.
//! 2. **Elitism** - The best `elite_count` genomes move to the next generation
//!    unchanged, keeping their outcome, so they are not replayed.
//! 3. **Culling** - The worst `elite_count` genomes and every incomplete trial
//!    are excluded from breeding.
//! 4. **Parent sampling** - Accept/reject: a uniformly drawn candidate is
//!    accepted if a uniform integer below the pool's best final score is
//!    smaller than the candidate's own score. Better scores are accepted more
//!    often and the best genome is always accepted, so sampling terminates.
//! 5. **Breeding** - Uniform crossover of two parents followed by uniform
//!    mutation (see [`weights`]).
//!
//! # Example
//!
//! ```
//! use tilemerge_engine::{SimulatedSession, TileSeed};
//! use tilemerge_evaluator::game_driver::GameDriver;
//! use tilemerge_training::genetic::{Population, PopulationEvolver};
//!
//! let mut rng = rand::rng();
//! let mut population = Population::random(4, 0.5, &mut rng);
//! let driver = GameDriver::default().with_turn_limit(Some(30));
//! population.evaluate(&|| SimulatedSession::with_seed(TileSeed::from_u64(1)), &driver);
//!
//! let evolver = PopulationEvolver {
//!     elite_count: 1,
//!     mutation_rate: 0.05,
//!     mutation_magnitude: 0.2,
//! };
//! let next = evolver.evolve(&population, &mut rng)?;
//! assert_eq!(next.generation(), 2);
//! assert_eq!(next.genomes().len(), 4);
//! # Ok::<(), tilemerge_training::genetic::EvolveError>(())
//! ```

use std::{mem, panic, thread};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tilemerge_engine::GameSession;
use tilemerge_evaluator::{
    game_driver::{GameDriver, TrialOutcome},
    grid_feature::FeatureWeights,
    policy::WeightedPolicy,
};
use tracing::warn;

use crate::weights;

/// Creates a fresh game session for every trial.
///
/// Any `Fn() -> S + Sync` closure is a factory. Each trial runs on its own
/// thread and builds its own session, so sessions need not be `Send`.
pub trait SessionFactory: Sync {
    type Session: GameSession;

    fn create_session(&self) -> Self::Session;
}

impl<F, S> SessionFactory for F
where
    F: Fn() -> S + Sync,
    S: GameSession,
{
    type Session = S;

    fn create_session(&self) -> S {
        self()
    }
}

/// Ranking key of an evaluated genome.
///
/// Variant order makes every completed trial rank above every incomplete one;
/// within a variant, max tile is compared before final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Fitness {
    Incomplete { max_tile: u32, final_score: u32 },
    Completed { max_tile: u32, final_score: u32 },
}

impl From<&TrialOutcome> for Fitness {
    fn from(outcome: &TrialOutcome) -> Self {
        let TrialOutcome {
            max_tile,
            final_score,
            ..
        } = *outcome;
        if outcome.is_complete() {
            Self::Completed {
                max_tile,
                final_score,
            }
        } else {
            Self::Incomplete {
                max_tile,
                final_score,
            }
        }
    }
}

impl Fitness {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    #[must_use]
    pub fn final_score(&self) -> u32 {
        match *self {
            Self::Incomplete { final_score, .. } | Self::Completed { final_score, .. } => {
                final_score
            }
        }
    }
}

/// One candidate weight vector.
///
/// The outcome is unset until the genome has played, and set exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    weights: FeatureWeights,
    generation: usize,
    outcome: Option<TrialOutcome>,
}

impl Genome {
    #[must_use]
    pub fn new(weights: FeatureWeights, generation: usize) -> Self {
        Self {
            weights,
            generation,
            outcome: None,
        }
    }

    #[must_use]
    pub fn random<R>(rng: &mut R, half_width: f32, generation: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(weights::random(rng, half_width), generation)
    }

    #[must_use]
    pub fn weights(&self) -> &FeatureWeights {
        &self.weights
    }

    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&TrialOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn fitness(&self) -> Option<Fitness> {
        self.outcome.as_ref().map(Fitness::from)
    }

    /// Returns this genome with its trial outcome recorded.
    ///
    /// # Panics
    ///
    /// Panics if the genome has already been evaluated.
    #[must_use]
    pub fn evaluated(self, outcome: TrialOutcome) -> Self {
        assert!(
            self.outcome.is_none(),
            "genome outcome can only be recorded once"
        );
        Self {
            outcome: Some(outcome),
            ..self
        }
    }

    /// Same weights and outcome, one generation later.
    fn carried_over(&self) -> Self {
        Self {
            generation: self.generation + 1,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EvolveError {
    #[display("generation {generation} still has unevaluated genomes")]
    Unevaluated { generation: usize },
    #[display("need at least 2 eligible parents to breed, found {eligible}")]
    InsufficientParents { eligible: usize },
}

/// All genomes of one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    generation: usize,
    genomes: Vec<Genome>,
}

impl Population {
    /// Creates generation 1 with `count` random genomes.
    #[must_use]
    pub fn random<R>(count: usize, half_width: f32, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let generation = 1;
        let genomes = (0..count)
            .map(|_| Genome::random(rng, half_width, generation))
            .collect();
        Self {
            generation,
            genomes,
        }
    }

    /// # Panics
    ///
    /// Panics if a genome belongs to a different generation.
    #[must_use]
    pub fn new(generation: usize, genomes: Vec<Genome>) -> Self {
        assert!(
            genomes.iter().all(|g| g.generation == generation),
            "all genomes must belong to generation {generation}"
        );
        Self {
            generation,
            genomes,
        }
    }

    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Genomes, best first once the population has been evaluated.
    #[must_use]
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        self.genomes.iter().all(|g| g.outcome.is_some())
    }

    /// Best genome by fitness, if any genome has been evaluated.
    #[must_use]
    pub fn best(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .filter(|g| g.outcome.is_some())
            .max_by_key(|g| g.fitness())
    }

    /// Plays one game for every unevaluated genome, in parallel.
    ///
    /// Every trial runs on its own thread with its own session from
    /// `factory`; genomes that already carry an outcome are skipped. Afterwards
    /// the genomes are sorted by fitness, best first.
    pub fn evaluate<F>(&mut self, factory: &F, driver: &GameDriver)
    where
        F: SessionFactory + ?Sized,
    {
        let outcomes: Vec<Option<TrialOutcome>> = thread::scope(|s| {
            let handles: Vec<_> = self
                .genomes
                .iter()
                .map(|genome| {
                    genome.outcome.is_none().then(|| {
                        let weights = genome.weights;
                        s.spawn(move || {
                            let mut session = factory.create_session();
                            let mut policy = WeightedPolicy::from_weights(weights);
                            driver.play(&mut session, &mut policy, &mut rand::rng())
                        })
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle.map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                })
                .collect()
        });

        let genomes = mem::take(&mut self.genomes);
        self.genomes = genomes
            .into_iter()
            .zip(outcomes)
            .map(|(genome, outcome)| match outcome {
                Some(outcome) => {
                    if !outcome.is_complete() {
                        warn!(
                            generation = self.generation,
                            turns = outcome.turns,
                            "trial ended incomplete after repeated session failures"
                        );
                    }
                    genome.evaluated(outcome)
                }
                None => genome,
            })
            .collect();
        self.genomes.sort_by(|a, b| b.fitness().cmp(&a.fitness()));
    }
}

/// Controls how the next generation is derived.
#[derive(Debug, Clone)]
pub struct PopulationEvolver {
    /// Number of best genomes carried over and worst genomes excluded from breeding
    pub elite_count: usize,
    /// Probability of mutating each weight of a child
    pub mutation_rate: f64,
    /// Maximum absolute mutation offset
    pub mutation_magnitude: f32,
}

impl PopulationEvolver {
    /// Creates the next generation, of the same size as `population`.
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Result<Population, EvolveError>
    where
        R: Rng + ?Sized,
    {
        if !population.is_evaluated() {
            return Err(EvolveError::Unevaluated {
                generation: population.generation,
            });
        }

        let mut ranked: Vec<&Genome> = population.genomes.iter().collect();
        ranked.sort_by(|a, b| b.fitness().cmp(&a.fitness()));

        let size = ranked.len();
        let elite_count = self.elite_count.min(size);
        let eligible: Vec<&Genome> = ranked[..size - elite_count]
            .iter()
            .copied()
            .filter(|g| g.fitness().is_some_and(|f| f.is_completed()))
            .collect();

        let mut genomes: Vec<Genome> = ranked[..elite_count]
            .iter()
            .map(|g| g.carried_over())
            .collect();
        if genomes.len() < size && eligible.len() < 2 {
            return Err(EvolveError::InsufficientParents {
                eligible: eligible.len(),
            });
        }

        let generation = population.generation + 1;
        while genomes.len() < size {
            let p1 = select_parent(&eligible, rng);
            let p2 = select_parent(&eligible, rng);
            let mut child = weights::uniform_crossover(&p1.weights, &p2.weights, rng);
            weights::mutate(
                &mut child,
                self.mutation_magnitude,
                self.mutation_rate,
                rng,
            );
            genomes.push(Genome::new(child, generation));
        }

        Ok(Population {
            generation,
            genomes,
        })
    }
}

fn final_score(genome: &Genome) -> u32 {
    genome.fitness().map_or(0, |f| f.final_score())
}

/// Accept/reject sampling weighted by final score.
///
/// Falls back to a uniform draw when no genome in the pool has scored.
fn select_parent<'a, R>(pool: &[&'a Genome], rng: &mut R) -> &'a Genome
where
    R: Rng + ?Sized,
{
    assert!(!pool.is_empty(), "parent pool must not be empty");
    let max_score = pool.iter().map(|g| final_score(g)).max().unwrap_or(0);
    loop {
        let candidate = pool[rng.random_range(0..pool.len())];
        if max_score == 0 {
            return candidate;
        }
        if rng.random_range(0..max_score) < final_score(candidate) {
            return candidate;
        }
    }
}
