//! Evolutionary optimization of the weighted policy's feature weights.
//!
//! Each candidate weight vector (a [`genetic::Genome`]) plays one full game
//! against a fresh session, and its max tile and final score decide whether
//! it survives and breeds.
//!
//! # How Training Works
//!
//! 1. **Initialize** - Generation 1 gets random weights in `[-h, h)`
//! 2. **Evaluate** - Every genome plays one game in parallel with the others
//! 3. **Select** - Elites carry over, the worst are culled, parents are sampled
//!    by accept/reject on final score
//! 4. **Breed** - Uniform crossover plus occasional uniform mutation
//! 5. **Repeat** - Until `max_generations` generations have been evaluated
//!
//! # Architecture
//!
//! ```text
//! Optimizer (generation loop, logging)
//!     ↓ evaluates
//! Population (parallel trials)
//!     ↓ plays with
//! Weighted Policy (tilemerge-evaluator)
//!     ↓ against
//! Game Session (from the injected factory)
//! ```
//!
//! - [`config`] - [`config::OptimizerConfig`] and its validation
//! - [`genetic`] - Genomes, fitness, populations and breeding
//! - [`weights`] - Initialization, crossover and mutation of weight vectors
//! - [`history`] - Per-generation summaries and serializable genome records
//! - [`optimizer`] - The generation loop
//!
//! # Example
//!
//! ```
//! use tilemerge_engine::{SimulatedSession, TileSeed};
//! use tilemerge_training::{config::OptimizerConfig, optimizer::Optimizer};
//!
//! let config = OptimizerConfig {
//!     population_size: 3,
//!     turn_limit: Some(20),
//!     ..Default::default()
//! };
//! let optimizer = Optimizer::new(config)?;
//! let factory = || SimulatedSession::with_seed(TileSeed::from_u64(42));
//! let history = optimizer.run(&factory, &mut rand::rng())?;
//!
//! let best = history.best().expect("one generation was evaluated");
//! println!("best weights: {:?}", best.weights());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Current Limitations
//!
//! - **One game per genome**: Fitness comes from a single trial, so a lucky
//!   spawn sequence can carry a weak genome into the next generation
//! - **Scalar parent sampling**: Ranking is lexicographic on (max tile, score),
//!   but accept/reject sampling only looks at the final score

pub mod config;
pub mod genetic;
pub mod history;
pub mod optimizer;
pub mod weights;
