//! Move selection for 2048: lookahead, grid features and policies.
//!
//! The crate is layered the same way a turn is played:
//!
//! ```text
//! Game Driver (play a whole game, retry failing sessions)
//!     ↓ asks
//! Move Policy (rank the four directions)
//!     ↓ uses
//! Move Evaluator (score one candidate move)
//!     ↓ reads
//! Grid Features ← Move Analysis ← Search Tree (two-ply lookahead)
//! ```
//!
//! - [`search_tree`] - Arena-based two-ply lookahead rebuilt every turn
//! - [`move_analysis`] - Measurements of the grid a candidate move reaches
//! - [`grid_feature`] - The six heuristic features and their fixed order
//! - [`move_evaluator`] - Linear weighted sum of features
//! - [`policy`] - The weighted policy and the baseline strategies
//! - [`game_driver`] - Game loop with no-op fallback and the per-turn retry budget
//!
//! # Example
//!
//! ```
//! use tilemerge_engine::{SimulatedSession, TileSeed};
//! use tilemerge_evaluator::{game_driver::GameDriver, policy::WeightedPolicy};
//!
//! let weights = [0.2, 0.4, 0.5, 0.3, -0.1, -0.3];
//! let mut policy = WeightedPolicy::from_weights(weights);
//! let mut session = SimulatedSession::with_seed(TileSeed::from_u64(7));
//! let outcome = GameDriver::default()
//!     .with_turn_limit(Some(20))
//!     .play(&mut session, &mut policy, &mut rand::rng());
//! assert!(outcome.max_tile >= 4);
//! ```

pub mod game_driver;
pub mod grid_feature;
pub mod move_analysis;
pub mod move_evaluator;
pub mod policy;
pub mod search_tree;
