//! Grid model and game sessions for 2048.
//!
//! - [`core`] holds the pure 4×4 grid transition engine: sliding and merging
//!   tiles, plus the derived helpers used by search and heuristics.
//! - [`engine`] holds the [`GameSession`] contract through which an AI drives
//!   a game, and [`SimulatedSession`], an in-process implementation with
//!   seeded tile spawning.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A grid cell holds a value that is neither empty nor a power of two.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid tile value {value} at ({row}, {column}): expected 0 or a power of two up to {}", MAX_TILE_VALUE)]
pub struct InvalidGridError {
    pub value: u32,
    pub row: usize,
    pub column: usize,
}
