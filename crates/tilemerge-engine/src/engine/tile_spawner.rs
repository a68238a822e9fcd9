use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::IndexedRandom as _,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::core::grid::Grid;

/// Probability that a spawned tile is a 4 rather than a 2.
pub const FOUR_TILE_PROBABILITY: f64 = 0.1;

/// Seed for deterministic tile spawning.
///
/// Written as 32 lowercase hex digits, both by `Display` and in JSON, so a
/// recorded game can be replayed from its seed. Two spawners built from the
/// same seed place the same tiles given the same grids.
///
/// # Example
///
/// ```
/// use tilemerge_engine::{SimulatedSession, TileSeed};
/// use rand::Rng as _;
///
/// let seed: TileSeed = rand::rng().random();
/// let replayed: TileSeed = seed.to_string().parse()?;
/// let a = SimulatedSession::with_seed(seed);
/// let b = SimulatedSession::with_seed(replayed);
/// assert_eq!(a.grid(), b.grid());
/// # Ok::<(), tilemerge_engine::ParseTileSeedError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TileSeed(u128);

/// A tile seed string is not exactly 32 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("tile seed must be 32 hex digits, got `{input}`")]
pub struct ParseTileSeedError {
    input: String,
}

impl TileSeed {
    /// Builds a seed from a small integer, e.g. a trial index.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self(u128::from(value))
    }
}

impl fmt::Display for TileSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl FromStr for TileSeed {
    type Err = ParseTileSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseTileSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(error());
        }
        u128::from_str_radix(s, 16).map(Self).map_err(|_| error())
    }
}

impl From<TileSeed> for String {
    fn from(seed: TileSeed) -> Self {
        seed.to_string()
    }
}

impl TryFrom<String> for TileSeed {
    type Error = ParseTileSeedError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Distribution<TileSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TileSeed {
        TileSeed(rng.random())
    }
}

/// Places new tiles on empty cells: a 2 with probability 0.9, otherwise a 4.
#[derive(Debug, Clone)]
pub struct TileSpawner {
    rng: Pcg32,
}

impl Default for TileSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSpawner {
    /// Creates a spawner seeded from the thread-local RNG.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: TileSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0.to_be_bytes()),
        }
    }

    /// Returns `grid` with one new tile on a random empty cell.
    ///
    /// A full grid is returned unchanged.
    pub fn spawn(&mut self, grid: Grid) -> Grid {
        let empty = grid.empty_positions();
        let Some(&position) = empty.choose(&mut self.rng) else {
            return grid;
        };
        let value = if self.rng.random_bool(FOUR_TILE_PROBABILITY) {
            4
        } else {
            2
        };
        grid.with_tile(position, value)
            .expect("2 and 4 are valid tile values")
    }
}
