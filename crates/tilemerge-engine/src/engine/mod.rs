//! Game sessions: the boundary between the AI and a running game.
//!
//! - [`GameSession`] - Contract for anything that can report a grid and accept moves
//! - [`SimulatedSession`] - In-process 2048 game implementing [`GameSession`]
//! - [`TileSpawner`] - Seeded random tile placement used by the simulated game
//! - [`TileSeed`] - Seed for deterministic tile spawning
//!
//! # Example
//!
//! ```
//! use tilemerge_engine::{Direction, GameSession, SimulatedSession};
//!
//! let mut session = SimulatedSession::new();
//! let before = session.current_grid()?;
//! session.apply_move(Direction::Left)?;
//! let after = session.current_grid()?;
//! assert!(after.count_zeros() <= before.count_zeros() + 1);
//! # Ok::<(), tilemerge_engine::SessionError>(())
//! ```

pub use self::{game_session::*, simulated_session::*, tile_spawner::*};

mod game_session;
mod simulated_session;
mod tile_spawner;
