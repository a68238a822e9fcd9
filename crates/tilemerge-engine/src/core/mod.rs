//! Pure grid transition engine.
//!
//! Nothing in this module draws random numbers: applying a [`Direction`] to a
//! [`Grid`] is deterministic and never spawns a new tile. Spawning is the job
//! of a [`GameSession`](crate::GameSession).

pub use self::{direction::*, grid::*};

pub(crate) mod direction;
pub(crate) mod grid;
