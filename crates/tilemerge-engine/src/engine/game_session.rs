use serde::{Deserialize, Serialize};

use crate::core::{direction::Direction, grid::Grid};

/// Whether a game is still running, and how it ended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[display("ongoing")]
    Ongoing,
    #[display("won")]
    Won,
    #[display("lost")]
    Lost,
}

impl GameStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !self.is_ongoing()
    }
}

/// A session failed to read or write game state for a reason that may go away on retry.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("transient session failure: {reason}")]
pub struct SessionError {
    reason: String,
}

impl SessionError {
    #[must_use]
    pub fn transient<S>(reason: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A running 2048 game that an AI can observe and drive.
///
/// Implementations may talk to an external surface, so every call can fail
/// with a [`SessionError`]. Callers are expected to retry such failures.
///
/// After [`apply_move`](Self::apply_move) succeeds, [`current_grid`](Self::current_grid)
/// must reflect the state after the move and after the new tile has spawned.
/// A move that does not change the grid is allowed and leaves the game as is.
pub trait GameSession {
    fn current_grid(&mut self) -> Result<Grid, SessionError>;

    fn apply_move(&mut self, direction: Direction) -> Result<(), SessionError>;

    fn status(&mut self) -> Result<GameStatus, SessionError>;

    fn current_score(&mut self) -> Result<u32, SessionError>;
}

impl<S> GameSession for &mut S
where
    S: GameSession + ?Sized,
{
    fn current_grid(&mut self) -> Result<Grid, SessionError> {
        (**self).current_grid()
    }

    fn apply_move(&mut self, direction: Direction) -> Result<(), SessionError> {
        (**self).apply_move(direction)
    }

    fn status(&mut self) -> Result<GameStatus, SessionError> {
        (**self).status()
    }

    fn current_score(&mut self) -> Result<u32, SessionError> {
        (**self).current_score()
    }
}
