//! Playing a full game against a [`GameSession`] with a [`MovePolicy`].
//!
//! Each turn the driver reads the session status, grid and score, asks the
//! policy for a ranking, and applies the first direction that changes the
//! grid. Directions that would not move anything are skipped without costing
//! a turn.
//!
//! Session calls may fail transiently. A failed call restarts the current
//! turn; after `turn_attempts` consecutive failures in the same turn the game
//! is abandoned and reported as incomplete ([`TrialEnd::SessionFailure`]).
//! The attempt budget resets after every successful move.
//!
//! # Example
//!
//! ```
//! use tilemerge_engine::{SimulatedSession, TileSeed};
//! use tilemerge_evaluator::{game_driver::GameDriver, policy::PriorityPolicy};
//!
//! let mut session = SimulatedSession::with_seed(TileSeed::from_u64(1));
//! let driver = GameDriver::default().with_turn_limit(Some(50));
//! let outcome = driver.play(&mut session, &mut PriorityPolicy, &mut rand::rng());
//! assert!(outcome.is_complete());
//! assert!(outcome.turns <= 50);
//! ```

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tilemerge_engine::{Direction, GameSession, GameStatus, Grid, SessionError};
use tracing::{debug, warn};

use crate::policy::MovePolicy;

/// Consecutive failed attempts allowed for a single turn.
pub const DEFAULT_TURN_ATTEMPTS: usize = 9;

/// How a trial ended.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum TrialEnd {
    /// The session reported a win.
    #[display("won")]
    Won,
    /// The session reported a loss.
    #[display("lost")]
    Lost,
    /// No direction changed the grid although the session reported the game as ongoing.
    #[display("stuck")]
    Stuck,
    /// The configured turn limit was reached.
    #[display("turn limit")]
    TurnLimit,
    /// The session kept failing and the game was abandoned.
    #[display("session failure")]
    SessionFailure,
}

impl TrialEnd {
    #[must_use]
    pub fn is_complete(self) -> bool {
        !self.is_session_failure()
    }
}

/// Result of one game.
///
/// `max_tile` and `final_score` are the last values observed from the
/// session, also for incomplete trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub max_tile: u32,
    pub final_score: u32,
    pub turns: usize,
    pub end: TrialEnd,
}

impl TrialOutcome {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.end.is_complete()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GameDriver {
    turn_attempts: usize,
    turn_limit: Option<usize>,
}

impl Default for GameDriver {
    fn default() -> Self {
        Self::new(DEFAULT_TURN_ATTEMPTS)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Observation {
    max_tile: u32,
    score: u32,
}

#[derive(Debug)]
enum Turn {
    Moved,
    Finished(TrialEnd),
}

impl GameDriver {
    /// # Panics
    ///
    /// Panics if `turn_attempts` is zero.
    #[must_use]
    pub fn new(turn_attempts: usize) -> Self {
        assert!(turn_attempts > 0, "at least one attempt per turn is required");
        Self {
            turn_attempts,
            turn_limit: None,
        }
    }

    /// Stops the game after `turn_limit` moves, if set.
    #[must_use]
    pub fn with_turn_limit(mut self, turn_limit: Option<usize>) -> Self {
        self.turn_limit = turn_limit;
        self
    }

    #[must_use]
    pub fn turn_attempts(&self) -> usize {
        self.turn_attempts
    }

    #[must_use]
    pub fn turn_limit(&self) -> Option<usize> {
        self.turn_limit
    }

    /// Plays until the game ends, the turn limit is hit, or the session keeps failing.
    pub fn play<S, P>(&self, session: &mut S, policy: &mut P, rng: &mut dyn RngCore) -> TrialOutcome
    where
        S: GameSession + ?Sized,
        P: MovePolicy + ?Sized,
    {
        let mut observed = Observation::default();
        let mut turns = 0;
        let mut failures = 0;
        loop {
            match self.play_turn(session, policy, rng, turns, &mut observed) {
                Ok(Turn::Moved) => {
                    turns += 1;
                    failures = 0;
                }
                Ok(Turn::Finished(end)) => return observed.into_outcome(turns, end),
                Err(err) => {
                    failures += 1;
                    debug!(
                        turn = turns,
                        attempt = failures,
                        reason = err.reason(),
                        "session call failed"
                    );
                    if failures >= self.turn_attempts {
                        warn!(
                            turn = turns,
                            attempts = failures,
                            "giving up on session after repeated failures"
                        );
                        return observed.into_outcome(turns, TrialEnd::SessionFailure);
                    }
                }
            }
        }
    }

    fn play_turn<S, P>(
        &self,
        session: &mut S,
        policy: &mut P,
        rng: &mut dyn RngCore,
        turns: usize,
        observed: &mut Observation,
    ) -> Result<Turn, SessionError>
    where
        S: GameSession + ?Sized,
        P: MovePolicy + ?Sized,
    {
        let status = session.status()?;
        let grid = session.current_grid()?;
        let score = session.current_score()?;
        *observed = Observation {
            max_tile: grid.max_tile().value(),
            score,
        };

        match status {
            GameStatus::Won => return Ok(Turn::Finished(TrialEnd::Won)),
            GameStatus::Lost => return Ok(Turn::Finished(TrialEnd::Lost)),
            GameStatus::Ongoing => {}
        }
        if self.turn_limit.is_some_and(|limit| turns >= limit) {
            return Ok(Turn::Finished(TrialEnd::TurnLimit));
        }

        let Some(direction) = first_effective_move(grid, policy.rank_moves(grid, rng)) else {
            return Ok(Turn::Finished(TrialEnd::Stuck));
        };
        session.apply_move(direction)?;
        Ok(Turn::Moved)
    }
}

impl Observation {
    fn into_outcome(self, turns: usize, end: TrialEnd) -> TrialOutcome {
        TrialOutcome {
            max_tile: self.max_tile,
            final_score: self.score,
            turns,
            end,
        }
    }
}

fn first_effective_move(grid: Grid, ranking: [Direction; Direction::LEN]) -> Option<Direction> {
    ranking
        .into_iter()
        .find(|&direction| grid.apply(direction).grid != grid)
}
