use crate::core::{direction::Direction, grid::Grid};

use super::{
    game_session::{GameSession, GameStatus, SessionError},
    tile_spawner::{TileSeed, TileSpawner},
};

/// Tile value that wins a standard game.
pub const DEFAULT_WIN_TILE: u32 = 2048;

/// An in-process 2048 game.
///
/// Starts with two spawned tiles. A move that changes the grid adds its score
/// and spawns one tile; a move that does not is ignored. The game is won once
/// the win tile appears (if one is set) and lost once no direction can move.
///
/// Reads never fail, so this session never returns [`SessionError`].
#[derive(Debug, Clone)]
pub struct SimulatedSession {
    grid: Grid,
    score: u32,
    moves: usize,
    win_tile: Option<u32>,
    spawner: TileSpawner,
}

impl Default for SimulatedSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSession {
    #[must_use]
    pub fn new() -> Self {
        Self::from_spawner(TileSpawner::new())
    }

    /// Like [`Self::new`], but with deterministic tile spawning.
    #[must_use]
    pub fn with_seed(seed: TileSeed) -> Self {
        Self::from_spawner(TileSpawner::with_seed(seed))
    }

    /// Starts from an existing grid and score without spawning initial tiles.
    #[must_use]
    pub fn from_grid(grid: Grid, score: u32, seed: TileSeed) -> Self {
        Self {
            grid,
            score,
            moves: 0,
            win_tile: Some(DEFAULT_WIN_TILE),
            spawner: TileSpawner::with_seed(seed),
        }
    }

    fn from_spawner(mut spawner: TileSpawner) -> Self {
        let first = spawner.spawn(Grid::EMPTY);
        let grid = spawner.spawn(first);
        Self {
            grid,
            score: 0,
            moves: 0,
            win_tile: Some(DEFAULT_WIN_TILE),
            spawner,
        }
    }

    /// Sets the tile that wins the game; `None` plays until no move is left.
    #[must_use]
    pub fn with_win_tile(mut self, win_tile: Option<u32>) -> Self {
        self.win_tile = win_tile;
        self
    }

    #[must_use]
    pub fn grid(&self) -> Grid {
        self.grid
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Number of moves that changed the grid.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.moves
    }

    #[must_use]
    pub fn game_status(&self) -> GameStatus {
        if self
            .win_tile
            .is_some_and(|win| self.grid.max_tile().value() >= win)
        {
            return GameStatus::Won;
        }
        if self.grid.is_stuck() {
            return GameStatus::Lost;
        }
        GameStatus::Ongoing
    }

    /// Applies `direction`, returning whether the grid changed.
    pub fn play(&mut self, direction: Direction) -> bool {
        let outcome = self.grid.apply(direction);
        if outcome.grid == self.grid {
            return false;
        }
        self.score = self.score.saturating_add(outcome.score_delta);
        self.moves += 1;
        self.grid = self.spawner.spawn(outcome.grid);
        true
    }
}

impl GameSession for SimulatedSession {
    fn current_grid(&mut self) -> Result<Grid, SessionError> {
        Ok(self.grid)
    }

    fn apply_move(&mut self, direction: Direction) -> Result<(), SessionError> {
        self.play(direction);
        Ok(())
    }

    fn status(&mut self) -> Result<GameStatus, SessionError> {
        Ok(self.game_status())
    }

    fn current_score(&mut self) -> Result<u32, SessionError> {
        Ok(self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_two_tiles() {
        let session = SimulatedSession::with_seed(TileSeed::from_u64(1));
        assert_eq!(session.grid().count_zeros(), 14);
        assert_eq!(session.score(), 0);
        assert!(session.game_status().is_ongoing());
    }

    #[test]
    fn test_same_seed_same_game() {
        let seed = TileSeed::from_u64(99);
        let mut a = SimulatedSession::with_seed(seed);
        let mut b = SimulatedSession::with_seed(seed);
        for dir in Direction::ALL.iter().cycle().take(40) {
            a.play(*dir);
            b.play(*dir);
        }
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.score(), b.score());
    }

    #[test]
    fn test_noop_move_does_not_spawn() {
        let grid = Grid::new([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        let mut session = SimulatedSession::from_grid(grid, 0, TileSeed::from_u64(3));
        assert!(!session.play(Direction::Left));
        assert_eq!(session.grid(), grid);
        assert_eq!(session.moves(), 0);

        assert!(session.play(Direction::Right));
        assert_eq!(session.grid().count_zeros(), 14);
        assert_eq!(session.moves(), 1);
    }

    #[test]
    fn test_merge_adds_score() {
        let grid = Grid::new([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        let mut session = SimulatedSession::from_grid(grid, 10, TileSeed::from_u64(3));
        session.apply_move(Direction::Left).unwrap();
        assert_eq!(session.current_score().unwrap(), 14);
    }

    #[test]
    fn test_status() {
        let stuck = Grid::new([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]).unwrap();
        let mut session = SimulatedSession::from_grid(stuck, 0, TileSeed::from_u64(0));
        assert_eq!(session.status().unwrap(), GameStatus::Lost);

        let won = Grid::new([[2048, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        let session = SimulatedSession::from_grid(won, 0, TileSeed::from_u64(0));
        assert_eq!(session.game_status(), GameStatus::Won);
        assert!(session.game_status().is_terminal());
        let session = session.with_win_tile(None);
        assert_eq!(session.game_status(), GameStatus::Ongoing);
    }
}
