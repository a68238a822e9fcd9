use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::InvalidGridError;

use super::direction::Direction;

/// Width and height of the grid.
pub const GRID_SIZE: usize = 4;

/// Total number of cells in the grid.
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Largest tile a grid may hold, the highest value reachable on a 4×4 board.
///
/// Two tiles of this value never merge.
pub const MAX_TILE_VALUE: u32 = 1 << 17;

/// Row/column coordinate of a cell, both 0-indexed from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    row: usize,
    column: usize,
}

impl Position {
    /// # Panics
    ///
    /// Panics if `row` or `column` is not below [`GRID_SIZE`].
    #[must_use]
    pub const fn new(row: usize, column: usize) -> Self {
        assert!(
            row < GRID_SIZE && column < GRID_SIZE,
            "position out of the grid"
        );
        Self { row, column }
    }

    #[must_use]
    pub const fn row(self) -> usize {
        self.row
    }

    #[must_use]
    pub const fn column(self) -> usize {
        self.column
    }

    /// Number of columns between this cell and the right wall.
    #[must_use]
    pub const fn distance_to_right_wall(self) -> usize {
        GRID_SIZE - 1 - self.column
    }

    /// Manhattan distance to the lower-right corner cell.
    #[must_use]
    pub const fn distance_to_lower_right_corner(self) -> usize {
        2 * (GRID_SIZE - 1) - self.row - self.column
    }
}

/// Minimum distance to the right wall over `positions`.
///
/// Returns `None` if `positions` is empty.
#[must_use]
pub fn distance_to_right_wall(positions: &[Position]) -> Option<usize> {
    positions
        .iter()
        .map(|p| p.distance_to_right_wall())
        .min()
}

/// Minimum Manhattan distance to the lower-right corner over `positions`.
///
/// Returns `None` if `positions` is empty.
#[must_use]
pub fn distance_to_lower_right_corner(positions: &[Position]) -> Option<usize> {
    positions
        .iter()
        .map(|p| p.distance_to_lower_right_corner())
        .min()
}

/// The resulting grid and the score gained by applying one direction once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub grid: Grid,
    pub score_delta: u32,
}

/// The largest tile value on a grid and every position holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxTile {
    value: u32,
    positions: ArrayVec<Position, CELL_COUNT>,
}

impl MaxTile {
    #[must_use]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Positions holding the maximum value, in row-major order. Never empty.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    #[must_use]
    pub fn distance_to_right_wall(&self) -> usize {
        distance_to_right_wall(&self.positions).expect("max tile always has a position")
    }

    #[must_use]
    pub fn distance_to_lower_right_corner(&self) -> usize {
        distance_to_lower_right_corner(&self.positions).expect("max tile always has a position")
    }
}

/// Outcomes of all four directions applied to the same grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllMoves([MoveOutcome; Direction::LEN]);

impl AllMoves {
    #[must_use]
    pub fn get(&self, direction: Direction) -> &MoveOutcome {
        &self.0[direction.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, &MoveOutcome)> + '_ {
        Direction::ALL.into_iter().zip(&self.0)
    }
}

/// A 4×4 board of tile values.
///
/// Every cell is either 0 (empty) or a power of two from 2 up to
/// [`MAX_TILE_VALUE`]. The invariant is checked once in [`Grid::new`]; all
/// other operations rely on it and preserve it.
///
/// # Example
///
/// ```
/// use tilemerge_engine::{Direction, Grid};
///
/// let grid = Grid::new([
///     [2, 2, 0, 0],
///     [0, 0, 0, 0],
///     [0, 0, 0, 0],
///     [0, 0, 0, 0],
/// ])?;
/// let outcome = grid.apply(Direction::Right);
/// assert_eq!(outcome.grid.cells()[0], [0, 0, 0, 4]);
/// assert_eq!(outcome.score_delta, 4);
/// # Ok::<(), tilemerge_engine::InvalidGridError>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "[[u32; 4]; 4]", into = "[[u32; 4]; 4]")]
pub struct Grid {
    cells: [[u32; GRID_SIZE]; GRID_SIZE],
}

impl TryFrom<[[u32; GRID_SIZE]; GRID_SIZE]> for Grid {
    type Error = InvalidGridError;

    fn try_from(cells: [[u32; GRID_SIZE]; GRID_SIZE]) -> Result<Self, Self::Error> {
        Self::new(cells)
    }
}

impl From<Grid> for [[u32; GRID_SIZE]; GRID_SIZE] {
    fn from(grid: Grid) -> Self {
        grid.cells
    }
}

impl Grid {
    pub const EMPTY: Self = Self {
        cells: [[0; GRID_SIZE]; GRID_SIZE],
    };

    /// Creates a grid after checking every cell is 0 or a power of two in
    /// `2..=MAX_TILE_VALUE`.
    pub fn new(cells: [[u32; GRID_SIZE]; GRID_SIZE]) -> Result<Self, InvalidGridError> {
        for (row, line) in cells.iter().enumerate() {
            for (column, &value) in line.iter().enumerate() {
                if !is_valid_tile(value) {
                    return Err(InvalidGridError { value, row, column });
                }
            }
        }
        Ok(Self { cells })
    }

    #[must_use]
    pub fn cells(&self) -> &[[u32; GRID_SIZE]; GRID_SIZE] {
        &self.cells
    }

    #[must_use]
    pub fn get(&self, position: Position) -> u32 {
        self.cells[position.row][position.column]
    }

    /// Returns a copy of this grid with `value` placed at `position`.
    pub fn with_tile(self, position: Position, value: u32) -> Result<Self, InvalidGridError> {
        if !is_valid_tile(value) {
            return Err(InvalidGridError {
                value,
                row: position.row,
                column: position.column,
            });
        }
        let mut cells = self.cells;
        cells[position.row][position.column] = value;
        Ok(Self { cells })
    }

    /// Slides and merges every line toward `direction`.
    ///
    /// Each tile merges at most once per application. The result may equal
    /// `self` (a no-op move); whether such a move is legal is up to the
    /// session, not the engine.
    #[must_use]
    pub fn apply(self, direction: Direction) -> MoveOutcome {
        let mut cells = [[0; GRID_SIZE]; GRID_SIZE];
        let mut score_delta = 0;
        for line in 0..GRID_SIZE {
            let values = std::array::from_fn(|offset| {
                let p = line_position(direction, line, offset);
                self.cells[p.row][p.column]
            });
            let (slid, score) = slide_line(values);
            score_delta += score;
            for (offset, value) in slid.into_iter().enumerate() {
                let p = line_position(direction, line, offset);
                cells[p.row][p.column] = value;
            }
        }
        MoveOutcome {
            grid: Self { cells },
            score_delta,
        }
    }

    /// Applies each of the four directions to this grid.
    #[must_use]
    pub fn all_moves(self) -> AllMoves {
        AllMoves(Direction::ALL.map(|dir| self.apply(dir)))
    }

    /// Returns whether no direction changes the grid.
    #[must_use]
    pub fn is_stuck(self) -> bool {
        Direction::ALL
            .into_iter()
            .all(|dir| self.apply(dir).grid == self)
    }

    /// Maximum cell value and all positions attaining it.
    ///
    /// On an all-empty grid the value is 0 and every position ties.
    #[must_use]
    pub fn max_tile(&self) -> MaxTile {
        let value = self.cells.iter().flatten().copied().max().unwrap_or(0);
        let positions = all_positions()
            .filter(|p| self.get(*p) == value)
            .collect();
        MaxTile { value, positions }
    }

    #[must_use]
    pub fn count_zeros(&self) -> usize {
        self.cells.iter().flatten().filter(|v| **v == 0).count()
    }

    #[must_use]
    pub fn empty_positions(&self) -> ArrayVec<Position, CELL_COUNT> {
        all_positions().filter(|p| self.get(*p) == 0).collect()
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Grid").field(&self.cells).finish()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, value) in line.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                if *value == 0 {
                    write!(f, "{:>6}", ".")?;
                } else {
                    write!(f, "{value:>6}")?;
                }
            }
        }
        Ok(())
    }
}

fn all_positions() -> impl Iterator<Item = Position> {
    (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |column| Position { row, column }))
}

fn is_valid_tile(value: u32) -> bool {
    value == 0 || ((2..=MAX_TILE_VALUE).contains(&value) && value.is_power_of_two())
}

/// Maps the `offset`-th cell of `line`, counted from the pulled end, to a grid position.
const fn line_position(direction: Direction, line: usize, offset: usize) -> Position {
    let last = GRID_SIZE - 1;
    match direction {
        Direction::Left => Position::new(line, offset),
        Direction::Right => Position::new(line, last - offset),
        Direction::Up => Position::new(offset, line),
        Direction::Down => Position::new(last - offset, line),
    }
}

/// Compacts `line` toward index 0, merging equal neighbours once each.
///
/// Tiles at [`MAX_TILE_VALUE`] do not merge.
fn slide_line(line: [u32; GRID_SIZE]) -> ([u32; GRID_SIZE], u32) {
    let mut out = [0; GRID_SIZE];
    let mut len = 0;
    let mut score = 0;
    // whether out[len - 1] may still absorb an equal tile
    let mut mergeable = false;
    for value in line.into_iter().filter(|v| *v != 0) {
        if mergeable && out[len - 1] == value && value < MAX_TILE_VALUE {
            out[len - 1] = value * 2;
            score += value * 2;
            mergeable = false;
        } else {
            out[len] = value;
            len += 1;
            mergeable = true;
        }
    }
    (out, score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(cells: [[u32; 4]; 4]) -> Grid {
        Grid::new(cells).unwrap()
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let err = Grid::new([[0, 0, 0, 0], [0, 3, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]).unwrap_err();
        assert_eq!(
            err,
            InvalidGridError {
                value: 3,
                row: 1,
                column: 1
            }
        );
        assert!(Grid::new([[1, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    }

    #[test]
    fn test_serde_validates_cells() {
        let g = grid([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 8]]);
        let json = serde_json::to_string(&g).unwrap();
        assert_eq!(json, "[[2,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,8]]");
        assert_eq!(serde_json::from_str::<Grid>(&json).unwrap(), g);
        assert!(serde_json::from_str::<Grid>("[[6,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]]").is_err());
    }

    #[test]
    fn test_move_right_then_idempotent() {
        let g = grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let first = g.apply(Direction::Right);
        assert_eq!(first.grid.cells()[0], [0, 0, 0, 4]);
        assert_eq!(first.score_delta, 4);

        let second = first.grid.apply(Direction::Right);
        assert_eq!(second.grid, first.grid);
        assert_eq!(second.score_delta, 0);
    }

    #[test]
    fn test_no_double_merge() {
        let g = grid([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]);
        let right = g.apply(Direction::Right);
        assert_eq!(right.grid.cells()[0], [0, 0, 4, 4]);
        assert_eq!(right.score_delta, 8);

        let left = g.apply(Direction::Left);
        assert_eq!(left.grid.cells()[0], [4, 4, 0, 0]);
        assert_eq!(left.score_delta, 8);
    }

    #[test]
    fn test_merge_starts_from_pulled_end() {
        let g = grid([[4, 2, 2, 2], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(g.apply(Direction::Right).grid.cells()[0], [0, 4, 2, 4]);
        assert_eq!(g.apply(Direction::Left).grid.cells()[0], [4, 4, 2, 0]);
    }

    #[test]
    fn test_merged_tile_does_not_merge_again() {
        let g = grid([[4, 4, 8, 0], [0; 4], [0; 4], [0; 4]]);
        let left = g.apply(Direction::Left);
        assert_eq!(left.grid.cells()[0], [8, 8, 0, 0]);
        assert_eq!(left.score_delta, 8);
    }

    #[test]
    fn test_vertical_moves() {
        let g = grid([[2, 0, 0, 0], [2, 0, 0, 0], [4, 0, 0, 0], [0, 0, 0, 8]]);
        let up = g.apply(Direction::Up);
        assert_eq!(
            up.grid,
            grid([[4, 0, 0, 8], [4, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]])
        );
        assert_eq!(up.score_delta, 4);

        let down = g.apply(Direction::Down);
        assert_eq!(
            down.grid,
            grid([[0, 0, 0, 0], [0, 0, 0, 0], [4, 0, 0, 0], [4, 0, 0, 8]])
        );
        assert_eq!(down.score_delta, 4);
    }

    #[test]
    fn test_empty_and_unmergeable_lines() {
        assert_eq!(Grid::EMPTY.apply(Direction::Left).grid, Grid::EMPTY);
        let g = grid([[0, 2, 0, 4], [0; 4], [0; 4], [0; 4]]);
        let left = g.apply(Direction::Left);
        assert_eq!(left.grid.cells()[0], [2, 4, 0, 0]);
        assert_eq!(left.score_delta, 0);
    }

    #[test]
    fn test_idempotent_once_no_merges_remain() {
        let g = grid([[2, 2, 4, 8], [0, 4, 4, 4], [2, 0, 2, 0], [16, 16, 16, 16]]);
        for dir in Direction::ALL {
            let mut current = g.apply(dir).grid;
            loop {
                let next = current.apply(dir);
                if next.score_delta == 0 {
                    assert_eq!(next.grid, current);
                    break;
                }
                current = next.grid;
            }
        }
    }

    #[test]
    fn test_count_zeros_plus_tiles_is_cell_count() {
        let g = grid([[2, 0, 4, 0], [0, 0, 0, 0], [8, 8, 0, 2], [0, 0, 0, 1024]]);
        let non_zero = g.cells().iter().flatten().filter(|v| **v != 0).count();
        assert_eq!(g.count_zeros() + non_zero, CELL_COUNT);
        assert_eq!(g.count_zeros(), 10);
        assert_eq!(g.empty_positions().len(), 10);
    }

    #[test]
    fn test_max_tile_keeps_ties() {
        let g = grid([[2, 8, 0, 0], [0, 0, 0, 4], [0, 0, 0, 0], [0, 0, 8, 2]]);
        let max = g.max_tile();
        assert_eq!(max.value(), 8);
        assert_eq!(max.positions(), &[Position::new(0, 1), Position::new(3, 2)]);
        assert_eq!(max.distance_to_right_wall(), 1);
        assert_eq!(max.distance_to_lower_right_corner(), 1);
    }

    #[test]
    fn test_distances() {
        let corner = Position::new(3, 3);
        let origin = Position::new(0, 0);
        assert_eq!(distance_to_right_wall(&[origin]), Some(3));
        assert_eq!(distance_to_lower_right_corner(&[origin]), Some(6));
        assert_eq!(distance_to_lower_right_corner(&[origin, corner]), Some(0));
        assert_eq!(distance_to_right_wall(&[]), None);
    }

    #[test]
    fn test_all_moves_and_stuck() {
        let g = grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(g.is_stuck());
        for (_dir, outcome) in g.all_moves().iter() {
            assert_eq!(outcome.grid, g);
            assert_eq!(outcome.score_delta, 0);
        }

        let g = grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert!(!g.is_stuck());
        let moves = g.all_moves();
        assert_eq!(moves.get(Direction::Left).score_delta, 4);
        assert_eq!(moves.get(Direction::Up).score_delta, 0);
    }

    #[test]
    fn test_largest_tile_never_merges() {
        const MAX: u32 = MAX_TILE_VALUE;
        assert!(Grid::new([[MAX * 2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());

        let g = grid([[MAX, MAX, 0, 0], [MAX / 2, MAX / 2, 0, 0], [0; 4], [0; 4]]);
        let left = g.apply(Direction::Left);
        assert_eq!(left.grid.cells()[0], [MAX, MAX, 0, 0]);
        assert_eq!(left.grid.cells()[1], [MAX, 0, 0, 0]);
        assert_eq!(left.score_delta, MAX);
        assert_eq!(Grid::new(*left.grid.cells()), Ok(left.grid));

        let full = grid([[MAX; 4]; 4]);
        assert!(full.is_stuck());
        for (_dir, outcome) in full.all_moves().iter() {
            assert_eq!(outcome.grid, full);
            assert_eq!(outcome.score_delta, 0);
        }
    }

    #[test]
    #[should_panic(expected = "position out of the grid")]
    fn test_position_outside_grid() {
        let _ = Position::new(0, GRID_SIZE);
    }

    #[test]
    fn test_with_tile() {
        let g = Grid::EMPTY.with_tile(Position::new(2, 1), 4).unwrap();
        assert_eq!(g.get(Position::new(2, 1)), 4);
        assert!(Grid::EMPTY.with_tile(Position::new(0, 0), 5).is_err());
    }
}
