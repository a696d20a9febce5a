use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identity of a matchable tile. Two cells match when their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u8);

impl TileId {
    /// Number of ids that have a single-letter textual form.
    pub const LETTER_COUNT: u8 = 52;

    /// Parse the letter form: `A`..`Z` are ids 0..=25, `a`..`z` are 26..=51.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A'..='Z' => Some(Self(c as u8 - b'A')),
            'a'..='z' => Some(Self(c as u8 - b'a' + 26)),
            _ => None,
        }
    }

    /// Letter form of this id, if it has one.
    pub fn to_char(self) -> Option<char> {
        match self.0 {
            0..=25 => Some((b'A' + self.0) as char),
            26..=51 => Some((b'a' + self.0 - 26) as char),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_char() {
            Some(c) => write!(f, "{}", c),
            None => write!(f, "#{}", self.0),
        }
    }
}

/// Contents of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Tile(TileId),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn tile(self) -> Option<TileId> {
        match self {
            Cell::Empty => None,
            Cell::Tile(id) => Some(id),
        }
    }
}

/// An on-board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance between two positions.
    pub fn distance(self, other: Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    pub fn is_adjacent(self, other: Position) -> bool {
        self.distance(other) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A signed coordinate. Paths use points because they may leave the board and
/// run through the margin around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub row: i32,
    pub col: i32,
}

impl Point {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }
}

impl From<Position> for Point {
    fn from(pos: Position) -> Self {
        Self::new(pos.row as i32, pos.col as i32)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("position {pos} is outside the {rows}x{cols} board")]
    OutOfBounds { pos: Position, rows: usize, cols: usize },
    #[error("layout is empty")]
    EmptyLayout,
    #[error("layout row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("unrecognized symbol {symbol:?} at row {row}, column {col}")]
    InvalidSymbol { symbol: char, row: usize, col: usize },
    #[error("board holds {count} tiles; tiles must come in pairs")]
    OddTileCount { count: usize },
    #[error("tile {tile} has no partner")]
    UnpairedTile { tile: TileId },
    #[error("a {rows}x{cols} board cannot be filled with pairs")]
    OddCellCount { rows: usize, cols: usize },
    #[error("board is {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    SizeMismatch {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },
}

/// Rectangular board of cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an empty board.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    /// Build a board from row-major cells.
    pub(crate) fn from_cells(rows: usize, cols: usize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), rows * cols);
        Self { rows, cols, cells }
    }

    /// Parse a textual layout. Rows are separated by newlines or `/`, `.` is an
    /// empty cell and letters are tiles (see [`TileId::from_char`]).
    ///
    /// ```
    /// use onet_core::Grid;
    ///
    /// let grid = Grid::from_layout("AB/BA").unwrap();
    /// assert_eq!((grid.rows(), grid.cols()), (2, 2));
    /// ```
    pub fn from_layout(layout: &str) -> Result<Self, GridError> {
        let lines: Vec<&str> = layout
            .split(|c: char| c == '\n' || c == '/')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let cols = lines.first().map(|l| l.chars().count()).ok_or(GridError::EmptyLayout)?;
        let rows = lines.len();
        let mut cells = Vec::with_capacity(rows * cols);

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(GridError::RaggedRow { row, expected: cols, found });
            }
            for (col, symbol) in line.chars().enumerate() {
                let cell = match symbol {
                    '.' => Cell::Empty,
                    c => TileId::from_char(c)
                        .map(Cell::Tile)
                        .ok_or(GridError::InvalidSymbol { symbol, row, col })?,
                };
                cells.push(cell);
            }
        }

        let grid = Self { rows, cols, cells };
        let count = grid.occupied_count();
        if count % 2 != 0 {
            return Err(GridError::OddTileCount { count });
        }
        Ok(grid)
    }

    /// Inverse of [`Grid::from_layout`], rows joined with `/`.
    pub fn to_layout(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.rows);
        for row in 0..self.rows {
            if row > 0 {
                out.push('/');
            }
            for col in 0..self.cols {
                out.push(symbol(self.cells[row * self.cols + col]));
            }
        }
        out
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, pos: Position) -> Option<usize> {
        (pos.row < self.rows && pos.col < self.cols).then(|| pos.row * self.cols + pos.col)
    }

    /// Cell at `pos`, or `None` when the position is outside the board.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Tile at `pos`; `None` for empty or outside cells.
    pub fn tile(&self, pos: Position) -> Option<TileId> {
        self.get(pos).and_then(Cell::tile)
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Empty)
    }

    /// Whether `point` lies on the board.
    pub fn contains(&self, point: Point) -> bool {
        point.row >= 0
            && point.col >= 0
            && (point.row as usize) < self.rows
            && (point.col as usize) < self.cols
    }

    /// Board position for an on-board point.
    pub fn position_of(&self, point: Point) -> Option<Position> {
        self.contains(point)
            .then(|| Position::new(point.row as usize, point.col as usize))
    }

    /// Cell under a point, `None` when the point is off the board.
    pub fn cell_at(&self, point: Point) -> Option<Cell> {
        self.position_of(point).and_then(|pos| self.get(pos))
    }

    /// Remove the tile at `pos`.
    pub fn clear(&mut self, pos: Position) -> Result<(), GridError> {
        let idx = self.index(pos).ok_or(GridError::OutOfBounds {
            pos,
            rows: self.rows,
            cols: self.cols,
        })?;
        self.cells[idx] = Cell::Empty;
        Ok(())
    }

    pub(crate) fn set(&mut self, pos: Position, cell: Cell) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = cell;
        }
    }

    /// True once every tile has been removed.
    pub fn is_solved(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
    }

    /// Occupied positions with their tiles, row-major.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, TileId)> + '_ {
        self.positions().filter_map(move |pos| self.tile(pos).map(|t| (pos, t)))
    }

    /// Row `row` as a slice.
    pub fn row(&self, row: usize) -> &[Cell] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }
}

fn symbol(cell: Cell) -> char {
    match cell {
        Cell::Empty => '.',
        Cell::Tile(id) => id.to_char().unwrap_or('?'),
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            let line: String = self.row(row).iter().map(|&c| symbol(c)).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_letters() {
        assert_eq!(TileId::from_char('A'), Some(TileId(0)));
        assert_eq!(TileId::from_char('z'), Some(TileId(51)));
        assert_eq!(TileId::from_char('.'), None);
        assert_eq!(TileId(27).to_char(), Some('b'));
        assert_eq!(TileId(60).to_char(), None);
    }

    #[test]
    fn test_from_layout_and_back() {
        let grid = Grid::from_layout("AB.\n.BA").unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.tile(Position::new(0, 1)), Some(TileId(1)));
        assert!(grid.is_empty(Position::new(1, 0)));
        assert_eq!(grid.to_layout(), "AB./.BA");
    }

    #[test]
    fn test_layout_errors() {
        assert_eq!(Grid::from_layout(""), Err(GridError::EmptyLayout));
        assert_eq!(
            Grid::from_layout("AA/A"),
            Err(GridError::RaggedRow { row: 1, expected: 2, found: 1 })
        );
        assert_eq!(
            Grid::from_layout("A#A."),
            Err(GridError::InvalidSymbol { symbol: '#', row: 0, col: 1 })
        );
        assert_eq!(Grid::from_layout("A.."), Err(GridError::OddTileCount { count: 1 }));
    }

    #[test]
    fn test_get_outside_is_none() {
        let grid = Grid::new(2, 3);
        assert_eq!(grid.get(Position::new(1, 2)), Some(Cell::Empty));
        assert_eq!(grid.get(Position::new(2, 0)), None);
        assert_eq!(grid.get(Position::new(0, 3)), None);
        assert!(!grid.contains(Point::new(-1, 0)));
        assert_eq!(grid.cell_at(Point::new(0, -1)), None);
    }

    #[test]
    fn test_clear_and_solved() {
        let mut grid = Grid::from_layout("A./.A").unwrap();
        assert!(!grid.is_solved());
        grid.clear(Position::new(0, 0)).unwrap();
        grid.clear(Position::new(1, 1)).unwrap();
        assert!(grid.is_solved());
        assert_eq!(grid.occupied_count(), 0);

        let err = grid.clear(Position::new(5, 0)).unwrap_err();
        assert!(matches!(err, GridError::OutOfBounds { .. }));
    }

    #[test]
    fn test_tiles_iterates_row_major() {
        let grid = Grid::from_layout(".A/A.").unwrap();
        let tiles: Vec<_> = grid.tiles().collect();
        assert_eq!(
            tiles,
            vec![(Position::new(0, 1), TileId(0)), (Position::new(1, 0), TileId(0))]
        );
    }
}
