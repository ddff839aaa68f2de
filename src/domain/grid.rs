/// Grid model: the static cave map.
///
/// Tiles are assigned once when the grid is built and never mutated.
/// Addressing is `(row, col)` with `row` growing downwards.
///
/// ## Text format
///   One line per row, one symbol per cell (see `Tile::from_symbol`).
///   All rows must have the same length.

use log::warn;

use super::player::Direction;
use super::tile::Tile;
use crate::error::{GameError, GameResult};

/// The original cave: 6×6, entrance at (4, 0), wheel at (2, 4).
pub const CAVE_MAP: [&str; 6] = [
    "#D##B.",
    "......",
    ".#.#W.",
    "#...B.",
    "C.#...",
    "..##.D",
];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Pos { row, col }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Build a grid from rows of tiles. Rejects empty and ragged maps.
    pub fn new(rows: Vec<Vec<Tile>>) -> GameResult<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(GameError::MapInvariantViolation("map is empty".into()));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != width) {
            return Err(GameError::MapInvariantViolation(format!(
                "row {bad} has {} cells, expected {width}",
                rows[bad].len()
            )));
        }

        let grid = Grid {
            rows: height,
            cols: width,
            tiles: rows.into_iter().flatten().collect(),
        };
        if !grid.tiles.contains(&Tile::Dest) {
            warn!("map has no wheel: the cave cannot be won");
        }
        Ok(grid)
    }

    /// Parse a map from its text rows.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> GameResult<Self> {
        let mut rows = Vec::with_capacity(lines.len());
        for (row, line) in lines.iter().enumerate() {
            let mut tiles = Vec::new();
            for (col, ch) in line.as_ref().chars().enumerate() {
                let tile = Tile::from_symbol(ch).ok_or_else(|| {
                    GameError::MapInvariantViolation(format!(
                        "unknown map symbol {ch:?} at ({row}, {col})"
                    ))
                })?;
                tiles.push(tile);
            }
            rows.push(tiles);
        }
        Grid::new(rows)
    }

    /// The built-in cave.
    pub fn cave() -> GameResult<Self> {
        Grid::parse(&CAVE_MAP)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Tile at (row, col).
    pub fn tile_at(&self, row: usize, col: usize) -> GameResult<Tile> {
        if self.contains(row, col) {
            Ok(self.tiles[row * self.cols + col])
        } else {
            Err(GameError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Locate the unique cave entrance.
    pub fn find_init(&self) -> GameResult<Pos> {
        let mut found = self
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Tile::Init)
            .map(|(i, _)| Pos::new(i / self.cols, i % self.cols));

        match (found.next(), found.next()) {
            (Some(pos), None) => Ok(pos),
            (None, _) => Err(GameError::MapInvariantViolation(
                "map has no cave entrance".into(),
            )),
            (Some(_), Some(_)) => Err(GameError::MapInvariantViolation(format!(
                "map has {} cave entrances, expected exactly one",
                2 + found.count()
            ))),
        }
    }

    /// Neighbouring cell in `dir`, or None when the step leaves the grid.
    pub fn neighbor(&self, from: Pos, dir: Direction) -> Option<Pos> {
        let (dr, dc) = dir.delta();
        let row = from.row.checked_add_signed(dr)?;
        let col = from.col.checked_add_signed(dc)?;
        self.contains(row, col).then_some(Pos::new(row, col))
    }

    /// Iterate all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Pos, Tile)> + '_ {
        let cols = self.cols;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, t)| (Pos::new(i / cols, i % cols), *t))
    }
}
