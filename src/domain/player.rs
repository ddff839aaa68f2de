/// Player record and movement directions.

use super::grid::Pos;

/// Cardinal move direction. No diagonals.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// (d_row, d_col)
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub row: usize,
    pub col: usize,
    /// True strictly while a relocation animation is in flight.
    pub is_on_move: bool,
    /// Entrance captured when play began; the bats send the caveman here.
    pub start: Pos,
}

impl Player {
    pub fn spawn(start: Pos) -> Self {
        Player {
            row: start.row,
            col: start.col,
            is_on_move: false,
            start,
        }
    }

    pub fn pos(&self) -> Pos {
        Pos::new(self.row, self.col)
    }

    pub fn set_pos(&mut self, pos: Pos) {
        self.row = pos.row;
        self.col = pos.col;
    }
}
