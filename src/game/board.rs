use std::fmt;

use super::{GameResult, Player};
use crate::error::{InvalidMoveError, InvalidMoveReason};

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
pub const WIN_LENGTH: usize = 4;

/// Line orientations as (row step, col step): horizontal, vertical,
/// diagonal (\) and anti-diagonal (/). Scan order follows this array.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    PlayerA,
    PlayerB,
}

impl Cell {
    /// The player occupying this cell, if any.
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::PlayerA => Some(Player::A),
            Cell::PlayerB => Some(Player::B),
        }
    }

    /// Single-character glyph used by the text rendering.
    pub fn glyph(self) -> char {
        match self {
            Cell::Empty => '_',
            Cell::PlayerA => 'X',
            Cell::PlayerB => 'O',
        }
    }
}

/// The 6x7 grid. Row 0 is the top, row 5 is the bottom.
///
/// Pieces only enter through [`Board::apply_move`], which keeps every column
/// filled contiguously from the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Build a board from raw cells, top row first.
    ///
    /// No gravity check is made; this exists for constructed positions in
    /// tests and debugging.
    pub fn from_cells(cells: [[Cell; COLS]; ROWS]) -> Self {
        Board { cells }
    }

    /// Get the cell at a specific position
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Raw grid, top row first.
    pub fn cells(&self) -> &[[Cell; COLS]; ROWS] {
        &self.cells
    }

    /// Check if a column is full. Out-of-range columns count as full.
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= COLS {
            return true;
        }
        self.cells[0][col] != Cell::Empty
    }

    /// Row a piece dropped into `col` would land in.
    pub fn landing_row(&self, col: usize) -> Option<usize> {
        if col >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.cells[row][col] == Cell::Empty)
    }

    /// Every column that can still take a piece, ascending.
    ///
    /// The result is a snapshot; query again after every move.
    pub fn available_moves(&self) -> Vec<usize> {
        (0..COLS).filter(|&col| !self.is_column_full(col)).collect()
    }

    /// Drop `player`'s piece into `column`, returning the row where it landed.
    ///
    /// On error the board is unchanged.
    pub fn apply_move(&mut self, column: usize, player: Player) -> Result<usize, InvalidMoveError> {
        if column >= COLS {
            return Err(InvalidMoveError {
                column,
                reason: InvalidMoveReason::OutOfRange,
            });
        }

        let row = self.landing_row(column).ok_or(InvalidMoveError {
            column,
            reason: InvalidMoveReason::ColumnFull,
        })?;
        self.cells[row][column] = player.to_cell();
        Ok(row)
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        self.available_moves().is_empty()
    }

    /// Scan every window on the board for a line of four.
    ///
    /// Windows are visited row-major by starting cell, and per cell in
    /// horizontal, vertical, diagonal, anti-diagonal order. The first complete
    /// line decides the result, so constructed positions with two winners
    /// still answer deterministically.
    pub fn winner(&self) -> Option<Player> {
        for row in 0..ROWS {
            for col in 0..COLS {
                let Some(player) = self.cells[row][col].owner() else {
                    continue;
                };
                for &(dr, dc) in &DIRECTIONS {
                    if self.line_from(row, col, dr, dc, player) {
                        return Some(player);
                    }
                }
            }
        }
        None
    }

    /// Check whether the piece at (row, col) is part of a line of four.
    ///
    /// Cheaper than [`Board::winner`] and equivalent when (row, col) is the
    /// last cell played.
    pub fn winner_at(&self, row: usize, col: usize) -> Option<Player> {
        let player = self.get(row, col).owner()?;

        DIRECTIONS
            .iter()
            .any(|&(dr, dc)| {
                let count = 1
                    + self.run_length(row, col, dr, dc, player)
                    + self.run_length(row, col, -dr, -dc, player);
                count >= WIN_LENGTH
            })
            .then_some(player)
    }

    /// Derive the game result from the grid.
    pub fn result(&self) -> GameResult {
        match self.winner() {
            Some(player) => GameResult::Win(player),
            None if self.is_full() => GameResult::Draw,
            None => GameResult::InProgress,
        }
    }

    /// Render the grid as text, top row first, one glyph per cell.
    pub fn to_display_string(&self) -> String {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.glyph().to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether `WIN_LENGTH` cells starting at (row, col) along (dr, dc) all
    /// belong to `player`.
    fn line_from(&self, row: usize, col: usize, dr: isize, dc: isize, player: Player) -> bool {
        (0..WIN_LENGTH as isize).all(|step| {
            match offset(row, col, dr * step, dc * step) {
                Some((r, c)) => self.cells[r][c].owner() == Some(player),
                None => false,
            }
        })
    }

    /// Count consecutive `player` cells after (row, col) along (dr, dc).
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, player: Player) -> usize {
        let mut count = 0;
        let (mut r, mut c) = (row, col);
        while let Some((nr, nc)) = offset(r, c, dr, dc) {
            if self.cells[nr][nc].owner() != Some(player) {
                break;
            }
            count += 1;
            r = nr;
            c = nc;
        }
        count
    }
}

/// Move (row, col) by (dr, dc), staying on the board.
fn offset(row: usize, col: usize, dr: isize, dc: isize) -> Option<(usize, usize)> {
    let r = row.checked_add_signed(dr)?;
    let c = col.checked_add_signed(dc)?;
    (r < ROWS && c < COLS).then_some((r, c))
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}
