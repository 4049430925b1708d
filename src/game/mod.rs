//! Board Engine: grid state, move validation and application, and derived
//! win/draw detection. No I/O, no randomness.

mod board;
mod player;
mod result;

pub use board::{Board, Cell, COLS, ROWS, WIN_LENGTH};
pub use player::Player;
pub use result::GameResult;
