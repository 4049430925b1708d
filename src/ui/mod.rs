//! Terminal UI: renders the board, maps keys and mouse clicks to columns, and
//! advances the turn controller one step per tick.

mod app;
mod game_view;

pub use app::{App, AppExit, HumanSeat};
pub use game_view::column_at;
