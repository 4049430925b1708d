use super::Player;

/// Derived status of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    InProgress,
    Win(Player),
    Draw,
}

impl GameResult {
    /// Check if game is over
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameResult::InProgress)
    }

    /// Announcement text for a finished game.
    pub fn message(self) -> String {
        match self {
            GameResult::InProgress => "Game in progress".to_string(),
            GameResult::Win(player) => format!("{} wins!", player.name()),
            GameResult::Draw => "It's a draw!".to_string(),
        }
    }
}
