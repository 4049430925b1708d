use std::fmt;

use super::board::Cell;

/// One of the two sides. `A` always opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    A,
    B,
}

impl Player {
    /// Get the other player
    pub fn other(self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// Convert player to cell type
    pub fn to_cell(self) -> Cell {
        match self {
            Player::A => Cell::PlayerA,
            Player::B => Cell::PlayerB,
        }
    }

    /// Get player name for display
    pub fn name(self) -> &'static str {
        match self {
            Player::A => "X",
            Player::B => "O",
        }
    }

    /// Index into per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Player::A => 0,
            Player::B => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_player() {
        assert_eq!(Player::A.other(), Player::B);
        assert_eq!(Player::B.other(), Player::A);
    }

    #[test]
    fn test_player_name() {
        assert_eq!(Player::A.name(), "X");
        assert_eq!(Player::B.to_string(), "O");
    }

    #[test]
    fn test_to_cell() {
        assert_eq!(Player::A.to_cell(), Cell::PlayerA);
        assert_eq!(Player::B.to_cell(), Cell::PlayerB);
    }
}
