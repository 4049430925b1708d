use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use super::MoveSource;
use crate::error::SourceError;
use crate::game::{Board, Player};

/// A source that selects uniformly at random from the available columns.
///
/// Each instance owns its generator, so seeded instances replay exactly.
pub struct RandomSource {
    rng: StdRng,
    seed: Option<u64>,
}

impl RandomSource {
    pub fn new() -> Self {
        RandomSource {
            rng: StdRng::from_os_rng(),
            seed: None,
        }
    }

    /// Deterministic stream for tests and reproducible games.
    pub fn seeded(seed: u64) -> Self {
        RandomSource {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Pick a playable column, or `None` on a full board.
    pub fn pick(&mut self, board: &Board) -> Option<usize> {
        let moves = board.available_moves();
        if moves.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..moves.len());
        Some(moves[idx])
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSource for RandomSource {
    fn propose(&mut self, board: &Board, _player: Player) -> Result<Option<usize>, SourceError> {
        Ok(self.pick(board))
    }

    fn name(&self) -> &str {
        "Random"
    }

    /// Seeded sources restart their stream; unseeded ones draw fresh entropy.
    fn reset(&mut self) {
        self.rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_source_selects_legal_column() {
        let mut source = RandomSource::new();
        let mut board = Board::new();
        for _ in 0..6 {
            board.apply_move(2, Player::A).unwrap();
        }
        let legal = board.available_moves();

        for _ in 0..100 {
            let col = source.propose(&board, Player::B).unwrap().unwrap();
            assert!(legal.contains(&col), "Column {} is not legal", col);
        }
    }

    #[test]
    fn test_seeded_sources_repeat() {
        let board = Board::new();
        let mut first = RandomSource::seeded(42);
        let mut second = RandomSource::seeded(42);

        let a: Vec<_> = (0..20).map(|_| first.pick(&board)).collect();
        let b: Vec<_> = (0..20).map(|_| second.pick(&board)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reset_restarts_seeded_stream() {
        let board = Board::new();
        let mut source = RandomSource::seeded(42);
        let first: Vec<_> = (0..20).map(|_| source.pick(&board)).collect();
        source.reset();
        let second: Vec<_> = (0..20).map(|_| source.pick(&board)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_full_board_yields_nothing() {
        let mut board = Board::new();
        for col in 0..7 {
            for _ in 0..6 {
                board.apply_move(col, Player::A).unwrap();
            }
        }
        let mut source = RandomSource::seeded(1);
        assert_eq!(source.propose(&board, Player::B), Ok(None));
    }

    #[test]
    fn test_random_source_name() {
        assert_eq!(RandomSource::seeded(0).name(), "Random");
    }
}
