//! External move policy adapter.
//!
//! The board crosses this boundary as a numeric grid: `-1` for the policy's
//! own pieces, `1` for the opponent's, `0` for empty, row-major, top row first.
//! Whatever comes back is treated as untrusted text. Anything that is not a
//! playable column, or no answer within the deadline, falls back to a uniform
//! random legal move.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use super::{MoveSource, RandomSource};
use crate::error::{PolicyError, SourceError};
use crate::game::{Board, Player, COLS};

/// Rule description sent alongside the board.
pub const RULES_PROMPT: &str = "You are a Connect 4 AI. Follow these rules: \
1. If you can win with your next move, do so. \
2. If the opponent can win with their next move, block them. \
3. Otherwise, aim to set up opportunities for future wins, such as creating multiple threats in one move. \
4. Prioritize control of the center column, as it increases winning chances. \
5. Avoid placing pieces in columns that allow the opponent to win. \
The board state is provided below as a 2D grid, top row first. Each cell is 0 (empty), \
-1 (your pieces), or 1 (your opponent's pieces). Pieces fall to the lowest empty cell \
of a column. Return the column index (0-6) where you want to drop your piece, based on \
the current state. Your response should contain the numerical index and absolutely nothing more.";

/// Encode `board` from `player`'s point of view.
pub fn encode_board(board: &Board, player: Player) -> Vec<Vec<i8>> {
    board
        .cells()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell.owner() {
                    None => 0,
                    Some(p) if p == player => -1,
                    Some(_) => 1,
                })
                .collect()
        })
        .collect()
}

/// Parse a policy answer into a column index.
///
/// Tolerates surrounding whitespace, quotes, backticks and a trailing period.
pub fn parse_column(text: &str) -> Result<usize, PolicyError> {
    let trimmed = text
        .trim()
        .trim_matches(|c: char| c == '`' || c == '"' || c == '\'')
        .trim_end_matches('.')
        .trim();
    trimmed
        .parse::<usize>()
        .map_err(|_| PolicyError::Malformed(text.trim().to_string()))
}

/// One request to an external policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRequest {
    pub grid: Vec<Vec<i8>>,
    pub rules: String,
}

impl PolicyRequest {
    pub fn new(board: &Board, player: Player) -> Self {
        PolicyRequest {
            grid: encode_board(board, player),
            rules: RULES_PROMPT.to_string(),
        }
    }

    /// Grid rendered one row per line, values separated by spaces.
    pub fn grid_text(&self) -> String {
        self.grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| format!("{v:>2}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A remote (or scripted) policy that answers with raw text.
pub trait PolicyClient: Send + Sync {
    fn request(&self, request: &PolicyRequest) -> Result<String, PolicyError>;
}

/// Move-source backed by a [`PolicyClient`], with a deadline and a random
/// fallback.
pub struct PolicySource {
    name: String,
    client: Arc<dyn PolicyClient>,
    timeout: Option<Duration>,
    fallback: RandomSource,
}

impl PolicySource {
    pub fn new(client: Arc<dyn PolicyClient>, timeout: Option<Duration>, fallback: RandomSource) -> Self {
        PolicySource {
            name: "Policy".to_string(),
            client,
            timeout,
            fallback,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Ask the client, giving up after the deadline. A late answer is dropped.
    fn ask(&self, request: PolicyRequest) -> Result<String, PolicyError> {
        let Some(timeout) = self.timeout else {
            return self.client.request(&request);
        };

        let (tx, rx) = mpsc::channel();
        let client = Arc::clone(&self.client);
        thread::spawn(move || {
            let _ = tx.send(client.request(&request));
        });

        match rx.recv_timeout(timeout) {
            Ok(answer) => answer,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(PolicyError::Timeout(timeout)),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(PolicyError::Transport("policy worker exited without answering".into()))
            }
        }
    }

    /// Turn an answer into a playable column.
    fn validate(answer: &str, board: &Board) -> Result<usize, PolicyError> {
        let col = parse_column(answer)?;
        if col >= COLS || board.is_column_full(col) {
            return Err(PolicyError::Malformed(format!("column {col} is not playable")));
        }
        Ok(col)
    }
}

impl MoveSource for PolicySource {
    fn propose(&mut self, board: &Board, player: Player) -> Result<Option<usize>, SourceError> {
        let request = PolicyRequest::new(board, player);

        let outcome = self
            .ask(request)
            .and_then(|answer| Self::validate(&answer, board));

        match outcome {
            Ok(col) => {
                debug!(policy = %self.name, column = col, "policy move");
                Ok(Some(col))
            }
            Err(e) if e.is_fatal() => Err(e.into()),
            Err(e) => {
                warn!(policy = %self.name, error = %e, "policy unavailable, playing a random move");
                Ok(self.fallback.pick(board))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        self.fallback.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replies with canned answers in order, then repeats the last one.
    struct Scripted {
        answers: Mutex<Vec<Result<String, PolicyError>>>,
        seen: Mutex<Vec<PolicyRequest>>,
    }

    impl Scripted {
        fn new(answers: Vec<Result<&str, PolicyError>>) -> Arc<Self> {
            let mut answers: Vec<_> = answers.into_iter().map(|a| a.map(String::from)).collect();
            answers.reverse();
            Arc::new(Scripted {
                answers: Mutex::new(answers),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl PolicyClient for Scripted {
        fn request(&self, request: &PolicyRequest) -> Result<String, PolicyError> {
            self.seen.lock().unwrap().push(request.clone());
            let mut answers = self.answers.lock().unwrap();
            if answers.len() > 1 {
                answers.pop().unwrap()
            } else {
                answers.last().cloned().unwrap()
            }
        }
    }

    struct Slow(Duration);

    impl PolicyClient for Slow {
        fn request(&self, _request: &PolicyRequest) -> Result<String, PolicyError> {
            thread::sleep(self.0);
            Ok("0".into())
        }
    }

    fn source(client: Arc<dyn PolicyClient>, timeout: Option<Duration>) -> PolicySource {
        PolicySource::new(client, timeout, RandomSource::seeded(7))
    }

    #[test]
    fn test_encode_board_perspective() {
        let mut board = Board::new();
        board.apply_move(0, Player::A).unwrap();
        board.apply_move(1, Player::B).unwrap();

        let for_b = encode_board(&board, Player::B);
        assert_eq!(for_b.len(), 6);
        assert_eq!(for_b[5], vec![1, -1, 0, 0, 0, 0, 0]);
        assert!(for_b[..5].iter().all(|row| row.iter().all(|&v| v == 0)));

        let for_a = encode_board(&board, Player::A);
        assert_eq!(for_a[5], vec![-1, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_grid_text() {
        let mut board = Board::new();
        board.apply_move(6, Player::A).unwrap();
        let text = PolicyRequest::new(&board, Player::B).grid_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], " 0  0  0  0  0  0  0");
        assert_eq!(lines[5], " 0  0  0  0  0  0  1");
    }

    #[test]
    fn test_request_serializes_row_major() {
        let mut board = Board::new();
        board.apply_move(3, Player::A).unwrap();
        let json = serde_json::to_value(PolicyRequest::new(&board, Player::A)).unwrap();
        assert_eq!(json["grid"][5][3], -1);
        assert_eq!(json["grid"][0][0], 0);
        assert_eq!(json["grid"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_parse_column() {
        assert_eq!(parse_column("3"), Ok(3));
        assert_eq!(parse_column(" 4\n"), Ok(4));
        assert_eq!(parse_column("`5`"), Ok(5));
        assert_eq!(parse_column("6."), Ok(6));
        assert!(matches!(parse_column("column three"), Err(PolicyError::Malformed(_))));
        assert!(matches!(parse_column(""), Err(PolicyError::Malformed(_))));
    }

    #[test]
    fn test_policy_answer_is_used() {
        let client = Scripted::new(vec![Ok("2")]);
        let mut policy = source(client.clone(), None);
        let mut board = Board::new();
        board.apply_move(3, Player::A).unwrap();

        assert_eq!(policy.propose(&board, Player::B), Ok(Some(2)));
        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].grid[5][3], 1);
        assert_eq!(seen[0].rules, RULES_PROMPT);
    }

    #[test]
    fn test_illegal_answers_fall_back_to_legal_moves() {
        let mut board = Board::new();
        for _ in 0..6 {
            board.apply_move(3, Player::A).unwrap();
        }

        for answer in ["3", "9", "banana"] {
            let mut policy = source(Scripted::new(vec![Ok(answer)]), None);
            let col = policy.propose(&board, Player::B).unwrap().unwrap();
            assert!(board.available_moves().contains(&col), "{answer} gave {col}");
        }
    }

    #[test]
    fn test_transport_error_falls_back() {
        let client = Scripted::new(vec![Err(PolicyError::Transport("connection refused".into()))]);
        let mut policy = source(client, None);
        let board = Board::new();
        let col = policy.propose(&board, Player::A).unwrap().unwrap();
        assert!(col < COLS);
    }

    #[test]
    fn test_timeout_falls_back() {
        let client: Arc<dyn PolicyClient> = Arc::new(Slow(Duration::from_millis(500)));
        let mut policy = source(client, Some(Duration::from_millis(20)));
        let board = Board::new();
        let col = policy.propose(&board, Player::A).unwrap().unwrap();
        assert!(board.available_moves().contains(&col));
    }

    #[test]
    fn test_answer_within_deadline_is_used() {
        let mut policy = source(Scripted::new(vec![Ok("4")]), Some(Duration::from_secs(5)));
        assert_eq!(policy.propose(&Board::new(), Player::A), Ok(Some(4)));
    }

    #[test]
    fn test_reset_rewinds_fallback() {
        let mut policy = source(Scripted::new(vec![Ok("banana")]), None);
        let board = Board::new();
        let first: Vec<_> = (0..10).map(|_| policy.propose(&board, Player::A).unwrap()).collect();
        policy.reset();
        let second: Vec<_> = (0..10).map(|_| policy.propose(&board, Player::A).unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_credential_errors_are_fatal() {
        let client = Scripted::new(vec![Err(PolicyError::Unauthorized("401".into()))]);
        let mut policy = source(client, None);
        let err = policy.propose(&Board::new(), Player::A).unwrap_err();
        assert!(err.is_fatal());
    }
}
