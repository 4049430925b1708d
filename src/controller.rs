//! Turn Controller: alternates two move-sources over one board until a win
//! or a draw.
//!
//! Every proposal is re-validated by the board. A rejected proposal (bad
//! text, a full column, an out-of-range answer) leaves the same side to move
//! and is reported back as [`Step::Rejected`]; only fatal source errors stop
//! the game.

use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{ControllerError, InvalidMoveError, SourceError};
use crate::game::{Board, GameResult, Player};
use crate::source::MoveSource;

/// Pause between polls while a non-blocking source has nothing to offer.
const WAIT_INTERVAL: Duration = Duration::from_millis(10);

/// Why a proposal did not become a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Source(SourceError),
    Move(InvalidMoveError),
}

/// Outcome of a single [`TurnController::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The active source has no move yet.
    Waiting,
    /// The proposal was refused; the same side moves again.
    Rejected { player: Player, rejection: Rejection },
    /// A piece was placed.
    Played {
        player: Player,
        column: usize,
        row: usize,
        result: GameResult,
    },
}

pub struct TurnController {
    board: Board,
    sources: [Box<dyn MoveSource>; 2],
    active: Player,
    result: GameResult,
}

impl TurnController {
    /// New game on an empty board. `a` opens.
    pub fn new(a: Box<dyn MoveSource>, b: Box<dyn MoveSource>) -> Self {
        TurnController {
            board: Board::new(),
            sources: [a, b],
            active: Player::A,
            result: GameResult::InProgress,
        }
    }

    /// Continue from an existing position with `to_move` on turn.
    pub fn from_position(
        board: Board,
        to_move: Player,
        a: Box<dyn MoveSource>,
        b: Box<dyn MoveSource>,
    ) -> Self {
        TurnController {
            board,
            sources: [a, b],
            active: to_move,
            result: board.result(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active_player(&self) -> Player {
        self.active
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn source_name(&self, player: Player) -> &str {
        self.sources[player.index()].name()
    }

    /// Start a fresh game with the same sources, each rewound to its
    /// initial state.
    pub fn reset(&mut self) {
        for source in &mut self.sources {
            source.reset();
        }
        self.board = Board::new();
        self.active = Player::A;
        self.result = GameResult::InProgress;
        info!("new game");
    }

    /// Ask the active side for one move and apply it if it is legal.
    pub fn step(&mut self) -> Result<Step, ControllerError> {
        if self.result.is_terminal() {
            return Err(ControllerError::GameOver);
        }

        // Only reachable from a constructed full position.
        if self.board.available_moves().is_empty() {
            self.result = GameResult::Draw;
            return Err(ControllerError::GameOver);
        }

        let player = self.active;
        let source = &mut self.sources[player.index()];

        let column = match source.propose(&self.board, player) {
            Ok(Some(column)) => column,
            Ok(None) => return Ok(Step::Waiting),
            Err(e) if e.is_fatal() => {
                warn!(player = %player, source = source.name(), error = %e, "move source failed");
                return Err(ControllerError::SourceFailed { player, source: e });
            }
            Err(e) => {
                debug!(player = %player, error = %e, "proposal rejected");
                return Ok(Step::Rejected {
                    player,
                    rejection: Rejection::Source(e),
                });
            }
        };

        let row = match self.board.apply_move(column, player) {
            Ok(row) => row,
            Err(e) => {
                debug!(player = %player, error = %e, "illegal move rejected");
                return Ok(Step::Rejected {
                    player,
                    rejection: Rejection::Move(e),
                });
            }
        };

        self.result = match self.board.winner_at(row, column) {
            Some(winner) => GameResult::Win(winner),
            None if self.board.is_full() => GameResult::Draw,
            None => GameResult::InProgress,
        };

        if self.result.is_terminal() {
            info!(result = ?self.result, "game over");
        } else {
            self.active = player.other();
        }

        Ok(Step::Played {
            player,
            column,
            row,
            result: self.result,
        })
    }

    /// Play to the end, reporting every step to `observer`.
    ///
    /// Meant for blocking sources; a waiting source is polled every few
    /// milliseconds.
    pub fn run<F>(&mut self, mut observer: F) -> Result<GameResult, ControllerError>
    where
        F: FnMut(&Step, &Board),
    {
        while !self.result.is_terminal() {
            let step = match self.step() {
                Ok(step) => step,
                Err(ControllerError::GameOver) => break,
                Err(e) => return Err(e),
            };
            if step == Step::Waiting {
                thread::sleep(WAIT_INTERVAL);
            }
            observer(&step, &self.board);
        }
        Ok(self.result)
    }
}
