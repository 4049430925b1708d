//! Console front end: prints the board after every move and reads human
//! columns as text.

use std::io::Write;

use anyhow::Result;

use crate::controller::{Rejection, Step, TurnController};
use crate::error::{ControllerError, SourceError};
use crate::game::{Board, GameResult, Player, COLS};

/// How a console game ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ending {
    Finished(GameResult),
    /// A human source went away (input closed, player quit).
    Interrupted(String),
}

/// Board text followed by a line of column numbers.
pub fn render(board: &Board) -> String {
    let footer = (0..COLS).map(|c| c.to_string()).collect::<Vec<_>>().join(" ");
    format!("\n{}\n{}\n", board.to_display_string(), footer)
}

/// Drive `controller` to the end, narrating on `out`.
pub fn play<W: Write>(controller: &mut TurnController, out: &mut W) -> Result<Ending> {
    writeln!(
        out,
        "X: {}  vs  O: {}",
        controller.source_name(Player::A),
        controller.source_name(Player::B)
    )?;
    write!(out, "{}", render(controller.board()))?;

    loop {
        let step = match controller.step() {
            Ok(step) => step,
            Err(ControllerError::GameOver) => return Ok(Ending::Finished(controller.result())),
            Err(ControllerError::SourceFailed {
                source: SourceError::Disconnected(reason),
                ..
            }) => return Ok(Ending::Interrupted(reason)),
            Err(e) => return Err(e.into()),
        };

        match step {
            Step::Waiting => {}
            Step::Rejected { rejection, .. } => match rejection {
                Rejection::Source(e) => writeln!(out, "{e}")?,
                Rejection::Move(e) => writeln!(out, "Invalid move: {e}")?,
            },
            Step::Played {
                player,
                column,
                result,
                ..
            } => {
                writeln!(out, "\n{} plays column {}", player.name(), column)?;
                write!(out, "{}", render(controller.board()))?;
                if result.is_terminal() {
                    writeln!(out, "{}", result.message())?;
                    return Ok(Ending::Finished(result));
                }
            }
        }
        out.flush()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RandomSource, TextInput};
    use std::io::Cursor;

    #[test]
    fn test_render_has_footer() {
        let text = render(&Board::new());
        let lines: Vec<&str> = text.trim().lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[6], "0 1 2 3 4 5 6");
    }

    #[test]
    fn test_human_typos_are_reprompted() {
        // Human opens; bad input, a full-range miss, then quits.
        let human = TextInput::new("You", Cursor::new("abc\n12\nq\n"), Vec::new());
        let mut controller =
            TurnController::new(Box::new(human), Box::new(RandomSource::seeded(3)));
        let mut out = Vec::new();

        let ending = play(&mut controller, &mut out).unwrap();
        assert_eq!(ending, Ending::Interrupted("player quit".into()));

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("'abc' is not a column number"));
        assert!(text.contains("Invalid move: invalid move in column 12: out of range"));
        assert_eq!(controller.board(), &Board::new());
    }

    #[test]
    fn test_computer_game_finishes() {
        let mut controller = TurnController::new(
            Box::new(RandomSource::seeded(10)),
            Box::new(RandomSource::seeded(11)),
        );
        let mut out = Vec::new();
        let ending = play(&mut controller, &mut out).unwrap();

        let result = match ending {
            Ending::Finished(result) => result,
            other => panic!("expected a finished game, got {other:?}"),
        };
        assert!(result.is_terminal());
        let text = String::from_utf8(out).unwrap();
        assert!(text.trim_end().ends_with(&result.message()));
        assert!(text.contains("X plays column"));
    }
}
