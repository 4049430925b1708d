//! Human move-sources: line-oriented text input and a channel fed by a UI.

use std::io::{BufRead, Write};
use std::sync::mpsc::{Receiver, TryRecvError};

use tracing::debug;

use super::MoveSource;
use crate::error::{InputParseError, SourceError};
use crate::game::{Board, Player};

/// Human player typing column numbers, one per line.
///
/// Every prompt lists the currently available columns, so a rejected answer
/// is naturally followed by a fresh list.
pub struct TextInput<R, W> {
    name: String,
    input: R,
    prompt: W,
}

impl<R: BufRead, W: Write> TextInput<R, W> {
    pub fn new(name: impl Into<String>, input: R, prompt: W) -> Self {
        TextInput {
            name: name.into(),
            input,
            prompt,
        }
    }

    fn write_prompt(&mut self, board: &Board, player: Player) -> std::io::Result<()> {
        writeln!(self.prompt, "Available moves are: {:?}", board.available_moves())?;
        write!(self.prompt, "Enter move for {}: ", player.name())?;
        self.prompt.flush()
    }
}

impl<R: BufRead, W: Write> MoveSource for TextInput<R, W> {
    fn propose(&mut self, board: &Board, player: Player) -> Result<Option<usize>, SourceError> {
        self.write_prompt(board, player)
            .map_err(|e| SourceError::Disconnected(e.to_string()))?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| SourceError::Disconnected(e.to_string()))?;
        if read == 0 {
            return Err(SourceError::Disconnected("input closed".into()));
        }

        let text = line.trim();
        if text.eq_ignore_ascii_case("q") || text.eq_ignore_ascii_case("quit") {
            return Err(SourceError::Disconnected("player quit".into()));
        }

        debug!(player = %player, input = text, "human input");
        text.parse::<usize>().map(Some).map_err(|_| {
            InputParseError {
                input: text.to_string(),
            }
            .into()
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Human player whose columns arrive over a channel, e.g. from key or mouse
/// events in the terminal UI. Never blocks.
pub struct ChannelInput {
    name: String,
    rx: Receiver<usize>,
}

impl ChannelInput {
    pub fn new(name: impl Into<String>, rx: Receiver<usize>) -> Self {
        ChannelInput {
            name: name.into(),
            rx,
        }
    }
}

impl MoveSource for ChannelInput {
    fn propose(&mut self, _board: &Board, _player: Player) -> Result<Option<usize>, SourceError> {
        match self.rx.try_recv() {
            Ok(col) => Ok(Some(col)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(SourceError::Disconnected("input channel closed".into()))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
