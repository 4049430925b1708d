use std::io;
use std::sync::mpsc::Sender;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{backend::Backend, layout::Rect, Terminal};
use tracing::warn;

use super::game_view::{self, ViewModel};
use crate::controller::{Rejection, Step, TurnController};
use crate::error::{ControllerError, InvalidMoveReason};
use crate::game::{GameResult, Player, COLS};

/// How the terminal session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppExit {
    /// Quit after the last game finished.
    Finished(GameResult),
    /// Quit in the middle of a game.
    Interrupted,
    /// A move source failed permanently.
    Failed(String),
}

/// The human's seat: which player they are and where their columns go.
pub struct HumanSeat {
    pub player: Player,
    pub tx: Sender<usize>,
}

pub struct App {
    controller: TurnController,
    human: Option<HumanSeat>,
    mode: String,
    selected_column: usize,
    should_quit: bool,
    message: Option<String>,
    failure: Option<String>,
    board_area: Rect,
}

impl App {
    pub fn new(controller: TurnController, human: Option<HumanSeat>) -> Self {
        let mode = format!(
            "X: {}  vs  O: {}",
            controller.source_name(Player::A),
            controller.source_name(Player::B)
        );
        App {
            controller,
            human,
            mode,
            selected_column: COLS / 2, // Start in middle
            should_quit: false,
            message: None,
            failure: None,
            board_area: Rect::default(),
        }
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<AppExit> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            self.handle_events()?;
            self.tick();
        }

        Ok(match (&self.failure, self.controller.result()) {
            (Some(reason), _) => AppExit::Failed(reason.clone()),
            (None, GameResult::InProgress) => AppExit::Interrupted,
            (None, result) => AppExit::Finished(result),
        })
    }

    /// Handle keyboard and mouse events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => self.handle_key(key),
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                self.selected_column = self.selected_column.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.selected_column + 1 < COLS {
                    self.selected_column += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.submit(self.selected_column);
            }
            KeyCode::Char('r') => {
                self.controller.reset();
                self.failure = None;
                self.selected_column = COLS / 2;
                self.message = Some("New game started!".to_string());
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let Some(col) = game_view::column_at(self.board_area, mouse.column) else {
            return;
        };
        match mouse.kind {
            MouseEventKind::Moved => self.selected_column = col,
            MouseEventKind::Down(MouseButton::Left) => {
                self.selected_column = col;
                self.submit(col);
            }
            _ => {}
        }
    }

    /// Hand a column to the human's source, if it is their turn.
    fn submit(&mut self, col: usize) {
        if self.controller.result().is_terminal() {
            self.message = Some("Game over! Press 'r' to restart.".to_string());
            return;
        }
        match &self.human {
            Some(seat) if seat.player == self.controller.active_player() => {
                if seat.tx.send(col).is_err() {
                    warn!("human input channel closed");
                }
            }
            Some(_) => self.message = Some("Wait for your turn.".to_string()),
            None => self.message = Some("Computer is playing both sides.".to_string()),
        }
    }

    /// Advance the game by at most one step.
    fn tick(&mut self) {
        if self.failure.is_some() || self.controller.result().is_terminal() {
            return;
        }

        match self.controller.step() {
            Ok(Step::Waiting) => {}
            Ok(Step::Rejected { rejection, .. }) => {
                self.message = Some(match rejection {
                    Rejection::Move(e) if e.reason == InvalidMoveReason::ColumnFull => {
                        "Column is full!".to_string()
                    }
                    Rejection::Move(_) => "Invalid column!".to_string(),
                    Rejection::Source(e) => e.to_string(),
                });
            }
            Ok(Step::Played { result, .. }) => {
                self.message = result.is_terminal().then(|| result.message());
            }
            Err(ControllerError::GameOver) => {}
            Err(e) => {
                self.message = Some(format!("{e}. Press 'q' to quit."));
                self.failure = Some(e.to_string());
            }
        }
    }

    fn render(&mut self, frame: &mut ratatui::Frame) {
        let view = ViewModel {
            board: self.controller.board(),
            active: self.controller.active_player(),
            result: self.controller.result(),
            selected_column: self.selected_column,
            message: self.message.as_deref(),
            mode: &self.mode,
        };
        self.board_area = game_view::render(frame, &view);
    }
}
