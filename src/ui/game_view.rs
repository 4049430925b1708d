use crate::game::{Board, Cell, GameResult, Player, COLS, ROWS};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Characters per board cell.
const CELL_WIDTH: u16 = 3;
/// Left frame ("  ║") and right frame (" ║") widths.
const LEFT_PAD: u16 = 3;
const RIGHT_PAD: u16 = 2;
const BOARD_WIDTH: u16 = LEFT_PAD + CELL_WIDTH * COLS as u16 + RIGHT_PAD;

/// Everything the view needs from the app.
pub struct ViewModel<'a> {
    pub board: &'a Board,
    pub active: Player,
    pub result: GameResult,
    pub selected_column: usize,
    pub message: Option<&'a str>,
    pub mode: &'a str,
}

/// Render the whole screen, returning the area the board was drawn in so
/// mouse positions can be mapped back to columns.
pub fn render(frame: &mut Frame, view: &ViewModel) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(ROWS as u16 + 4), // Board
            Constraint::Length(3), // Message
            Constraint::Length(3), // Controls
        ])
        .split(frame.area());

    render_header(frame, view, chunks[0]);
    render_board(frame, view.board, view.selected_column, chunks[1]);
    render_message(frame, view.message, chunks[2]);
    render_controls(frame, chunks[3]);
    chunks[1]
}

/// Map a screen x coordinate inside the board area to a column.
pub fn column_at(board_area: Rect, x: u16) -> Option<usize> {
    // Same centering rule the paragraph applies to each line
    let line_start = board_area.x + (board_area.width / 2).saturating_sub(BOARD_WIDTH / 2);
    let first_cell = line_start + LEFT_PAD;
    if x < first_cell {
        return None;
    }
    let col = ((x - first_cell) / CELL_WIDTH) as usize;
    (col < COLS).then_some(col)
}

fn player_color(player: Player) -> Color {
    match player {
        Player::A => Color::Red,
        Player::B => Color::Yellow,
    }
}

fn render_header(frame: &mut Frame, view: &ViewModel, area: Rect) {
    let (status, color) = match view.result {
        GameResult::InProgress => (
            format!("Current Player: {}  |  {}", view.active.name(), view.mode),
            player_color(view.active),
        ),
        GameResult::Win(player) => (
            format!("Game Over: {}  |  {}", view.result.message(), view.mode),
            player_color(player),
        ),
        GameResult::Draw => (
            format!("Game Over: {}  |  {}", view.result.message(), view.mode),
            Color::White,
        ),
    };

    let header = Paragraph::new(status)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Connect Four"),
        );

    frame.render_widget(header, area);
}

fn render_board(frame: &mut Frame, board: &Board, selected_column: usize, area: Rect) {
    let mut lines = Vec::new();

    // Column numbers with selection indicator
    let mut col_line = vec![Span::raw("   ")]; // Padding (3 chars to match "  ║")
    for col in 0..COLS {
        if col == selected_column {
            col_line.push(Span::styled(
                format!(" {} ", col),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ));
        } else {
            col_line.push(Span::raw(format!(" {} ", col)));
        }
    }
    col_line.push(Span::raw("  ")); // Suffix padding to match " ║"
    lines.push(Line::from(col_line));

    let rule = "═".repeat(CELL_WIDTH as usize * COLS + 1);
    lines.push(Line::from(format!("  ╔{rule}╗")));

    for row in 0..ROWS {
        let mut row_spans = vec![Span::raw("  ║")];

        for col in 0..COLS {
            let (symbol, color) = match board.get(row, col) {
                Cell::Empty => (" . ", Color::DarkGray),
                Cell::PlayerA => (" ● ", Color::Red),
                Cell::PlayerB => (" ● ", Color::Yellow),
            };
            row_spans.push(Span::styled(symbol, Style::default().fg(color)));
        }

        row_spans.push(Span::raw(" ║"));
        lines.push(Line::from(row_spans));
    }

    lines.push(Line::from(format!("  ╚{rule}╝")));

    let mut indicator_line = vec![Span::raw("   ")];
    for col in 0..COLS {
        if col == selected_column {
            indicator_line.push(Span::styled(" ▲ ", Style::default().fg(Color::Cyan)));
        } else {
            indicator_line.push(Span::raw("   "));
        }
    }
    indicator_line.push(Span::raw("  "));
    lines.push(Line::from(indicator_line));

    let board_widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(board_widget, area);
}

fn render_message(frame: &mut Frame, message: Option<&str>, area: Rect) {
    let msg_widget = Paragraph::new(message.unwrap_or(""))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let line = Line::from("←/→ or mouse: Select  |  Enter/click: Drop  |  R: Restart  |  Q: Quit");

    let controls = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Controls"),
        );

    frame.render_widget(controls, area);
}
