use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use connect_four::config::{AppConfig, HumanSide, OpponentKind};
use connect_four::console::{self, Ending};
use connect_four::controller::TurnController;
use connect_four::game::Player;
use connect_four::source::{self, ChannelInput, MoveSource, TextInput};
use connect_four::ui::{App, AppExit, HumanSeat};

/// Exit status when the player closes input or quits mid-game.
const EXIT_INTERRUPTED: u8 = 130;

/// Play Connect Four against a random or policy-driven opponent.
#[derive(Parser)]
#[command(name = "connect_four", about = "Play Connect Four in the terminal")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "connect_four.toml")]
    config: PathBuf,

    /// Use the full-screen terminal UI instead of line-based console play
    #[arg(long)]
    tui: bool,

    /// Which side the human plays
    #[arg(long, value_enum)]
    human_side: Option<HumanSide>,

    /// Automated opponent kind
    #[arg(long, value_enum)]
    opponent: Option<OpponentKind>,

    /// Seed for all random choices
    #[arg(long)]
    seed: Option<u64>,

    /// Override the policy model name
    #[arg(long)]
    model: Option<String>,

    /// Override the policy deadline in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.tui)?;

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(side) = cli.human_side {
        config.game.human_side = side;
    }
    if let Some(opponent) = cli.opponent {
        config.game.opponent = opponent;
    }
    if let Some(seed) = cli.seed {
        config.game.seed = Some(seed);
    }
    if let Some(model) = cli.model {
        config.policy.model = model;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.policy.timeout_ms = timeout_ms;
    }
    config.validate().context("invalid configuration")?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let mut rng = match config.game.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let human = config.game.human_side.resolve(&mut rng);
    info!(human = ?human, opponent = ?config.game.opponent, "starting game");

    if cli.tui {
        run_tui(&config, human)
    } else {
        run_console(&config, human)
    }
}

/// Log to stderr in console mode, to a file under the TUI.
fn init_logging(tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if tui {
        let log_file =
            std::fs::File::create("connect_four.log").context("creating connect_four.log")?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Arc::new(log_file))
            .with_ansi(false)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init();
    }
    Ok(())
}

/// Seat the human (if any) and automated sources for both players.
fn seat<F>(config: &AppConfig, human: Option<Player>, human_source: F) -> Result<TurnController>
where
    F: FnOnce() -> Box<dyn MoveSource>,
{
    let mut human_source = Some(human_source);
    let mut build = |player: Player| -> Result<Box<dyn MoveSource>> {
        if human == Some(player) {
            if let Some(make) = human_source.take() {
                return Ok(make());
            }
        }
        // Distinct stream per seat
        let seed = config
            .game
            .seed
            .map(|s| s.wrapping_add(1 + player.index() as u64));
        source::automated(config.game.opponent, &config.policy, seed)
            .context("setting up the automated opponent")
    };

    let a = build(Player::A)?;
    let b = build(Player::B)?;
    Ok(TurnController::new(a, b))
}

fn run_console(config: &AppConfig, human: Option<Player>) -> Result<ExitCode> {
    let mut controller = seat(config, human, || -> Box<dyn MoveSource> {
        Box::new(TextInput::new("You", io::stdin().lock(), io::stdout()))
    })?;

    if let Some(player) = human {
        println!("You are {}. Type a column number, or 'q' to quit.", player.name());
    }

    match console::play(&mut controller, &mut io::stdout())? {
        Ending::Finished(_) => Ok(ExitCode::SUCCESS),
        Ending::Interrupted(reason) => {
            eprintln!("Game interrupted: {reason}");
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
    }
}

fn run_tui(config: &AppConfig, human: Option<Player>) -> Result<ExitCode> {
    let (tx, rx) = mpsc::channel();
    let controller = seat(config, human, || -> Box<dyn MoveSource> {
        Box::new(ChannelInput::new("You", rx))
    })?;
    let human_seat = human.map(|player| HumanSeat { player, tx });
    let mut app = App::new(controller, human_seat);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture);
    let _ = terminal.show_cursor();

    match res? {
        AppExit::Finished(result) => {
            println!("{}", result.message());
            Ok(ExitCode::SUCCESS)
        }
        AppExit::Interrupted => Ok(ExitCode::from(EXIT_INTERRUPTED)),
        AppExit::Failed(reason) => anyhow::bail!(reason),
    }
}
