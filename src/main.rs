//! pyramyd - Terminal Loan Application
//!
//! Walks an applicant through personal details, employment and income, loan
//! details and a final review. Progress is saved after every change so an
//! application can be resumed later.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

use pyramyd::application::{App, SnapshotStore};
use pyramyd::infrastructure::{init_logging, system_theme, Config, FileRepository};
use pyramyd::presentation::{render_ui, InputHandler};

#[derive(Parser)]
#[command(name = "pyramyd", version, about = "Apply for a loan from your terminal")]
struct Cli {
    /// Explicit config file, layered over the user config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the saved draft, theme and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the saved application draft as JSON
    Status,
    /// Delete the saved application draft
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }

    let is_tui_mode = cli.command.is_none();
    let logging = init_logging(&config, is_tui_mode, cli.debug)?;
    if let Some(path) = &logging.log_file_path {
        info!(log_file = %path.display(), "logging to file");
    }

    let repo = FileRepository::new(config.data_dir());
    match cli.command {
        Some(Commands::Status) => print_status(&repo),
        Some(Commands::Reset) => reset_draft(&repo),
        None => run_tui(&config, repo),
    }
}

fn print_status(repo: &FileRepository) -> Result<()> {
    let path = repo.snapshot_path();
    let state = repo
        .load()
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match state {
        Some(state) => {
            let json = serde_json::to_string_pretty(&state).context("Failed to format draft")?;
            println!("{}", json);
        }
        None => println!("No saved application in {}", path.display()),
    }
    Ok(())
}

fn reset_draft(repo: &FileRepository) -> Result<()> {
    repo.clear().context("Failed to clear saved application")?;
    info!(path = %repo.snapshot_path().display(), "saved application cleared");
    println!("Saved application cleared");
    Ok(())
}

fn run_tui(config: &Config, repo: FileRepository) -> Result<()> {
    info!(data_dir = %config.data_dir().display(), "starting");
    let mut app = App::new(
        Box::new(repo.clone()),
        Box::new(repo),
        system_theme(),
        config.submission.timing(),
    );

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, config.ui.tick_rate());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("exiting");
    res.context("Terminal UI failed")
}

/// Main application event loop.
///
/// Waits up to `tick_rate` for a key, then advances the submission timers,
/// so a pending submission completes even while no key is pressed.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, tick_rate: Duration) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    InputHandler::handle_key_event(app, key.code, key.modifiers);
                }
            }
        }

        app.tick(Instant::now());
        if app.should_quit {
            return Ok(());
        }
    }
}
