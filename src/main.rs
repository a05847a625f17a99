//! ReelTUI - terminal movie streaming front-end
//!
//! # Usage
//!
//! ```bash
//! # Launch interactive TUI
//! reeltui
//!
//! # CLI mode (for automation)
//! reeltui popular --json
//! reeltui servers abc123
//! reeltui play abc123 --server 2
//! ```

use std::io::{stdout, Stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reeltui::api::ProxyClient;
use reeltui::app::{App, AppMessage};
use reeltui::cli::{self, Cli, Command, ExitCode, Output};
use reeltui::commands::{self, CatalogList};
use reeltui::config::Config;
use reeltui::player::{MediaBackend, Player};
use reeltui::tasks::{Services, TaskRunner};
use reeltui::ui;

/// Terminal type alias for convenience
type Tui = Terminal<CrosstermBackend<Stdout>>;

const DEFAULT_LOG_FILTER: &str = "reeltui=info";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.is_cli_mode() {
        init_cli_logging();
        let exit_code = run_cli(cli).await;
        std::process::exit(exit_code.into());
    } else {
        let log_path = init_tui_logging();
        let config = load_config(cli.config.as_deref())?;
        let result = run_tui(config).await;
        if let (Err(_), Some(path)) = (&result, log_path) {
            eprintln!("Log written to {}", path.display());
        }
        result
    }
}

// =============================================================================
// Setup
// =============================================================================

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
}

/// CLI mode logs to stderr; stdout carries command output
fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// TUI mode logs to a file since the terminal belongs to the UI
fn init_tui_logging() -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("reeltui");
    std::fs::create_dir_all(&dir).ok()?;
    let path = dir.join("reeltui.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file)),
        )
        .init();
    Some(path)
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Ok(Config::load()),
    }
}

#[cfg(unix)]
fn media_backend(config: &Config) -> Box<dyn MediaBackend> {
    Box::new(reeltui::player::MpvBackend::new(config.mpv_program()))
}

#[cfg(not(unix))]
fn media_backend(_config: &Config) -> Box<dyn MediaBackend> {
    use reeltui::player::{MediaSession, PlaybackError};

    struct Unsupported;

    impl MediaBackend for Unsupported {
        fn name(&self) -> &str {
            "none"
        }

        fn plays_hls_natively(&self) -> bool {
            false
        }

        fn open(&mut self, _url: &str) -> Result<Box<dyn MediaSession>, PlaybackError> {
            Err(PlaybackError::Unsupported(
                "native playback needs mpv IPC, which is unix-only".to_string(),
            ))
        }
    }

    Box::new(Unsupported)
}

// =============================================================================
// CLI Mode
// =============================================================================

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return output.error(format!("{:#}", e), ExitCode::InvalidArgs),
    };
    let services = match Services::from_config(&config) {
        Ok(services) => services,
        Err(e) => return output.error(format!("Invalid config: {}", e), ExitCode::InvalidArgs),
    };

    let movie_id = match &cli.command {
        Some(Command::Info(cmd)) => Some(cmd.movie_id.as_str()),
        Some(Command::Servers(cmd)) => Some(cmd.movie_id.as_str()),
        Some(Command::Resolve(cmd)) => Some(cmd.movie_id.as_str()),
        Some(Command::Play(cmd)) => Some(cmd.movie_id.as_str()),
        _ => None,
    };
    if let Some(Err(e)) = movie_id.map(cli::validate_movie_id) {
        return output.error(e, ExitCode::InvalidArgs);
    }

    match cli.command {
        Some(Command::Popular(cmd)) => {
            commands::list_cmd(CatalogList::Popular, cmd, &services, &output).await
        }

        Some(Command::Recent(cmd)) => {
            commands::list_cmd(CatalogList::Recent, cmd, &services, &output).await
        }

        Some(Command::Discover(cmd)) => commands::discover_cmd(cmd, &services, &output).await,

        Some(Command::Genres(cmd)) => commands::genres_cmd(cmd, &services, &output).await,

        Some(Command::Info(cmd)) => commands::info_cmd(cmd, &services, &output).await,

        Some(Command::Servers(cmd)) => commands::servers_cmd(cmd, &services, &output).await,

        Some(Command::Resolve(cmd)) => commands::resolve_cmd(cmd, &services, &output).await,

        Some(Command::Play(cmd)) => {
            commands::play_cmd(cmd, &services, &config.mpv_program(), &output).await
        }

        None => {
            // This shouldn't happen (handled by is_cli_mode check)
            ExitCode::Success
        }
    }
}

// =============================================================================
// TUI Mode
// =============================================================================

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run interactive TUI
async fn run_tui(config: Config) -> Result<()> {
    let services = Services::from_config(&config).context("Invalid provider settings in config")?;
    let player = Player::new(media_backend(&config));
    let mut app = App::new(player, ProxyClient::new(config.proxy_url()));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut tasks = TaskRunner::new(services, tx);

    tracing::info!(catalog = %config.catalog_url(), "starting TUI");

    let mut terminal = init_terminal()?;

    let result = run_event_loop(&mut terminal, &mut app, &mut tasks, &mut rx).await;

    // Always restore terminal, even on error
    tasks.shutdown();
    app.player.unload();
    restore_terminal(&mut terminal)?;

    result
}

/// Main event loop - handles input, background results and player events
async fn run_event_loop(
    terminal: &mut Tui,
    app: &mut App,
    tasks: &mut TaskRunner,
    rx: &mut mpsc::UnboundedReceiver<AppMessage>,
) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(50);

    let actions = app.start();
    tasks.dispatch_all(actions);

    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Input polling blocks the thread; yield so spawned tasks progress
        if event::poll(TICK_RATE)? {
            match event::read()? {
                // Only handle key press events (ignore releases on Windows)
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let actions = app.handle_key(key);
                    tasks.dispatch_all(actions);
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
        tokio::task::yield_now().await;

        while let Ok(msg) = rx.try_recv() {
            let actions = app.apply(msg);
            tasks.dispatch_all(actions);
        }

        app.tick();
    }

    Ok(())
}
