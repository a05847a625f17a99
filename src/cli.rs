//! CLI - Command Line Interface for ReelTUI
//!
//! Every catalog and resolver operation the TUI performs is scriptable.
//! All output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Browse
//! reeltui popular --page 2
//! reeltui discover --genre Action --json
//!
//! # Servers and playback
//! reeltui servers abc123
//! reeltui resolve abc123 --server 2
//! reeltui play abc123
//! ```

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::api::ApiError;
use crate::models::{StreamServer, MAX_PAGE};

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// Movie or resource not found
    NotFound = 4,
    /// No playback servers available
    NoServers = 5,
    /// Player could not be started
    PlaybackFailed = 6,
}

impl ExitCode {
    /// Exit code for an API failure
    pub fn for_api_error(err: &ApiError) -> Self {
        match err {
            ApiError::NotFound => ExitCode::NotFound,
            ApiError::Network(_) | ApiError::Status(_) => ExitCode::NetworkError,
            ApiError::Parse(_) => ExitCode::Error,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// ReelTUI - terminal movie streaming front-end
///
/// Run without arguments to launch interactive TUI.
/// Use subcommands for scriptable automation.
#[derive(Parser, Debug)]
#[command(
    name = "reeltui",
    version,
    about = "Terminal movie streaming front-end",
    long_about = "Browse a movie catalog, pick a playback server and watch \
                  through mpv with a terminal control surface.\n\n\
                  Run without arguments to launch the interactive TUI.\n\
                  Use subcommands for automation and scripting.",
    after_help = "EXAMPLES:\n\
                  reeltui                             Launch interactive TUI\n\
                  reeltui popular --page 2            Popular movies, page 2\n\
                  reeltui discover --genre Action     Browse a genre\n\
                  reeltui resolve abc123 --json       Direct stream for a movie"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run (omit for TUI mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if running in CLI mode (has subcommand)
    pub fn is_cli_mode(&self) -> bool {
        self.command.is_some()
    }

    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Popular movies from the catalog
    #[command(visible_alias = "pop")]
    Popular(PageCmd),

    /// Recently released movies from the catalog
    #[command(visible_alias = "new")]
    Recent(PageCmd),

    /// Browse TMDB discover results, optionally by genre
    #[command(visible_alias = "d")]
    Discover(DiscoverCmd),

    /// List TMDB movie genres
    Genres(GenresCmd),

    /// Get details for a movie
    #[command(visible_alias = "i")]
    Info(InfoCmd),

    /// List playback servers for a movie
    #[command(visible_alias = "sv")]
    Servers(ServersCmd),

    /// Resolve a server to a direct stream or embed page
    #[command(visible_alias = "r")]
    Resolve(ResolveCmd),

    /// Play a movie in mpv (or the browser for embed-only servers)
    #[command(visible_alias = "p")]
    Play(PlayCmd),
}

fn parse_page(s: &str) -> Result<u32, String> {
    let page: u32 = s.parse().map_err(|_| format!("'{}' is not a page number", s))?;
    if (1..=MAX_PAGE).contains(&page) {
        Ok(page)
    } else {
        Err(format!("page must be between 1 and {}", MAX_PAGE))
    }
}

/// Catalog list page
#[derive(Args, Debug)]
pub struct PageCmd {
    /// Page number (1-500)
    #[arg(long, short = 'p', default_value = "1", value_parser = parse_page)]
    pub page: u32,

    /// Maximum number of results to print
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

/// TMDB discover page
#[derive(Args, Debug)]
pub struct DiscoverCmd {
    /// Genre id or name (case-insensitive)
    #[arg(long, short = 'g')]
    pub genre: Option<String>,

    /// Page number (1-500)
    #[arg(long, short = 'p', default_value = "1", value_parser = parse_page)]
    pub page: u32,
}

#[derive(Args, Debug)]
pub struct GenresCmd {}

#[derive(Args, Debug)]
pub struct InfoCmd {
    /// Catalog movie id
    pub movie_id: String,
}

#[derive(Args, Debug)]
pub struct ServersCmd {
    /// Catalog movie id
    pub movie_id: String,
}

#[derive(Args, Debug)]
pub struct ResolveCmd {
    /// Catalog movie id
    pub movie_id: String,

    /// Server number as shown by `servers` (1-based)
    #[arg(long, short = 's', default_value = "1")]
    pub server: usize,
}

#[derive(Args, Debug)]
pub struct PlayCmd {
    /// Catalog movie id
    pub movie_id: String,

    /// Server number as shown by `servers` (1-based)
    #[arg(long, short = 's', default_value = "1")]
    pub server: usize,

    /// Print the URL instead of launching anything
    #[arg(long)]
    pub dry_run: bool,
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// One server as printed by `servers`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// 1-based server number
    pub number: usize,
    pub label: String,
    pub provider: String,
    pub url: String,
    pub requires_extraction: bool,
}

impl ServerInfo {
    pub fn new(index: usize, server: &StreamServer) -> Self {
        Self {
            number: index + 1,
            label: server.label(index),
            provider: server.provider.clone(),
            url: server.url.clone(),
            requires_extraction: server.requires_extraction,
        }
    }
}

/// How a resolved server plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackKind {
    /// Direct media URL for a native player
    Native,
    /// Embed page for the browser
    Embed,
}

/// Result of `resolve` and `play`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub server: ServerInfo,
    pub kind: PlaybackKind,
    pub url: String,
    /// Stream type reported by the proxy (e.g. `hls`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_type: Option<String>,
    /// Why extraction fell back to the embed page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Result of `play`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayResponse {
    pub status: String,
    pub player: String,
    #[serde(flatten)]
    pub target: ResolveResponse,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print human-readable lines, or the data as JSON in JSON mode
    pub fn print_lines<T: Serialize>(&self, data: T, lines: &[String]) -> anyhow::Result<()> {
        if self.json {
            return self.print(data);
        }
        for line in lines {
            println!("{}", line);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Movie ID Validation
// =============================================================================

/// Validate a catalog movie id (single non-empty path segment)
pub fn validate_movie_id(id: &str) -> Result<&str, &'static str> {
    if id.is_empty() {
        Err("Movie id must not be empty")
    } else if id.chars().any(|c| c == '/' || c == '?' || c == '#' || c.is_whitespace()) {
        Err("Invalid movie id (expected a single catalog id such as 'abc123')")
    } else {
        Ok(id)
    }
}

// =============================================================================
// Tests
// =============================================================================
