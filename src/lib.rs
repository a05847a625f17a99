//! ReelTUI - terminal movie streaming front-end
//!
//! Browse a movie catalog, pick a playback server and watch through mpv with
//! a terminal control surface.
//!
//! # Modules
//!
//! - `models` - Movies, genres, servers, resolved streams, time ranges
//! - `api` - Catalog, TMDB and stream proxy clients
//! - `stream` - Server filtering, selection and stream resolution
//! - `player` - Media element abstraction, mpv backend, player state machine
//! - `ui` - TUI pages
//! - `app` - Application state and navigation
//! - `tasks` - Background fetches feeding the app
//! - `cli` / `commands` - Scriptable subcommands

pub mod models;
pub mod api;
pub mod stream;
pub mod player;
pub mod ui;
pub mod app;
pub mod tasks;
pub mod config;
pub mod cli;
pub mod commands;

// Re-export commonly used types
pub use models::{
    DiscoverPage, Genre, MovieDetail, MovieSummary, ResolvedStream, SeekPreview, StreamServer,
    TimeRange,
};

pub use api::{ApiError, CatalogClient, ProxyClient, TmdbClient};
pub use app::{Action, App, AppMessage, Screen};
pub use config::Config;
pub use player::{PlaybackState, Player, PlayerPhase};
pub use stream::{ProviderPolicy, StreamResolver};
