//! App state and core application logic
//!
//! Manages the screen stack, per-screen state and keyboard/mouse handling.
//! Network work never happens here: handlers return [`Action`]s for the task
//! runner, and results come back as [`AppMessage`]s tagged with the request
//! they answer so late responses for a screen the user already left are
//! dropped.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::api::ProxyClient;
use crate::models::*;
use crate::player::Player;
use crate::stream::{PlaybackTarget, ResolveTicket, ServerSelection};

// =============================================================================
// Screens
// =============================================================================

/// Application screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Hero banner with popular and recent rows
    #[default]
    Home,
    /// Paginated movie grid with genre filter
    Movies,
    /// Movie detail with server selection
    Detail,
    /// Native player
    Player,
}

// =============================================================================
// Loading State
// =============================================================================

/// Loading state for async operations
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadingState {
    /// Idle - no loading in progress
    #[default]
    Idle,
    /// Loading with optional message
    Loading(Option<String>),
    /// Error with message
    Error(String),
}

impl LoadingState {
    pub fn loading(msg: impl Into<String>) -> Self {
        LoadingState::Loading(Some(msg.into()))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadingState::Error(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            LoadingState::Loading(Some(msg)) => Some(msg),
            LoadingState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

// =============================================================================
// Selection State (per-view)
// =============================================================================

/// Selection state for list views
#[derive(Debug, Clone, Default)]
pub struct ListState {
    /// Currently selected index
    pub selected: usize,
    /// Scroll offset for viewport
    pub offset: usize,
    /// Total number of items
    pub len: usize,
}

impl ListState {
    pub fn new(len: usize) -> Self {
        Self {
            selected: 0,
            offset: 0,
            len,
        }
    }

    /// Move selection back by `step`
    pub fn back(&mut self, step: usize) {
        self.selected = self.selected.saturating_sub(step);
        if self.selected < self.offset {
            self.offset = self.selected;
        }
    }

    /// Move selection forward by `step`, stopping at the last item
    pub fn forward(&mut self, step: usize) {
        if self.len > 0 {
            self.selected = (self.selected + step).min(self.len - 1);
        }
    }

    /// Jump to first item
    pub fn first(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    /// Jump to last item
    pub fn last(&mut self) {
        if self.len > 0 {
            self.selected = self.len - 1;
        }
    }

    /// Update offset to keep selected item visible
    pub fn scroll_into_view(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + visible {
            self.offset = self.selected + 1 - visible;
        }
    }

    /// Update length (e.g., when new results come in)
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if len == 0 {
            self.selected = 0;
            self.offset = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

// =============================================================================
// View-Specific State
// =============================================================================

/// Home rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeRow {
    #[default]
    Popular,
    Recent,
}

/// Scroll distance over which the hero banner fades out
pub const BANNER_FADE_END: u16 = 800;

/// Scroll distance of one up/down step on the home page
pub const HOME_SCROLL_STEP: u16 = 400;

/// Home view state
#[derive(Debug, Clone, Default)]
pub struct HomeState {
    pub popular: Vec<MovieSummary>,
    pub recent: Vec<MovieSummary>,
    pub popular_list: ListState,
    pub recent_list: ListState,
    pub focus: HomeRow,
    /// Content scroll; drives the banner fade
    pub scroll: u16,
    pub loading: LoadingState,
}

impl HomeState {
    /// Hero banner movie (newest release)
    pub fn banner(&self) -> Option<&MovieSummary> {
        self.recent.first()
    }

    /// Banner brightness in `[0, 1]`
    pub fn banner_opacity(&self) -> f64 {
        banner_opacity(self.scroll, BANNER_FADE_END)
    }

    fn focused_list(&mut self) -> &mut ListState {
        match self.focus {
            HomeRow::Popular => &mut self.popular_list,
            HomeRow::Recent => &mut self.recent_list,
        }
    }

    /// Movie under the cursor in the focused row
    pub fn selected_movie(&self) -> Option<&MovieSummary> {
        match self.focus {
            HomeRow::Popular => self.popular.get(self.popular_list.selected),
            HomeRow::Recent => self.recent.get(self.recent_list.selected),
        }
    }

    fn set_rows(&mut self, popular: Vec<MovieSummary>, recent: Vec<MovieSummary>) {
        self.popular_list.set_len(popular.len());
        self.recent_list.set_len(recent.len());
        self.popular = popular;
        self.recent = recent;
        self.loading = LoadingState::Idle;
    }
}

/// Linear fade from 1 at `scroll == 0` to 0 at `scroll >= fade_end`
pub fn banner_opacity(scroll: u16, fade_end: u16) -> f64 {
    if fade_end == 0 {
        return 1.0;
    }
    (1.0 - f64::from(scroll) / f64::from(fade_end)).clamp(0.0, 1.0)
}

/// Movies grid state
#[derive(Debug, Clone)]
pub struct MoviesState {
    pub genres: Vec<Genre>,
    /// Index into `genres`; `None` means all genres
    pub genre: Option<usize>,
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<MovieSummary>,
    pub list: ListState,
    pub loading: LoadingState,
    pub genres_loading: LoadingState,
    /// Grid columns from the last render
    pub columns: usize,
}

impl Default for MoviesState {
    fn default() -> Self {
        Self {
            genres: Vec::new(),
            genre: None,
            page: 1,
            total_pages: 1,
            results: Vec::new(),
            list: ListState::default(),
            loading: LoadingState::Idle,
            genres_loading: LoadingState::Idle,
            columns: 4,
        }
    }
}

impl MoviesState {
    /// TMDB id of the active genre filter
    pub fn genre_id(&self) -> Option<u32> {
        self.genre.and_then(|i| self.genres.get(i)).map(|g| g.id)
    }

    /// Label of the active genre filter
    pub fn genre_label(&self) -> &str {
        self.genre
            .and_then(|i| self.genres.get(i))
            .map(|g| g.name.as_str())
            .unwrap_or("All Genres")
    }

    pub fn selected_movie(&self) -> Option<&MovieSummary> {
        self.results.get(self.list.selected)
    }

    fn request(&mut self) -> Action {
        self.loading = LoadingState::loading("Loading movies...");
        Action::LoadDiscover {
            page: self.page,
            genre: self.genre_id(),
        }
    }
}

/// Detail view state
#[derive(Debug, Clone, Default)]
pub struct DetailState {
    pub movie_id: String,
    pub detail: Option<MovieDetail>,
    pub loading: LoadingState,
    pub servers: ServerSelection,
    pub servers_loading: LoadingState,
    /// Full description shown
    pub show_more: bool,
}

impl DetailState {
    fn new(movie_id: impl Into<String>) -> Self {
        Self {
            movie_id: movie_id.into(),
            loading: LoadingState::loading("Loading movie..."),
            servers_loading: LoadingState::loading("Finding servers..."),
            ..Default::default()
        }
    }

    pub fn title(&self) -> &str {
        self.detail
            .as_ref()
            .map(|d| d.title.as_str())
            .unwrap_or(self.movie_id.as_str())
    }
}

// =============================================================================
// Actions & Messages
// =============================================================================

/// Background work slots; spawning into a slot replaces its previous task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskSlot {
    Home,
    Genres,
    Discover,
    Detail,
    Servers,
    Resolve,
    Embed,
}

/// Work requested by the app
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoadHome,
    LoadGenres,
    LoadDiscover { page: u32, genre: Option<u32> },
    LoadDetail { movie_id: String },
    LoadServers { movie_id: String },
    Resolve { movie_id: String, ticket: ResolveTicket },
    OpenEmbed(String),
    Cancel(TaskSlot),
}

impl Action {
    /// Slot the action's task runs in
    pub fn slot(&self) -> TaskSlot {
        match self {
            Action::LoadHome => TaskSlot::Home,
            Action::LoadGenres => TaskSlot::Genres,
            Action::LoadDiscover { .. } => TaskSlot::Discover,
            Action::LoadDetail { .. } => TaskSlot::Detail,
            Action::LoadServers { .. } => TaskSlot::Servers,
            Action::Resolve { .. } => TaskSlot::Resolve,
            Action::OpenEmbed(_) => TaskSlot::Embed,
            Action::Cancel(slot) => *slot,
        }
    }
}

/// Results of background work, tagged with what they were requested for
#[derive(Debug, Clone, PartialEq)]
pub enum AppMessage {
    HomeLoaded(Result<(Vec<MovieSummary>, Vec<MovieSummary>), String>),
    GenresLoaded(Result<Vec<Genre>, String>),
    DiscoverLoaded {
        page: u32,
        genre: Option<u32>,
        result: Result<DiscoverPage, String>,
    },
    DetailLoaded {
        movie_id: String,
        result: Result<MovieDetail, String>,
    },
    ServersLoaded {
        movie_id: String,
        result: Result<Vec<StreamServer>, String>,
    },
    StreamResolved {
        movie_id: String,
        generation: u64,
        result: Result<Option<ResolvedStream>, String>,
    },
    EmbedOpened(Result<(), String>),
}

// =============================================================================
// Main Application State
// =============================================================================

/// Main application state
#[derive(Debug)]
pub struct App {
    /// Current screen
    pub screen: Screen,
    /// Navigation history stack
    pub nav_stack: Vec<Screen>,
    /// Whether the app is running
    pub running: bool,
    /// Global error message
    pub error: Option<String>,
    /// Transient status line message
    pub status: Option<String>,

    pub home: HomeState,
    pub movies: MoviesState,
    pub detail: DetailState,
    pub player: Player,
    /// Title shown above the player
    pub player_title: String,
    /// Scrub bar area from the last render
    pub scrub_bar: Option<Rect>,

    proxy: ProxyClient,
}

impl App {
    /// Create a new App around a player and the stream proxy
    pub fn new(player: Player, proxy: ProxyClient) -> Self {
        Self {
            screen: Screen::Home,
            nav_stack: Vec::new(),
            running: true,
            error: None,
            status: None,
            home: HomeState::default(),
            movies: MoviesState::default(),
            detail: DetailState::default(),
            player,
            player_title: String::new(),
            scrub_bar: None,
            proxy,
        }
    }

    /// Initial work for the home screen
    pub fn start(&mut self) -> Vec<Action> {
        self.home.loading = LoadingState::loading("Loading movies...");
        vec![Action::LoadHome]
    }

    /// Navigate to a new screen, pushing current to stack
    pub fn navigate(&mut self, screen: Screen) {
        if self.screen != screen {
            self.nav_stack.push(self.screen);
            self.screen = screen;
        }
    }

    /// Go back to previous screen, tearing down what the current one owns
    pub fn back(&mut self) -> Vec<Action> {
        let Some(prev) = self.nav_stack.pop() else {
            return Vec::new();
        };
        let actions = self.leave(self.screen);
        self.screen = prev;
        actions
    }

    fn leave(&mut self, screen: Screen) -> Vec<Action> {
        match screen {
            Screen::Player => {
                self.player.unload();
                self.scrub_bar = None;
                Vec::new()
            }
            Screen::Detail => vec![
                Action::Cancel(TaskSlot::Detail),
                Action::Cancel(TaskSlot::Servers),
                Action::Cancel(TaskSlot::Resolve),
            ],
            Screen::Movies => vec![Action::Cancel(TaskSlot::Discover)],
            Screen::Home => Vec::new(),
        }
    }

    /// Jump to a top-level screen, unwinding the stack
    pub fn switch_to(&mut self, screen: Screen) -> Vec<Action> {
        let mut actions = Vec::new();
        while self.screen != Screen::Home && !self.nav_stack.is_empty() {
            actions.extend(self.back());
        }
        if screen == Screen::Movies {
            self.navigate(Screen::Movies);
            if self.movies.genres.is_empty() && !self.movies.genres_loading.is_loading() {
                self.movies.genres_loading = LoadingState::loading("Loading genres...");
                actions.push(Action::LoadGenres);
            }
            if self.movies.results.is_empty() {
                actions.push(self.movies.request());
            }
        }
        actions
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.player.unload();
        self.running = false;
    }

    /// Set error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error = Some(msg.into());
    }

    /// Open the detail screen for a movie
    pub fn open_detail(&mut self, movie_id: &str) -> Vec<Action> {
        self.detail = DetailState::new(movie_id);
        self.navigate(Screen::Detail);
        vec![
            Action::Cancel(TaskSlot::Resolve),
            Action::LoadDetail {
                movie_id: movie_id.to_string(),
            },
            Action::LoadServers {
                movie_id: movie_id.to_string(),
            },
        ]
    }

    /// How the selected server will play
    pub fn playback_target(&self) -> PlaybackTarget {
        self.detail
            .servers
            .playback_target(|server| self.proxy.embed_url(&server.url))
    }

    /// Per-frame housekeeping; returns true if the player state changed
    pub fn tick(&mut self) -> bool {
        if self.screen == Screen::Player {
            self.player.pump()
        } else {
            false
        }
    }

    // -------------------------------------------------------------------------
    // Background Results
    // -------------------------------------------------------------------------

    /// Apply a background result; stale results are dropped
    pub fn apply(&mut self, msg: AppMessage) -> Vec<Action> {
        match msg {
            AppMessage::HomeLoaded(Ok((popular, recent))) => {
                self.home.set_rows(popular, recent);
            }
            AppMessage::HomeLoaded(Err(e)) => {
                self.home.loading = LoadingState::Error(e);
            }
            AppMessage::GenresLoaded(Ok(genres)) => {
                self.movies.genres = genres;
                self.movies.genres_loading = LoadingState::Idle;
            }
            AppMessage::GenresLoaded(Err(e)) => {
                self.movies.genres_loading = LoadingState::Error(e);
            }
            AppMessage::DiscoverLoaded {
                page,
                genre,
                result,
            } => {
                if page != self.movies.page || genre != self.movies.genre_id() {
                    tracing::debug!(page, ?genre, "discarding stale discover page");
                    return Vec::new();
                }
                match result {
                    Ok(discover) => {
                        self.movies.total_pages = discover.total_pages;
                        self.movies.list = ListState::new(discover.results.len());
                        self.movies.results = discover.results;
                        self.movies.loading = LoadingState::Idle;
                    }
                    Err(e) => self.movies.loading = LoadingState::Error(e),
                }
            }
            AppMessage::DetailLoaded { movie_id, result } => {
                if movie_id != self.detail.movie_id {
                    tracing::debug!(%movie_id, "discarding stale movie detail");
                    return Vec::new();
                }
                match result {
                    Ok(detail) => {
                        self.detail.detail = Some(detail);
                        self.detail.loading = LoadingState::Idle;
                    }
                    Err(e) => self.detail.loading = LoadingState::Error(e),
                }
            }
            AppMessage::ServersLoaded { movie_id, result } => {
                if movie_id != self.detail.movie_id {
                    tracing::debug!(%movie_id, "discarding stale server list");
                    return Vec::new();
                }
                match result {
                    Ok(servers) => {
                        self.detail.servers_loading = if servers.is_empty() {
                            LoadingState::Error("No servers available".to_string())
                        } else {
                            LoadingState::Idle
                        };
                        let ticket = self.detail.servers.load(servers);
                        return self.resolve_action(ticket);
                    }
                    Err(e) => {
                        self.detail.servers.load(Vec::new());
                        self.detail.servers_loading = LoadingState::Error(e);
                    }
                }
            }
            AppMessage::StreamResolved {
                movie_id,
                generation,
                result,
            } => {
                if movie_id != self.detail.movie_id {
                    tracing::debug!(%movie_id, "discarding stale stream resolution");
                    return Vec::new();
                }
                self.detail.servers.apply(generation, result);
            }
            AppMessage::EmbedOpened(Ok(())) => {
                self.status = Some("Opened embed player in browser".to_string());
            }
            AppMessage::EmbedOpened(Err(e)) => {
                self.set_error(format!("Could not open browser: {}", e));
            }
        }
        Vec::new()
    }

    fn resolve_action(&self, ticket: Option<ResolveTicket>) -> Vec<Action> {
        match ticket {
            Some(ticket) => vec![Action::Resolve {
                movie_id: self.detail.movie_id.clone(),
                ticket,
            }],
            None => vec![Action::Cancel(TaskSlot::Resolve)],
        }
    }

    // -------------------------------------------------------------------------
    // Keyboard Event Handling
    // -------------------------------------------------------------------------

    /// Handle keyboard event, returning any background work it triggers
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        // Clear error on any keypress
        self.error = None;
        self.status = None;

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return Vec::new();
        }

        match key.code {
            KeyCode::Char('q') => {
                self.quit();
                return Vec::new();
            }
            KeyCode::Esc | KeyCode::Backspace => return self.back(),
            // Digits pick servers on the detail screen
            KeyCode::Char('1') if self.on_tab_screen() => {
                return self.switch_to(Screen::Home);
            }
            KeyCode::Char('2') if self.on_tab_screen() => {
                return self.switch_to(Screen::Movies);
            }
            _ => {}
        }

        match self.screen {
            Screen::Home => self.handle_home_key(key),
            Screen::Movies => self.handle_movies_key(key),
            Screen::Detail => self.handle_detail_key(key),
            Screen::Player => {
                self.handle_player_key(key);
                Vec::new()
            }
        }
    }

    fn on_tab_screen(&self) -> bool {
        matches!(self.screen, Screen::Home | Screen::Movies)
    }

    fn handle_home_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.home.focused_list().back(1),
            KeyCode::Right | KeyCode::Char('l') => self.home.focused_list().forward(1),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                self.home.focus = HomeRow::Recent;
                self.home.scroll = (self.home.scroll + HOME_SCROLL_STEP).min(BANNER_FADE_END);
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => {
                self.home.focus = HomeRow::Popular;
                self.home.scroll = self.home.scroll.saturating_sub(HOME_SCROLL_STEP);
            }
            KeyCode::Char('r') => return self.start(),
            KeyCode::Char('b') => {
                if let Some(id) = self.home.banner().map(|m| m.id.clone()) {
                    return self.open_detail(&id);
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.home.selected_movie().map(|m| m.id.clone()) {
                    return self.open_detail(&id);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_movies_key(&mut self, key: KeyEvent) -> Vec<Action> {
        let columns = self.movies.columns.max(1);
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.movies.list.back(1),
            KeyCode::Right | KeyCode::Char('l') => self.movies.list.forward(1),
            KeyCode::Up | KeyCode::Char('k') => self.movies.list.back(columns),
            KeyCode::Down | KeyCode::Char('j') => self.movies.list.forward(columns),
            KeyCode::Home => self.movies.list.first(),
            KeyCode::End => self.movies.list.last(),
            KeyCode::Char('n') | KeyCode::PageDown => {
                if self.movies.page < self.movies.total_pages {
                    self.movies.page = clamp_page(self.movies.page + 1);
                    return vec![self.movies.request()];
                }
            }
            KeyCode::Char('p') | KeyCode::PageUp => {
                if self.movies.page > 1 {
                    self.movies.page -= 1;
                    return vec![self.movies.request()];
                }
            }
            KeyCode::Char(']') | KeyCode::Char('g') => return self.cycle_genre(true),
            KeyCode::Char('[') | KeyCode::Char('G') => return self.cycle_genre(false),
            KeyCode::Char('r') => return vec![self.movies.request()],
            // Discover results carry TMDB ids, which the catalog cannot serve
            KeyCode::Enter => {
                if let Some(movie) = self.movies.selected_movie() {
                    self.status = Some(format!("{}: browse only, play titles from Home", movie.title));
                }
            }
            _ => {}
        }
        Vec::new()
    }

    /// Step through `All → genre 0 → … → genre n → All`, resetting to page 1
    fn cycle_genre(&mut self, forward: bool) -> Vec<Action> {
        let count = self.movies.genres.len();
        if count == 0 {
            return Vec::new();
        }
        self.movies.genre = match (self.movies.genre, forward) {
            (None, true) => Some(0),
            (Some(i), true) if i + 1 < count => Some(i + 1),
            (Some(_), true) => None,
            (None, false) => Some(count - 1),
            (Some(0), false) => None,
            (Some(i), false) => Some(i - 1),
        };
        self.movies.page = 1;
        vec![self.movies.request()]
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                let ticket = self.detail.servers.select_next();
                self.resolve_action(ticket)
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                let ticket = self.detail.servers.select_prev();
                self.resolve_action(ticket)
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < self.detail.servers.servers().len() {
                    let ticket = self.detail.servers.select(index);
                    self.resolve_action(ticket)
                } else {
                    Vec::new()
                }
            }
            KeyCode::Char('m') => {
                self.detail.show_more = !self.detail.show_more;
                Vec::new()
            }
            KeyCode::Char('o') => match self.playback_target() {
                PlaybackTarget::Embed(url) | PlaybackTarget::Failed { embed_url: url, .. } => {
                    vec![Action::OpenEmbed(url)]
                }
                PlaybackTarget::Native(_) => {
                    let url = self.detail.servers.selected().map(|s| self.proxy.embed_url(&s.url));
                    url.map(Action::OpenEmbed).into_iter().collect()
                }
                _ => Vec::new(),
            },
            KeyCode::Enter | KeyCode::Char('p') | KeyCode::Char(' ') => self.play_selected(),
            _ => Vec::new(),
        }
    }

    /// Start playback of the selected server
    pub fn play_selected(&mut self) -> Vec<Action> {
        match self.playback_target() {
            PlaybackTarget::Native(stream) => {
                self.player_title = self.detail.title().to_string();
                self.player.load(&stream.url);
                self.navigate(Screen::Player);
                Vec::new()
            }
            PlaybackTarget::Embed(url) => vec![Action::OpenEmbed(url)],
            PlaybackTarget::Failed { reason, embed_url } => {
                self.status = Some(format!("Extraction failed ({}), opening embed page", reason));
                vec![Action::OpenEmbed(embed_url)]
            }
            PlaybackTarget::Resolving => {
                self.status = Some("Still resolving stream...".to_string());
                Vec::new()
            }
            PlaybackTarget::None => {
                self.status = Some("No server selected".to_string());
                Vec::new()
            }
        }
    }

    fn handle_player_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('k') | KeyCode::Enter => self.player.toggle_play(),
            KeyCode::Right | KeyCode::Char('l') => self.player.skip_forward(),
            KeyCode::Left | KeyCode::Char('j') => self.player.skip_backward(),
            KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => self.player.volume_up(),
            KeyCode::Down | KeyCode::Char('-') => self.player.volume_down(),
            KeyCode::Char('m') => self.player.toggle_mute(),
            KeyCode::Char('f') => self.player.toggle_fullscreen(),
            KeyCode::Char('r') => {
                if let Some(url) = self.player.source().map(str::to_string) {
                    self.player.load(&url);
                }
            }
            _ => {}
        }
    }

    // -------------------------------------------------------------------------
    // Mouse Event Handling
    // -------------------------------------------------------------------------

    /// Handle mouse input; only the scrub bar reacts
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.screen != Screen::Player {
            return;
        }
        let Some(bar) = self.scrub_bar else {
            return;
        };
        let on_bar = mouse.row == bar.y && mouse.column >= bar.x && mouse.column < bar.x + bar.width;
        let (offset, width) = bar_offset(bar, mouse.column);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if on_bar => {
                self.player.begin_seek(offset, width);
            }
            MouseEventKind::Drag(MouseButton::Left) if self.player.state().is_seeking => {
                self.player.seek(offset, width);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.player.state().is_seeking {
                    self.player.end_seek();
                }
            }
            _ => {}
        }
    }
}

/// Pointer offset and usable width for a column on the scrub bar
///
/// The last cell maps to the end of the media.
pub fn bar_offset(bar: Rect, column: u16) -> (f64, f64) {
    let width = f64::from(bar.width.saturating_sub(1).max(1));
    let offset = f64::from(column.saturating_sub(bar.x)).min(width);
    (offset, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_state_bounds() {
        let mut list = ListState::new(5);
        list.back(3);
        assert_eq!(list.selected, 0);
        list.forward(10);
        assert_eq!(list.selected, 4);
        list.set_len(2);
        assert_eq!(list.selected, 1);
        list.set_len(0);
        assert_eq!(list.selected, 0);
    }

    #[test]
    fn test_scroll_into_view() {
        let mut list = ListState::new(20);
        list.forward(12);
        list.scroll_into_view(5);
        assert_eq!(list.offset, 8);
        list.first();
        list.scroll_into_view(5);
        assert_eq!(list.offset, 0);
    }

    #[test]
    fn test_banner_opacity() {
        assert_eq!(banner_opacity(0, 800), 1.0);
        assert_eq!(banner_opacity(400, 800), 0.5);
        assert_eq!(banner_opacity(2000, 800), 0.0);
        assert_eq!(banner_opacity(3, 0), 1.0);
    }

    #[test]
    fn test_bar_offset() {
        let bar = Rect::new(10, 5, 101, 1);
        assert_eq!(bar_offset(bar, 10), (0.0, 100.0));
        assert_eq!(bar_offset(bar, 60), (50.0, 100.0));
        assert_eq!(bar_offset(bar, 110), (100.0, 100.0));
        assert_eq!(bar_offset(bar, 3), (0.0, 100.0));
    }

    #[test]
    fn test_loading_state() {
        assert!(LoadingState::loading("x").is_loading());
        assert_eq!(LoadingState::Error("boom".into()).message(), Some("boom"));
        assert_eq!(LoadingState::Idle.message(), None);
    }
}
