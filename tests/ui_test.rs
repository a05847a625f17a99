//! UI rendering tests
//!
//! Renders every screen into a `TestBackend` at the minimum (80x24) and a
//! large (200x50) size and checks what ends up in the buffer, plus the
//! layout the input handlers read back (grid columns, scrub bar).

use ratatui::{backend::TestBackend, Terminal};

use reeltui::api::ProxyClient;
use reeltui::app::{App, AppMessage, Screen};
use reeltui::models::{
    DiscoverPage, MovieDetail, MovieSummary, ResolvedStream, StreamServer, TimeRange,
};
use reeltui::player::{
    MediaBackend, MediaEvent, MediaSession, PlaybackError, Player,
};
use reeltui::ui::theme::{color_to_rgb, contrast_ratio, Theme};

// =============================================================================
// Fixtures
// =============================================================================

struct NullSession;

impl MediaSession for NullSession {
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn set_current_time(&mut self, _seconds: f64) {}
    fn current_time(&self) -> f64 {
        0.0
    }
    fn buffered(&self) -> Vec<TimeRange> {
        Vec::new()
    }
    fn set_volume(&mut self, _volume: f64) {}
    fn set_fullscreen(&mut self, _fullscreen: bool) {}
    fn request_frame(&mut self, _request: u64) {}
    fn poll_events(&mut self) -> Vec<MediaEvent> {
        Vec::new()
    }
    fn destroy(&mut self) {}
}

struct NullBackend {
    fail: bool,
}

impl MediaBackend for NullBackend {
    fn name(&self) -> &str {
        "null"
    }
    fn plays_hls_natively(&self) -> bool {
        true
    }
    fn open(&mut self, _url: &str) -> Result<Box<dyn MediaSession>, PlaybackError> {
        if self.fail {
            Err(PlaybackError::Media("codec missing".to_string()))
        } else {
            Ok(Box::new(NullSession))
        }
    }
}

fn app_with(fail: bool) -> App {
    let player = Player::new(Box::new(NullBackend { fail }));
    App::new(player, ProxyClient::new("http://localhost:3000"))
}

fn movie(id: &str, title: &str) -> MovieSummary {
    MovieSummary {
        id: id.to_string(),
        title: title.to_string(),
        poster_url: String::new(),
        resolution: "HD".to_string(),
        rating: "7.9".to_string(),
    }
}

fn home_app() -> App {
    let mut app = app_with(false);
    app.start();
    app.apply(AppMessage::HomeLoaded(Ok((
        vec![movie("p1", "Heat"), movie("p2", "Ronin")],
        vec![movie("r1", "Dune Part Two"), movie("r2", "Civil War")],
    ))));
    app
}

fn detail_app() -> App {
    let mut app = home_app();
    app.open_detail("p1");
    app.apply(AppMessage::DetailLoaded {
        movie_id: "p1".to_string(),
        result: Ok(MovieDetail {
            id: "p1".to_string(),
            title: "Heat".to_string(),
            description: "A group of professional bank robbers start to feel the heat from police."
                .to_string(),
            release_year: Some(1995),
            duration: "170m".to_string(),
            rating: "R".to_string(),
            genres: vec!["Action".to_string(), "Crime".to_string()],
            cast: vec!["Al Pacino".to_string(), "Robert De Niro".to_string()],
            director: "Michael Mann".to_string(),
            poster_url: String::new(),
        }),
    });
    app.apply(AppMessage::ServersLoaded {
        movie_id: "p1".to_string(),
        result: Ok(vec![
            StreamServer {
                url: "https://turbovid.test/e/heat".to_string(),
                provider: "TURBOV".to_string(),
                requires_extraction: true,
            },
            StreamServer {
                url: "https://other.test/embed/heat".to_string(),
                provider: "VIDPLAY".to_string(),
                requires_extraction: false,
            },
        ]),
    });
    app
}

fn player_app(fail: bool) -> App {
    let mut app = app_with(fail);
    app.player_title = "Heat".to_string();
    app.player.load("https://cdn.test/heat.mp4");
    app.player
        .handle_event(MediaEvent::LoadedMetadata { duration: 600.0 });
    app.player.handle_event(MediaEvent::TimeUpdate { time: 95.0 });
    app.navigate(Screen::Player);
    app
}

/// Draw the app and return the buffer as one string
fn render(app: &mut App, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| reeltui::ui::render(frame, app))
        .unwrap();
    terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

const SIZES: [(u16, u16); 2] = [(80, 24), (200, 50)];

// =============================================================================
// Theme
// =============================================================================

#[test]
fn test_text_contrast_on_background() {
    let bg = color_to_rgb(Theme::BACKGROUND).unwrap();
    for (name, color) in [
        ("TEXT", Theme::TEXT),
        ("ACCENT", Theme::ACCENT),
        ("SECONDARY", Theme::SECONDARY),
        ("SUCCESS", Theme::SUCCESS),
        ("ERROR", Theme::ERROR),
    ] {
        let fg = color_to_rgb(color).unwrap();
        let ratio = contrast_ratio(fg, bg);
        assert!(ratio >= 4.5, "{} contrast {:.2} is below 4.5:1", name, ratio);
    }
}

// =============================================================================
// Screens
// =============================================================================

#[test]
fn test_home_renders_rows_and_banner() {
    for (w, h) in SIZES {
        let mut app = home_app();
        let screen = render(&mut app, w, h);

        assert!(screen.contains("REEL"), "{}x{}", w, h);
        assert!(screen.contains("POPULAR MOVIES"), "{}x{}", w, h);
        assert!(screen.contains("RECENT RELEASES"), "{}x{}", w, h);
        assert!(screen.contains("Dune Part Two"), "{}x{}", w, h);
        assert!(screen.contains("Watch now"), "{}x{}", w, h);
    }
}

#[test]
fn test_home_banner_hidden_when_scrolled() {
    let mut app = home_app();
    app.home.scroll = 800;
    let screen = render(&mut app, 80, 24);

    assert!(!screen.contains("Watch now"));
    assert!(screen.contains("POPULAR MOVIES"));
}

#[test]
fn test_home_loading_message() {
    let mut app = app_with(false);
    app.start();
    let screen = render(&mut app, 80, 24);
    assert!(screen.contains("Loading movies..."));
}

#[test]
fn test_movies_grid_records_columns() {
    for (w, h) in SIZES {
        let mut app = home_app();
        app.switch_to(Screen::Movies);
        app.apply(AppMessage::DiscoverLoaded {
            page: 1,
            genre: None,
            result: Ok(DiscoverPage {
                page: 1,
                total_pages: 12,
                results: (0..12).map(|i| movie(&i.to_string(), &format!("Film {}", i))).collect(),
            }),
        });

        let screen = render(&mut app, w, h);

        assert_eq!(app.movies.columns, reeltui::ui::browser::grid_columns(w));
        assert!(screen.contains("All Genres"), "{}x{}", w, h);
        assert!(screen.contains("Page 1 of 12"), "{}x{}", w, h);
        assert!(screen.contains("Film 0"), "{}x{}", w, h);
    }
}

#[test]
fn test_detail_shows_servers() {
    for (w, h) in SIZES {
        let mut app = detail_app();
        let screen = render(&mut app, w, h);

        assert!(screen.contains("Heat"), "{}x{}", w, h);
        assert!(screen.contains("SERVER 1"), "{}x{}", w, h);
        assert!(screen.contains("No Ads"), "{}x{}", w, h);
        assert!(screen.contains("SERVER 2"), "{}x{}", w, h);
        assert!(screen.contains("Resolving stream..."), "{}x{}", w, h);
    }
}

#[test]
fn test_detail_target_after_resolution() {
    let mut app = detail_app();
    let generation = app.detail.servers.generation();
    app.apply(AppMessage::StreamResolved {
        movie_id: "p1".to_string(),
        generation,
        result: Ok(Some(ResolvedStream {
            kind: "hls".to_string(),
            url: "https://cdn.test/heat.m3u8".to_string(),
        })),
    });

    let screen = render(&mut app, 200, 50);
    assert!(screen.contains("Direct stream"));
    assert!(screen.contains("(hls)"));
}

#[test]
fn test_player_records_scrub_bar() {
    for (w, h) in SIZES {
        let mut app = player_app(false);
        let screen = render(&mut app, w, h);

        let bar = app.scrub_bar.expect("scrub bar is laid out");
        assert!(bar.width > 0 && bar.width < w);
        assert_eq!(bar.height, 1);

        assert!(screen.contains("NOW PLAYING"), "{}x{}", w, h);
        assert!(screen.contains("1:35 / 10:00"), "{}x{}", w, h);
        assert!(screen.contains("-8:25"), "{}x{}", w, h);
        assert!(screen.contains("Paused"), "{}x{}", w, h);
    }
}

#[test]
fn test_failed_player_has_no_scrub_bar() {
    let mut app = player_app(true);
    app.scrub_bar = Some(ratatui::layout::Rect::new(0, 0, 10, 1));

    let screen = render(&mut app, 80, 24);

    assert!(app.scrub_bar.is_none());
    assert!(screen.contains("codec missing"));
    assert!(screen.contains("retry"));
}

#[test]
fn test_error_popup() {
    let mut app = home_app();
    app.set_error("Could not open browser");
    let screen = render(&mut app, 80, 24);

    assert!(screen.contains("ERROR"));
    assert!(screen.contains("Could not open browser"));
}

#[test]
fn test_status_message_in_status_bar() {
    let mut app = detail_app();
    app.play_selected();
    let screen = render(&mut app, 200, 50);
    assert!(screen.contains("Still resolving stream..."));
}
