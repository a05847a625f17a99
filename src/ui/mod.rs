//! Terminal UI components
//!
//! Built with ratatui. Views borrow the app's per-screen state and draw it;
//! the only thing flowing back is layout the input handlers need (scrub bar
//! area, grid columns).

pub mod theme;
pub mod home;
pub mod browser;
pub mod detail;
pub mod player;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Screen};

/// Render the whole app: header, current page, status bar, error popup
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(Theme::BACKGROUND)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, chunks[0], app.screen);
    render_content(frame, chunks[1], app);
    render_status_bar(frame, chunks[2], app);

    if let Some(ref error) = app.error {
        render_error_popup(frame, area, error);
    }
}

fn render_header(frame: &mut Frame, area: Rect, screen: Screen) {
    let tab = |label: &'static str, active: bool| {
        if active {
            Span::styled(label, Theme::selected())
        } else {
            Span::styled(label, Theme::dimmed())
        }
    };

    let line = Line::from(vec![
        Span::styled(
            "REEL",
            Style::default().fg(Theme::PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled("TUI", Style::default().fg(Theme::TEXT).add_modifier(Modifier::BOLD)),
        Span::raw("   "),
        tab(" 1 Home ", screen == Screen::Home),
        Span::raw(" "),
        tab(" 2 Movies ", screen == Screen::Movies),
    ]);

    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border()),
    );
    frame.render_widget(header, area);
}

fn render_content(frame: &mut Frame, area: Rect, app: &mut App) {
    match app.screen {
        Screen::Home => home::HomeView::new(&app.home).render(frame, area),
        Screen::Movies => {
            app.movies.columns = browser::grid_columns(area.width);
            browser::BrowserView::new(&app.movies).render(frame, area);
        }
        Screen::Detail => {
            let target = app.playback_target();
            detail::DetailView::new(&app.detail, target).render(frame, area);
        }
        Screen::Player => {
            let bar = player::PlayerView::new(
                &app.player_title,
                app.player.state(),
                app.player.backend_name(),
            )
            .render(frame, area);
            app.scrub_bar = bar;
        }
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let hints: &[(&str, &str)] = match app.screen {
        Screen::Home => &[("←→", "move"), ("↑↓", "row"), ("Enter", "open"), ("b", "banner")],
        Screen::Movies => &[("←↑↓→", "move"), ("n/p", "page"), ("[ ]", "genre"), ("r", "reload")],
        Screen::Detail => &[("Tab/1-9", "server"), ("Enter", "play"), ("o", "browser"), ("m", "more"), ("Esc", "back")],
        Screen::Player => &[("space", "play"), ("←→", "skip"), ("m", "mute"), ("Esc", "back")],
    };

    let mut spans = Vec::new();
    if let Some(status) = &app.status {
        spans.push(Span::styled(format!(" {} ", status), Theme::accent()));
        spans.push(Span::raw(" │ "));
    }
    for (key, desc) in hints {
        spans.push(Span::styled(format!(" {}", key), Theme::keybind()));
        spans.push(Span::styled(format!(" {} ", desc), Theme::keybind_desc()));
    }
    spans.push(Span::styled(" q", Theme::keybind()));
    spans.push(Span::styled(" quit ", Theme::keybind_desc()));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(Theme::status_bar()), area);
}

fn render_error_popup(frame: &mut Frame, area: Rect, error: &str) {
    let width = area.width.min(60);
    let height = 5.min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    frame.render_widget(Clear, popup);
    let text = Paragraph::new(error.to_string())
        .style(Theme::error())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Theme::error())
                .title(Span::styled(" ERROR ", Theme::error())),
        );
    frame.render_widget(text, popup);
}
