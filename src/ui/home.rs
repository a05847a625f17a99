//! Home page
//!
//! Hero banner for the newest release above two horizontal rows: popular
//! movies and recent releases. The banner dims as the content scrolls.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use crate::app::{HomeRow, HomeState, ListState};
use crate::models::MovieSummary;
use crate::ui::theme::{fade, Theme};

/// Width of one card in a row, borders included
pub const CARD_WIDTH: u16 = 22;

const BANNER_HEIGHT: u16 = 8;
const ROW_HEIGHT: u16 = 6;

/// Home view over the home state
pub struct HomeView<'a> {
    state: &'a HomeState,
}

impl<'a> HomeView<'a> {
    pub fn new(state: &'a HomeState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if let Some(msg) = self.state.loading.message() {
            if self.state.popular.is_empty() && self.state.recent.is_empty() {
                let style = if self.state.loading.is_error() {
                    Theme::error()
                } else {
                    Theme::loading()
                };
                let text = Paragraph::new(msg.to_string())
                    .style(style)
                    .alignment(Alignment::Center)
                    .block(panel(" HOME ", false));
                frame.render_widget(text, area);
                return;
            }
        }

        // Banner shrinks as it fades so the rows move up
        let opacity = self.state.banner_opacity();
        let banner_height = (f64::from(BANNER_HEIGHT) * opacity).round() as u16;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(banner_height),
                Constraint::Length(ROW_HEIGHT),
                Constraint::Length(ROW_HEIGHT),
                Constraint::Min(0),
            ])
            .split(area);

        if banner_height > 0 {
            self.render_banner(frame, chunks[0], opacity);
        }
        render_row(
            frame,
            chunks[1],
            " POPULAR MOVIES ",
            &self.state.popular,
            &self.state.popular_list,
            self.state.focus == HomeRow::Popular,
        );
        render_row(
            frame,
            chunks[2],
            " RECENT RELEASES ",
            &self.state.recent,
            &self.state.recent_list,
            self.state.focus == HomeRow::Recent,
        );
    }

    fn render_banner(&self, frame: &mut Frame, area: Rect, opacity: f64) {
        let Some(movie) = self.state.banner() else {
            return;
        };
        let title_style = Style::default()
            .fg(fade(Theme::TEXT, opacity))
            .add_modifier(Modifier::BOLD);
        let meta_style = Style::default().fg(fade(Theme::ACCENT, opacity));
        let hint_style = Style::default().fg(fade(Theme::DIM, opacity));

        let lines = vec![
            Line::from(Span::styled(movie.title.clone(), title_style)),
            Line::from(vec![
                Span::styled(format!("★ {}", movie.rating), meta_style),
                Span::raw("  "),
                Span::styled(movie.resolution.clone(), meta_style),
            ]),
            Line::default(),
            Line::from(Span::styled("[b] Watch now", hint_style)),
        ];

        let banner = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(fade(Theme::PRIMARY, opacity)))
                .title(Span::styled(" NEW ", Style::default().fg(fade(Theme::PRIMARY, opacity)))),
        );
        frame.render_widget(banner, area);
    }
}

/// Render a horizontal row of movie cards, scrolled to keep the cursor visible
pub fn render_row(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    movies: &[MovieSummary],
    list: &ListState,
    focused: bool,
) {
    let block = panel(title, focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if movies.is_empty() {
        frame.render_widget(
            Paragraph::new("Nothing here yet").style(Theme::dimmed()),
            inner,
        );
        return;
    }

    let visible = usize::from((inner.width / CARD_WIDTH).max(1));
    let offset = row_offset(list.selected, visible);

    for (slot, (index, movie)) in movies.iter().enumerate().skip(offset).take(visible).enumerate() {
        let card_area = Rect {
            x: inner.x + slot as u16 * CARD_WIDTH,
            y: inner.y,
            width: CARD_WIDTH.min(inner.width),
            height: inner.height,
        };
        render_card(frame, card_area, movie, focused && index == list.selected);
    }
}

/// First visible card for a row showing `visible` cards
pub fn row_offset(selected: usize, visible: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    selected + 1 - visible.min(selected + 1)
}

/// One movie card: title, resolution badge and rating
pub fn render_card(frame: &mut Frame, area: Rect, movie: &MovieSummary, selected: bool) {
    let border = if selected {
        Theme::border_focused()
    } else {
        Theme::border()
    };
    let title_style = if selected { Theme::selected() } else { Theme::title() };

    let lines = vec![
        Line::from(Span::styled(movie.title.clone(), title_style)),
        Line::from(vec![
            Span::styled(format!(" {} ", movie.resolution), Theme::resolution_badge()),
            Span::raw(" "),
            Span::styled(format!("★ {}", movie.rating), Theme::accent()),
        ]),
    ];

    let card = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border),
    );
    frame.render_widget(card, area);
}

pub(crate) fn panel(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        })
        .title(Span::styled(title, Theme::title()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_offset() {
        assert_eq!(row_offset(0, 4), 0);
        assert_eq!(row_offset(3, 4), 0);
        assert_eq!(row_offset(4, 4), 1);
        assert_eq!(row_offset(9, 4), 6);
        assert_eq!(row_offset(5, 0), 0);
    }
}
