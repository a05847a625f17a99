//! Movies page
//!
//! Paginated grid of TMDB discover results with a genre filter header and
//! a page footer.

use ratatui::{prelude::*, widgets::Paragraph};

use crate::app::MoviesState;
use crate::ui::home::{panel, render_card, CARD_WIDTH};
use crate::ui::Theme;

const CARD_HEIGHT: u16 = 5;

/// Grid columns that fit in `width` (inside the borders)
pub fn grid_columns(width: u16) -> usize {
    usize::from((width.saturating_sub(2) / CARD_WIDTH).max(1))
}

/// Movies grid view
pub struct BrowserView<'a> {
    state: &'a MoviesState,
}

impl<'a> BrowserView<'a> {
    pub fn new(state: &'a MoviesState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(CARD_HEIGHT),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_filter(frame, chunks[0]);
        self.render_grid(frame, chunks[1]);
        self.render_pager(frame, chunks[2]);
    }

    fn render_filter(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled("Genre: ", Theme::dimmed()),
            Span::styled(self.state.genre_label().to_string(), Theme::accent()),
        ];
        if let Some(msg) = self.state.genres_loading.message() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(msg.to_string(), Theme::dimmed()));
        }
        spans.push(Span::styled("   [ ] change genre", Theme::keybind_desc()));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_grid(&self, frame: &mut Frame, area: Rect) {
        let block = panel(" MOVIES ", true);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(msg) = self.state.loading.message() {
            let style = if self.state.loading.is_error() {
                Theme::error()
            } else {
                Theme::loading()
            };
            frame.render_widget(
                Paragraph::new(msg.to_string())
                    .style(style)
                    .alignment(Alignment::Center),
                inner,
            );
            return;
        }

        if self.state.results.is_empty() {
            frame.render_widget(
                Paragraph::new("No movies found")
                    .style(Theme::dimmed())
                    .alignment(Alignment::Center),
                inner,
            );
            return;
        }

        let columns = usize::from((inner.width / CARD_WIDTH).max(1));
        let rows = usize::from((inner.height / CARD_HEIGHT).max(1));
        let selected_row = self.state.list.selected / columns;
        let first_row = selected_row.saturating_sub(rows - 1);

        let visible = self
            .state
            .results
            .iter()
            .enumerate()
            .skip(first_row * columns)
            .take(rows * columns);

        for (slot, (index, movie)) in visible.enumerate() {
            let col = (slot % columns) as u16;
            let row = (slot / columns) as u16;
            let card = Rect {
                x: inner.x + col * CARD_WIDTH,
                y: inner.y + row * CARD_HEIGHT,
                width: CARD_WIDTH.min(inner.width),
                height: CARD_HEIGHT,
            };
            render_card(frame, card, movie, index == self.state.list.selected);
        }
    }

    fn render_pager(&self, frame: &mut Frame, area: Rect) {
        let prev = if self.state.page > 1 {
            Theme::keybind()
        } else {
            Theme::dimmed()
        };
        let next = if self.state.page < self.state.total_pages {
            Theme::keybind()
        } else {
            Theme::dimmed()
        };
        let line = Line::from(vec![
            Span::styled("◀ [p] Prev", prev),
            Span::styled(
                format!("   Page {} of {}   ", self.state.page, self.state.total_pages),
                Theme::text(),
            ),
            Span::styled("[n] Next ▶", next),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }
}
