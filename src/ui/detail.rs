//! Movie detail page
//!
//! Metadata, a collapsible description, the server buttons and what the
//! selected server will play as.

use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};

use crate::app::DetailState;
use crate::models::{MovieDetail, StreamServer};
use crate::stream::PlaybackTarget;
use crate::ui::home::panel;
use crate::ui::Theme;

/// Characters of description shown while collapsed
pub const DESCRIPTION_PREVIEW: usize = 220;

/// Collapse long descriptions unless expanded
///
/// Returns the text to show and whether a toggle is needed at all.
pub fn description_text(description: &str, expanded: bool) -> (String, bool) {
    let long = description.chars().count() > DESCRIPTION_PREVIEW;
    if expanded || !long {
        return (description.to_string(), long);
    }
    let cut: String = description.chars().take(DESCRIPTION_PREVIEW).collect();
    (format!("{}…", cut.trim_end()), true)
}

/// Detail view
pub struct DetailView<'a> {
    state: &'a DetailState,
    target: PlaybackTarget,
}

impl<'a> DetailView<'a> {
    pub fn new(state: &'a DetailState, target: PlaybackTarget) -> Self {
        Self { state, target }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(7)])
            .split(area);

        self.render_info(frame, chunks[0]);
        self.render_servers(frame, chunks[1]);
    }

    fn render_info(&self, frame: &mut Frame, area: Rect) {
        let block = panel(" DETAILS ", false);
        match &self.state.detail {
            Some(detail) => {
                let text = Paragraph::new(self.info_lines(detail))
                    .wrap(Wrap { trim: true })
                    .block(block);
                frame.render_widget(text, area);
            }
            None => {
                let (msg, style) = match &self.state.loading {
                    l if l.is_error() => (l.message().unwrap_or("Failed to load"), Theme::error()),
                    l => (l.message().unwrap_or("Loading..."), Theme::loading()),
                };
                let text = Paragraph::new(msg.to_string())
                    .style(style)
                    .alignment(Alignment::Center)
                    .block(block);
                frame.render_widget(text, area);
            }
        }
    }

    fn info_lines(&self, detail: &MovieDetail) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(detail.title.clone(), Theme::title())),
            Line::from(vec![
                Span::styled(detail.meta_line(), Theme::year()),
                Span::raw("  "),
                Span::styled(format!("★ {}", detail.rating), Theme::accent()),
            ]),
        ];
        if !detail.genres.is_empty() {
            lines.push(Line::from(Span::styled(detail.genres.join(" · "), Theme::genre())));
        }
        lines.push(Line::default());

        let (description, toggle) = description_text(&detail.description, self.state.show_more);
        lines.push(Line::from(Span::styled(description, Theme::text())));
        if toggle {
            let label = if self.state.show_more {
                "[m] Show less"
            } else {
                "[m] Show more"
            };
            lines.push(Line::from(Span::styled(label, Theme::keybind())));
        }
        lines.push(Line::default());

        if !detail.director.is_empty() {
            lines.push(credit_line("Director", &detail.director));
        }
        if !detail.cast.is_empty() {
            lines.push(credit_line("Cast", &detail.cast.join(", ")));
        }
        lines
    }

    fn render_servers(&self, frame: &mut Frame, area: Rect) {
        let block = panel(" SERVERS ", true);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let servers = self.state.servers.servers();
        let mut lines = Vec::new();

        if servers.is_empty() {
            let (msg, style) = match self.state.servers_loading.message() {
                Some(msg) if self.state.servers_loading.is_error() => (msg, Theme::error()),
                Some(msg) => (msg, Theme::loading()),
                None => ("No servers available", Theme::error()),
            };
            lines.push(Line::from(Span::styled(msg.to_string(), style)));
        } else {
            let selected = self.state.servers.selected_index();
            lines.push(server_buttons(servers, selected));
            lines.push(Line::default());
            lines.push(self.target_line());
        }

        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled("[Tab]", Theme::keybind()),
            Span::styled(" server  ", Theme::keybind_desc()),
            Span::styled("[Enter]", Theme::keybind()),
            Span::styled(" play  ", Theme::keybind_desc()),
            Span::styled("[o]", Theme::keybind()),
            Span::styled(" open in browser", Theme::keybind_desc()),
        ]));

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }

    fn target_line(&self) -> Line<'static> {
        match &self.target {
            PlaybackTarget::None => Line::from(Span::styled("No server selected", Theme::dimmed())),
            PlaybackTarget::Resolving => {
                Line::from(Span::styled("Resolving stream...", Theme::loading()))
            }
            PlaybackTarget::Native(stream) => Line::from(vec![
                Span::styled("▶ Direct stream ", Theme::success()),
                Span::styled(format!("({})", stream.kind), Theme::dimmed()),
            ]),
            PlaybackTarget::Embed(_) => Line::from(Span::styled(
                "Embedded player (opens in browser)",
                Theme::secondary(),
            )),
            PlaybackTarget::Failed { reason, .. } => Line::from(vec![
                Span::styled("Extraction failed: ", Theme::warning()),
                Span::styled(reason.clone(), Theme::dimmed()),
                Span::styled("  (embed page available)", Theme::secondary()),
            ]),
        }
    }
}

fn credit_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Theme::dimmed()),
        Span::styled(value.to_string(), Theme::text()),
    ])
}

/// `[SERVER 1 No Ads] [SERVER 2]` with the selected one highlighted
pub fn server_buttons(servers: &[StreamServer], selected: Option<usize>) -> Line<'static> {
    let mut spans = Vec::with_capacity(servers.len() * 2);
    for (i, server) in servers.iter().enumerate() {
        let style = if Some(i) == selected {
            Theme::server_button_active()
        } else {
            Theme::server_button()
        };
        spans.push(Span::styled(format!(" SERVER {}", i + 1), style));
        if server.requires_extraction {
            spans.push(Span::styled(" No Ads", style.patch(Theme::no_ads_badge())));
        }
        spans.push(Span::styled(" ", style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_description_has_no_toggle() {
        let (text, toggle) = description_text("Short.", false);
        assert_eq!(text, "Short.");
        assert!(!toggle);
    }

    #[test]
    fn test_long_description_collapses() {
        let long = "word ".repeat(100);
        let (collapsed, toggle) = description_text(&long, false);
        assert!(toggle);
        assert!(collapsed.ends_with('…'));
        assert!(collapsed.chars().count() <= DESCRIPTION_PREVIEW + 1);

        let (expanded, toggle) = description_text(&long, true);
        assert!(toggle);
        assert_eq!(expanded, long);
    }

    #[test]
    fn test_server_buttons_label() {
        let servers = vec![
            StreamServer {
                url: "https://a".into(),
                provider: "TURBOV".into(),
                requires_extraction: true,
            },
            StreamServer {
                url: "https://b".into(),
                provider: "OTHER".into(),
                requires_extraction: false,
            },
        ];
        let line = server_buttons(&servers, Some(0));
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("SERVER 1 No Ads"));
        assert!(text.contains("SERVER 2"));
        assert!(!text.contains("SERVER 2 No Ads"));
    }
}
