//! Player page
//!
//! The video itself plays in the mpv window; this view is the control
//! surface: phase, scrub bar with buffered ranges and seek preview, time,
//! volume and fullscreen state.

use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};

use crate::player::{format_time, PlaybackState, PlayerPhase};
use crate::ui::home::panel;
use crate::ui::Theme;

/// One cell of the scrub bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarCell {
    Played,
    Buffered,
    Empty,
}

/// Classify each of `width` cells by played fraction and buffered ranges
pub fn scrub_cells(width: usize, progress: f64, buffered: &[(f64, f64)]) -> Vec<BarCell> {
    if width == 0 {
        return Vec::new();
    }
    let played = (progress.clamp(0.0, 1.0) * width as f64).round() as usize;
    (0..width)
        .map(|i| {
            let center = (i as f64 + 0.5) / width as f64;
            if i < played {
                BarCell::Played
            } else if buffered.iter().any(|&(s, e)| center >= s && center <= e) {
                BarCell::Buffered
            } else {
                BarCell::Empty
            }
        })
        .collect()
}

/// `▮▮▮▮▯▯` volume meter; empty when muted
pub fn volume_meter(volume: f64, muted: bool, cells: usize) -> String {
    let level = if muted { 0.0 } else { volume.clamp(0.0, 1.0) };
    let filled = (level * cells as f64).round() as usize;
    format!("{}{}", "▮".repeat(filled), "▯".repeat(cells - filled.min(cells)))
}

/// Player control view
pub struct PlayerView<'a> {
    title: &'a str,
    state: &'a PlaybackState,
    backend: &'a str,
}

impl<'a> PlayerView<'a> {
    pub fn new(title: &'a str, state: &'a PlaybackState, backend: &'a str) -> Self {
        Self {
            title,
            state,
            backend,
        }
    }

    /// Render and return the scrub bar area for mouse hit-testing
    pub fn render(&self, frame: &mut Frame, area: Rect) -> Option<Rect> {
        let block = panel(" NOW PLAYING ", true);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);

        self.render_header(frame, chunks[0]);
        self.render_stage(frame, chunks[1]);

        if let PlayerPhase::Failed(_) = self.state.phase {
            return None;
        }

        self.render_preview(frame, chunks[2]);
        let bar = self.render_bar(frame, chunks[3]);
        self.render_times(frame, chunks[4]);
        self.render_controls(frame, chunks[5]);
        bar
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(self.title.to_string(), Theme::title())),
            Line::from(Span::styled(
                format!("via {}", self.backend),
                Theme::dimmed(),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_stage(&self, frame: &mut Frame, area: Rect) {
        let (text, style) = match &self.state.phase {
            PlayerPhase::Idle => ("Nothing loaded".to_string(), Theme::dimmed()),
            PlayerPhase::Loading => ("Loading...".to_string(), Theme::loading()),
            PlayerPhase::Paused => ("❚❚ Paused".to_string(), Theme::text()),
            PlayerPhase::Playing => ("▶ Playing".to_string(), Theme::success()),
            PlayerPhase::Ended => ("■ Ended - [space] to replay".to_string(), Theme::text()),
            PlayerPhase::Failed(reason) => (
                format!("Playback failed: {}\n\n[r] retry   [Esc] back", reason),
                Theme::error(),
            ),
        };
        let stage = Paragraph::new(text)
            .style(style)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(stage, area);
    }

    fn render_preview(&self, frame: &mut Frame, area: Rect) {
        let Some(preview) = &self.state.seek_preview else {
            return;
        };
        if !self.state.is_seeking {
            return;
        }
        let label = format!("◆ {}", format_time(preview.time));
        let max_x = area.width.saturating_sub(label.chars().count() as u16);
        let x = ((preview.fraction * f64::from(area.width)) as u16).min(max_x);
        let marker = Rect {
            x: area.x + x,
            width: area.width - x,
            ..area
        };
        frame.render_widget(Paragraph::new(label).style(Theme::accent()), marker);
    }

    fn render_bar(&self, frame: &mut Frame, area: Rect) -> Option<Rect> {
        if area.width == 0 {
            return None;
        }
        let cells = scrub_cells(
            usize::from(area.width),
            self.state.progress(),
            &self.state.buffered_fractions(),
        );
        let spans: Vec<Span> = cells
            .into_iter()
            .map(|cell| match cell {
                BarCell::Played => Span::styled("━", Theme::played()),
                BarCell::Buffered => Span::styled("━", Theme::buffered()),
                BarCell::Empty => Span::styled("─", Theme::unbuffered()),
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        Some(area)
    }

    fn render_times(&self, frame: &mut Frame, area: Rect) {
        let (duration, remaining) = if self.state.has_duration() {
            (
                format_time(self.state.duration),
                format!("-{}", format_time(self.state.remaining())),
            )
        } else {
            ("--:--".to_string(), String::new())
        };
        let elapsed = Line::from(vec![
            Span::styled(format_time(self.state.current_time), Theme::text()),
            Span::styled(" / ", Theme::dimmed()),
            Span::styled(duration, Theme::dimmed()),
        ]);
        frame.render_widget(Paragraph::new(elapsed), area);
        frame.render_widget(
            Paragraph::new(remaining)
                .style(Theme::dimmed())
                .alignment(Alignment::Right),
            area,
        );
    }

    fn render_controls(&self, frame: &mut Frame, area: Rect) {
        let play = if self.state.is_playing { "❚❚" } else { "▶" };
        let speaker = if self.state.is_muted || self.state.volume == 0.0 {
            "🔇"
        } else {
            "🔊"
        };
        let fullscreen = if self.state.is_fullscreen {
            "[f] exit fullscreen"
        } else {
            "[f] fullscreen"
        };
        let line = Line::from(vec![
            Span::styled(format!("[space] {}  ", play), Theme::keybind()),
            Span::styled("[←/→] ±10s  ", Theme::keybind_desc()),
            Span::styled(format!("{} ", speaker), Theme::text()),
            Span::styled(
                volume_meter(self.state.volume, self.state.is_muted, 10),
                Theme::secondary(),
            ),
            Span::styled("  [m] mute  [+/-] volume  ", Theme::keybind_desc()),
            Span::styled(fullscreen, Theme::keybind_desc()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrub_cells_played_and_buffered() {
        let cells = scrub_cells(10, 0.2, &[(0.0, 0.5)]);
        assert_eq!(cells[0], BarCell::Played);
        assert_eq!(cells[1], BarCell::Played);
        assert_eq!(cells[2], BarCell::Buffered);
        assert_eq!(cells[4], BarCell::Buffered);
        assert_eq!(cells[5], BarCell::Empty);
        assert_eq!(cells[9], BarCell::Empty);
    }

    #[test]
    fn test_scrub_cells_disjoint_ranges() {
        let cells = scrub_cells(10, 0.0, &[(0.0, 0.2), (0.6, 0.8)]);
        let buffered: Vec<usize> = cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == BarCell::Buffered)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(buffered, vec![0, 1, 6, 7]);
    }

    #[test]
    fn test_scrub_cells_empty_width() {
        assert!(scrub_cells(0, 0.5, &[]).is_empty());
    }

    #[test]
    fn test_volume_meter() {
        assert_eq!(volume_meter(0.5, false, 4), "▮▮▯▯");
        assert_eq!(volume_meter(0.8, true, 4), "▯▯▯▯");
        assert_eq!(volume_meter(1.0, false, 3), "▮▮▮");
    }
}
