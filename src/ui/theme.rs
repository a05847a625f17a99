//! Color palette and style helpers for the TUI
//!
//! A dark cinema palette: near-black backgrounds, warm red accent for the
//! selection and transport, gold for ratings.

use ratatui::style::{Color, Modifier, Style};

/// Cinema color palette
pub struct Theme;

impl Theme {
    // ═══════════════════════════════════════════════════════════════════════
    // CORE PALETTE
    // ═══════════════════════════════════════════════════════════════════════

    /// Background: #0b0b0e
    pub const BACKGROUND: Color = Color::Rgb(0x0b, 0x0b, 0x0e);

    /// Primary: #e50914 (screen red)
    pub const PRIMARY: Color = Color::Rgb(0xe5, 0x09, 0x14);

    /// Secondary: #8ab4f8 (soft blue)
    pub const SECONDARY: Color = Color::Rgb(0x8a, 0xb4, 0xf8);

    /// Accent: #f5c518 (rating gold)
    pub const ACCENT: Color = Color::Rgb(0xf5, 0xc5, 0x18);

    /// Text: #e8e8e8
    pub const TEXT: Color = Color::Rgb(0xe8, 0xe8, 0xe8);

    /// Dim: #6b6b75
    pub const DIM: Color = Color::Rgb(0x6b, 0x6b, 0x75);

    /// Success: #46d369
    pub const SUCCESS: Color = Color::Rgb(0x46, 0xd3, 0x69);

    /// Warning: #ffa00a
    pub const WARNING: Color = Color::Rgb(0xff, 0xa0, 0x0a);

    /// Error: #ff4d4f
    pub const ERROR: Color = Color::Rgb(0xff, 0x4d, 0x4f);

    // ═══════════════════════════════════════════════════════════════════════
    // DERIVED COLORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Panels and cards
    pub const BACKGROUND_LIGHT: Color = Color::Rgb(0x18, 0x18, 0x1d);

    /// Buffered-but-unplayed part of the scrub bar
    pub const BUFFERED: Color = Color::Rgb(0x5a, 0x5a, 0x64);

    /// Border color
    pub const BORDER: Color = Color::Rgb(0x3a, 0x3a, 0x44);

    /// Border color when focused
    pub const BORDER_FOCUSED: Color = Self::PRIMARY;

    // ═══════════════════════════════════════════════════════════════════════
    // STYLE HELPERS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn text() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::BACKGROUND)
    }

    pub fn selected() -> Style {
        Style::default()
            .fg(Self::TEXT)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dimmed() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn error() -> Style {
        Style::default().fg(Self::ERROR).add_modifier(Modifier::BOLD)
    }

    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS).add_modifier(Modifier::BOLD)
    }

    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING).add_modifier(Modifier::BOLD)
    }

    pub fn title() -> Style {
        Style::default().fg(Self::TEXT).add_modifier(Modifier::BOLD)
    }

    pub fn secondary() -> Style {
        Style::default().fg(Self::SECONDARY)
    }

    /// Ratings and badges
    pub fn accent() -> Style {
        Style::default().fg(Self::ACCENT).add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    pub fn border_focused() -> Style {
        Style::default()
            .fg(Self::BORDER_FOCUSED)
            .add_modifier(Modifier::BOLD)
    }

    /// Played part of the scrub bar
    pub fn played() -> Style {
        Style::default().fg(Self::PRIMARY).bg(Self::BACKGROUND_LIGHT)
    }

    /// Buffered part of the scrub bar
    pub fn buffered() -> Style {
        Style::default().fg(Self::BUFFERED).bg(Self::BACKGROUND_LIGHT)
    }

    /// Unbuffered part of the scrub bar
    pub fn unbuffered() -> Style {
        Style::default().fg(Self::BORDER).bg(Self::BACKGROUND_LIGHT)
    }

    /// Server button
    pub fn server_button() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::BACKGROUND_LIGHT)
    }

    /// Selected server button
    pub fn server_button_active() -> Style {
        Self::selected()
    }

    /// "No Ads" badge
    pub fn no_ads_badge() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    /// Resolution badge on cards
    pub fn resolution_badge() -> Style {
        Style::default()
            .fg(Self::BACKGROUND)
            .bg(Self::SECONDARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn keybind() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    pub fn keybind_desc() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::BACKGROUND_LIGHT)
    }

    pub fn loading() -> Style {
        Style::default().fg(Self::SECONDARY).add_modifier(Modifier::BOLD)
    }

    /// Year/date metadata
    pub fn year() -> Style {
        Style::default().fg(Self::SECONDARY)
    }

    /// Genre tags
    pub fn genre() -> Style {
        Style::default().fg(Self::DIM)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// COLOR UTILITIES
// ═══════════════════════════════════════════════════════════════════════════

/// Blend `color` toward the background by `opacity` in `[0, 1]`
///
/// Non-RGB colors are returned unchanged above half opacity and as the
/// background below it.
pub fn fade(color: Color, opacity: f64) -> Color {
    let opacity = opacity.clamp(0.0, 1.0);
    let (Some((r, g, b)), Some((br, bg, bb))) = (color_to_rgb(color), color_to_rgb(Theme::BACKGROUND))
    else {
        return if opacity >= 0.5 { color } else { Theme::BACKGROUND };
    };
    let mix = |c: u8, base: u8| -> u8 {
        (f64::from(base) + (f64::from(c) - f64::from(base)) * opacity).round() as u8
    };
    Color::Rgb(mix(r, br), mix(g, bg), mix(b, bb))
}

/// Relative luminance for a color (WCAG 2.0 definition)
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    fn channel_luminance(c: u8) -> f64 {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    0.2126 * channel_luminance(r) + 0.7152 * channel_luminance(g) + 0.0722 * channel_luminance(b)
}

/// Contrast ratio between two colors, from 1 (same) to 21 (black/white)
pub fn contrast_ratio(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> f64 {
    let l1 = relative_luminance(fg.0, fg.1, fg.2);
    let l2 = relative_luminance(bg.0, bg.1, bg.2);

    let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };

    (lighter + 0.05) / (darker + 0.05)
}

/// Extract RGB tuple from ratatui Color (only works for Rgb variant)
pub fn color_to_rgb(color: Color) -> Option<(u8, u8, u8)> {
    match color {
        Color::Rgb(r, g, b) => Some((r, g, b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(color: Color) -> (u8, u8, u8) {
        color_to_rgb(color).expect("theme colors should all be RGB")
    }

    #[test]
    fn test_text_contrast_against_background() {
        let ratio = contrast_ratio(rgb(Theme::TEXT), rgb(Theme::BACKGROUND));
        assert!(ratio >= 4.5, "text contrast {:.2}:1", ratio);
    }

    #[test]
    fn test_selected_text_readable() {
        let ratio = contrast_ratio(rgb(Theme::TEXT), rgb(Theme::PRIMARY));
        assert!(ratio >= 3.0, "selection contrast {:.2}:1", ratio);
    }

    #[test]
    fn test_accent_contrast() {
        let ratio = contrast_ratio(rgb(Theme::ACCENT), rgb(Theme::BACKGROUND));
        assert!(ratio >= 4.5, "accent contrast {:.2}:1", ratio);
    }

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(Theme::TEXT, 1.0), Theme::TEXT);
        assert_eq!(fade(Theme::TEXT, 0.0), Theme::BACKGROUND);
        assert_eq!(fade(Theme::TEXT, 7.0), Theme::TEXT);
        assert_eq!(fade(Color::Red, 0.2), Theme::BACKGROUND);
        assert_eq!(fade(Color::Red, 0.9), Color::Red);
    }

    #[test]
    fn test_fade_midpoint() {
        let (r, _, _) = rgb(fade(Theme::TEXT, 0.5));
        assert!(r > 0x0b && r < 0xe8);
    }

    #[test]
    fn test_contrast_ratio_black_white() {
        let ratio = contrast_ratio((0, 0, 0), (255, 255, 255));
        assert!((ratio - 21.0).abs() < 0.1);
    }
}
