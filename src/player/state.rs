//! Player state: the phase machine plus everything the controls render

use serde::Serialize;
use std::fmt;

use crate::models::{SeekPreview, TimeRange};

/// Player phase
///
/// `Idle → Loading → Paused ⇄ Playing → Ended`, with `Failed` reachable from
/// any loaded phase. Seeking is tracked separately as a transient flag.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "phase", content = "reason", rename_all = "lowercase")]
pub enum PlayerPhase {
    #[default]
    Idle,
    Loading,
    Paused,
    Playing,
    Ended,
    Failed(String),
}

impl PlayerPhase {
    /// Media is loaded and controllable
    pub fn is_ready(&self) -> bool {
        matches!(
            self,
            PlayerPhase::Paused | PlayerPhase::Playing | PlayerPhase::Ended
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PlayerPhase::Failed(_))
    }
}

impl fmt::Display for PlayerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerPhase::Idle => write!(f, "Idle"),
            PlayerPhase::Loading => write!(f, "Loading"),
            PlayerPhase::Paused => write!(f, "Paused"),
            PlayerPhase::Playing => write!(f, "Playing"),
            PlayerPhase::Ended => write!(f, "Ended"),
            PlayerPhase::Failed(reason) => write!(f, "Playback failed: {}", reason),
        }
    }
}

/// Everything the player UI renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    pub phase: PlayerPhase,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub is_seeking: bool,
    pub seek_preview: Option<SeekPreview>,
    pub buffered_ranges: Vec<TimeRange>,
    /// Slider value in `[0, 1]`
    pub volume: f64,
    pub is_muted: bool,
    pub is_fullscreen: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            phase: PlayerPhase::Idle,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            is_seeking: false,
            seek_preview: None,
            buffered_ranges: Vec::new(),
            volume: 1.0,
            is_muted: false,
            is_fullscreen: false,
        }
    }
}

impl PlaybackState {
    /// Whether the duration is known and usable for fractions
    pub fn has_duration(&self) -> bool {
        self.duration.is_finite() && self.duration > 0.0
    }

    /// Played fraction of the media (0.0 - 1.0)
    pub fn progress(&self) -> f64 {
        if self.has_duration() {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Buffered ranges as `(start, end)` fractions of the duration
    pub fn buffered_fractions(&self) -> Vec<(f64, f64)> {
        if !self.has_duration() {
            return Vec::new();
        }
        self.buffered_ranges
            .iter()
            .map(|r| (r.start / self.duration, r.end / self.duration))
            .collect()
    }

    /// Seconds left until the end
    pub fn remaining(&self) -> f64 {
        (self.duration - self.current_time).max(0.0)
    }
}

/// Format seconds as `m:ss`
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.9), "0:09");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(7260.0), "121:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn test_progress_without_duration() {
        let state = PlaybackState {
            current_time: 30.0,
            ..Default::default()
        };
        assert_eq!(state.progress(), 0.0);
        assert!(state.buffered_fractions().is_empty());
    }

    #[test]
    fn test_buffered_fractions() {
        let state = PlaybackState {
            duration: 100.0,
            buffered_ranges: vec![TimeRange::new(0.0, 25.0), TimeRange::new(50.0, 75.0)],
            ..Default::default()
        };
        assert_eq!(state.buffered_fractions(), vec![(0.0, 0.25), (0.5, 0.75)]);
    }

    #[test]
    fn test_phase_readiness() {
        assert!(!PlayerPhase::Loading.is_ready());
        assert!(PlayerPhase::Paused.is_ready());
        assert!(PlayerPhase::Ended.is_ready());
        assert!(PlayerPhase::Failed("x".into()).is_failed());
    }
}
