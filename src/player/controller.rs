//! Player controller
//!
//! Owns the media session and mirrors it into [`PlaybackState`]. Writes go to
//! the session immediately; flags such as `is_playing` and `is_fullscreen`
//! are re-synchronized from session events so external changes (end of
//! media, escape in the video window) are never missed.

use crate::models::{SeekPreview, TimeRange};
use crate::player::media::{is_hls_url, MediaBackend, MediaEvent, MediaSession};
use crate::player::state::{PlaybackState, PlayerPhase};

/// Skip step for forward/back controls (seconds)
pub const SKIP_STEP: f64 = 10.0;

/// Volume slider step
pub const VOLUME_STEP: f64 = 0.1;

/// Seek target for a pointer at `offset_x` on a bar `bar_width` wide
///
/// Returns `None` when the bar or the duration is unusable.
pub fn seek_target(offset_x: f64, bar_width: f64, duration: f64) -> Option<f64> {
    if !(bar_width > 0.0) || !duration.is_finite() || !(duration > 0.0) {
        return None;
    }
    let fraction = (offset_x / bar_width).clamp(0.0, 1.0);
    Some(fraction * duration)
}

/// Position after skipping `delta` seconds from `current`
pub fn skip_target(current: f64, delta: f64, duration: f64) -> f64 {
    let upper = if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    };
    (current + delta).clamp(0.0, upper)
}

/// HLS-capable player over a [`MediaBackend`]
pub struct Player {
    backend: Box<dyn MediaBackend>,
    session: Option<Box<dyn MediaSession>>,
    source: Option<String>,
    state: PlaybackState,
    /// Last non-zero volume, restored on unmute
    last_audible: f64,
    /// Tag of the current seek gesture, echoed back with its frame
    gesture: u64,
    /// The current gesture already asked for its frame
    frame_requested: bool,
    /// Latest pointer position in the gesture as (fraction, time)
    pointer: (f64, f64),
}

impl Player {
    pub fn new(backend: Box<dyn MediaBackend>) -> Self {
        Self {
            backend,
            session: None,
            source: None,
            state: PlaybackState::default(),
            last_audible: 1.0,
            gesture: 0,
            frame_requested: false,
            pointer: (0.0, 0.0),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> &PlayerPhase {
        &self.state.phase
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Load a new source, releasing the previous session first
    pub fn load(&mut self, url: &str) {
        self.teardown();

        let volume = self.state.volume;
        let is_muted = self.state.is_muted;
        self.state = PlaybackState {
            phase: PlayerPhase::Loading,
            volume,
            is_muted,
            ..PlaybackState::default()
        };
        self.source = Some(url.to_string());

        if is_hls_url(url) && !self.backend.plays_hls_natively() {
            self.fail(format!("{} cannot play HLS streams", self.backend.name()));
            return;
        }

        tracing::info!(%url, backend = self.backend.name(), "loading media");
        match self.backend.open(url) {
            Ok(mut session) => {
                session.set_volume(self.effective_volume());
                self.session = Some(session);
            }
            Err(e) => {
                tracing::error!(%url, error = %e, "failed to open media");
                self.fail(e.to_string());
            }
        }
    }

    /// Release the session and return to idle
    pub fn unload(&mut self) {
        self.teardown();
        self.source = None;
        let volume = self.state.volume;
        let is_muted = self.state.is_muted;
        self.state = PlaybackState {
            volume,
            is_muted,
            ..PlaybackState::default()
        };
    }

    fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            tracing::debug!(source = ?self.source, "destroying media session");
            session.destroy();
        }
    }

    fn fail(&mut self, reason: String) {
        self.teardown();
        self.state.is_playing = false;
        self.state.is_seeking = false;
        self.state.seek_preview = None;
        self.state.phase = PlayerPhase::Failed(reason);
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Drain session events into state; returns true if anything arrived
    pub fn pump(&mut self) -> bool {
        let events = match self.session.as_mut() {
            Some(session) => session.poll_events(),
            None => return false,
        };
        let changed = !events.is_empty();
        for event in events {
            self.handle_event(event);
        }
        changed
    }

    /// Apply one session event
    pub fn handle_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::LoadedMetadata { duration } => {
                self.state.duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
                if self.state.phase == PlayerPhase::Loading {
                    self.state.phase = if self.state.is_playing {
                        PlayerPhase::Playing
                    } else {
                        PlayerPhase::Paused
                    };
                }
            }
            MediaEvent::TimeUpdate { time } => {
                self.state.current_time = time.max(0.0);
                self.refresh_buffered();
            }
            MediaEvent::Play => {
                self.state.is_playing = true;
                if self.state.phase.is_ready() {
                    self.state.phase = PlayerPhase::Playing;
                }
            }
            MediaEvent::Pause => {
                self.state.is_playing = false;
                if matches!(self.state.phase, PlayerPhase::Playing) {
                    self.state.phase = PlayerPhase::Paused;
                }
            }
            MediaEvent::Ended => {
                self.state.is_playing = false;
                if self.state.phase.is_ready() {
                    self.state.phase = PlayerPhase::Ended;
                }
            }
            MediaEvent::FullscreenChange(fullscreen) => {
                self.state.is_fullscreen = fullscreen;
            }
            MediaEvent::FrameCaptured { request, frame } => {
                if self.state.is_seeking && request == self.gesture {
                    let (fraction, time) = self.pointer;
                    self.state.seek_preview = Some(SeekPreview {
                        data_url: frame.data_url(),
                        fraction,
                        time,
                    });
                } else {
                    tracing::debug!(request, "dropping frame from a finished seek");
                }
            }
            MediaEvent::Error(reason) => {
                tracing::error!(%reason, "media error");
                self.fail(reason);
            }
        }
    }

    fn refresh_buffered(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let duration = self.state.duration;
        self.state.buffered_ranges = session
            .buffered()
            .into_iter()
            .map(|r: TimeRange| r.clamped(duration))
            .collect();
    }

    // -------------------------------------------------------------------------
    // Transport
    // -------------------------------------------------------------------------

    /// Toggle between playing and paused
    pub fn toggle_play(&mut self) {
        if !self.state.phase.is_ready() {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if self.state.is_playing {
            session.pause();
            self.state.is_playing = false;
            self.state.phase = PlayerPhase::Paused;
        } else {
            if self.state.phase == PlayerPhase::Ended {
                session.set_current_time(0.0);
                self.state.current_time = 0.0;
            }
            session.play();
            self.state.is_playing = true;
            self.state.phase = PlayerPhase::Playing;
        }
    }

    /// Pointer down on the scrub bar
    pub fn begin_seek(&mut self, offset_x: f64, bar_width: f64) {
        if !self.state.phase.is_ready() {
            return;
        }
        self.gesture += 1;
        self.frame_requested = false;
        self.state.is_seeking = true;
        self.state.seek_preview = None;
        self.seek(offset_x, bar_width);
    }

    /// Seek to the pointer position on the scrub bar
    ///
    /// During a seek gesture the first call asks the session for one preview
    /// frame; later calls only move the preview with the pointer, whether or
    /// not that frame ever arrives.
    pub fn seek(&mut self, offset_x: f64, bar_width: f64) {
        let Some(target) = seek_target(offset_x, bar_width, self.state.duration) else {
            return;
        };
        let Some(session) = self.session.as_mut() else {
            return;
        };

        session.set_current_time(target);
        self.state.current_time = target;
        if self.state.phase == PlayerPhase::Ended && target < self.state.duration {
            self.state.phase = PlayerPhase::Paused;
        }

        if !self.state.is_seeking {
            return;
        }
        let fraction = target / self.state.duration;
        self.pointer = (fraction, target);
        if let Some(preview) = self.state.seek_preview.as_mut() {
            preview.fraction = fraction;
            preview.time = target;
        }
        if !self.frame_requested {
            self.frame_requested = true;
            session.request_frame(self.gesture);
        }
    }

    /// Pointer up (or leaving the bar)
    pub fn end_seek(&mut self) {
        self.state.is_seeking = false;
        self.state.seek_preview = None;
        self.frame_requested = false;
    }

    /// Skip by `delta` seconds, clamped to the media bounds
    pub fn skip(&mut self, delta: f64) {
        if !self.state.phase.is_ready() {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let current = session.current_time();
        let target = skip_target(current, delta, self.state.duration);
        session.set_current_time(target);
        self.state.current_time = target;
        if self.state.phase == PlayerPhase::Ended && target < self.state.duration {
            self.state.phase = PlayerPhase::Paused;
        }
    }

    pub fn skip_forward(&mut self) {
        self.skip(SKIP_STEP);
    }

    pub fn skip_backward(&mut self) {
        self.skip(-SKIP_STEP);
    }

    // -------------------------------------------------------------------------
    // Volume & fullscreen
    // -------------------------------------------------------------------------

    fn effective_volume(&self) -> f64 {
        if self.state.is_muted {
            0.0
        } else {
            self.state.volume
        }
    }

    /// Set the slider volume; zero mutes
    pub fn set_volume(&mut self, volume: f64) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.state.volume = volume;
        self.state.is_muted = volume == 0.0;
        if volume > 0.0 {
            self.last_audible = volume;
        }
        if let Some(session) = self.session.as_mut() {
            session.set_volume(volume);
        }
    }

    pub fn volume_up(&mut self) {
        self.set_volume(round_step(self.state.volume + VOLUME_STEP));
    }

    pub fn volume_down(&mut self) {
        self.set_volume(round_step(self.state.volume - VOLUME_STEP));
    }

    /// Mute, or restore the last audible volume
    pub fn toggle_mute(&mut self) {
        if self.state.is_muted {
            let restored = self.last_audible;
            self.state.is_muted = false;
            self.state.volume = restored;
            if let Some(session) = self.session.as_mut() {
                session.set_volume(restored);
            }
        } else {
            if self.state.volume > 0.0 {
                self.last_audible = self.state.volume;
            }
            self.state.is_muted = true;
            if let Some(session) = self.session.as_mut() {
                session.set_volume(0.0);
            }
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let fullscreen = !self.state.is_fullscreen;
        session.set_fullscreen(fullscreen);
        self.state.is_fullscreen = fullscreen;
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("backend", &self.backend.name())
            .field("source", &self.source)
            .field("state", &self.state)
            .finish()
    }
}

fn round_step(volume: f64) -> f64 {
    ((volume * 10.0).round() / 10.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_target() {
        assert_eq!(seek_target(50.0, 100.0, 120.0), Some(60.0));
        assert_eq!(seek_target(0.0, 100.0, 120.0), Some(0.0));
        assert_eq!(seek_target(100.0, 100.0, 120.0), Some(120.0));
        assert_eq!(seek_target(130.0, 100.0, 120.0), Some(120.0));
        assert_eq!(seek_target(-5.0, 100.0, 120.0), Some(0.0));
        assert_eq!(seek_target(10.0, 0.0, 120.0), None);
        assert_eq!(seek_target(10.0, 100.0, 0.0), None);
        assert_eq!(seek_target(10.0, 100.0, f64::NAN), None);
    }

    #[test]
    fn test_skip_target_bounds() {
        assert_eq!(skip_target(5.0, -10.0, 100.0), 0.0);
        assert_eq!(skip_target(95.0, 10.0, 100.0), 100.0);
        assert_eq!(skip_target(50.0, 10.0, 100.0), 60.0);
        assert_eq!(skip_target(50.0, 10.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_round_step() {
        assert_eq!(round_step(0.30000000000000004), 0.3);
        assert_eq!(round_step(1.1), 1.0);
        assert_eq!(round_step(-0.1), 0.0);
    }
}
