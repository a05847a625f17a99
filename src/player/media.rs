//! Media element abstraction
//!
//! The player drives a [`MediaSession`] the way a page drives a video
//! element: imperative writes (play, seek, volume) plus an event stream that
//! reports what actually happened. A [`MediaBackend`] opens sessions.

use base64::Engine;
use thiserror::Error;

use crate::models::TimeRange;

/// Errors from the playback engine
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Media engine '{0}' not found. Install it first.")]
    EngineNotFound(String),
    #[error("Failed to start media engine: {0}")]
    StartFailed(#[from] std::io::Error),
    #[error("Media engine connection failed: {0}")]
    Ipc(String),
    #[error("Unsupported media: {0}")]
    Unsupported(String),
    #[error("Playback failed: {0}")]
    Media(String),
}

/// Events reported by a media session
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Duration became known; the source is playable
    LoadedMetadata { duration: f64 },
    /// Playback position moved
    TimeUpdate { time: f64 },
    Play,
    Pause,
    Ended,
    /// Fullscreen entered or left, whoever caused it
    FullscreenChange(bool),
    /// Answer to [`MediaSession::request_frame`]
    FrameCaptured { request: u64, frame: FrameSnapshot },
    Error(String),
}

/// Encoded still frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSnapshot {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FrameSnapshot {
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            mime: "image/jpeg".to_string(),
            bytes,
        }
    }

    /// `data:` URL for the frame
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// One loaded source in the playback engine
pub trait MediaSession {
    fn play(&mut self);
    fn pause(&mut self);
    /// Move the playback position (seconds)
    fn set_current_time(&mut self, seconds: f64);
    fn current_time(&self) -> f64;
    /// Buffered intervals, ordered, as the engine reports them
    fn buffered(&self) -> Vec<TimeRange>;
    /// Output volume in `[0, 1]`
    fn set_volume(&mut self, volume: f64);
    fn set_fullscreen(&mut self, fullscreen: bool);
    /// Ask for the frame currently on screen. Must not block; the frame
    /// arrives later as [`MediaEvent::FrameCaptured`] tagged with `request`,
    /// or never if the engine cannot provide one.
    fn request_frame(&mut self, request: u64);
    /// Drain events that arrived since the last call
    fn poll_events(&mut self) -> Vec<MediaEvent>;
    /// Stop all background activity. Called exactly once.
    fn destroy(&mut self);
}

/// Opens media sessions
pub trait MediaBackend {
    fn name(&self) -> &str;
    /// Whether HLS manifests play without an extra streaming layer
    fn plays_hls_natively(&self) -> bool;
    fn open(&mut self, url: &str) -> Result<Box<dyn MediaSession>, PlaybackError>;
}

/// Heuristic HLS detection on a URL
pub fn is_hls_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.to_ascii_lowercase().ends_with(".m3u8")
}
