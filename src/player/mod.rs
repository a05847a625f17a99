//! Video player
//!
//! - `media`: the media element and backend traits
//! - `state`: phase machine and rendered playback state
//! - `controller`: transport, seek, volume and fullscreen logic
//! - `mpv`: mpv-backed implementation over JSON IPC

pub mod controller;
pub mod media;
#[cfg(unix)]
pub mod mpv;
pub mod state;

pub use controller::{seek_target, skip_target, Player, SKIP_STEP, VOLUME_STEP};
pub use media::{FrameSnapshot, MediaBackend, MediaEvent, MediaSession, PlaybackError};
pub use state::{format_time, PlaybackState, PlayerPhase};

#[cfg(unix)]
pub use mpv::MpvBackend;
