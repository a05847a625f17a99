//! Streaming infrastructure
//!
//! - Resolver: server lists, capability flags and proxy extraction
//! - Selection: single selected server with stale-result protection
//! - Embed: browser fallback for sources that are not extracted

pub mod embed;
pub mod resolver;
pub mod selection;

pub use resolver::{ProviderPolicy, StreamResolver};
pub use selection::{PlaybackTarget, Resolution, ResolveTicket, ServerSelection};
