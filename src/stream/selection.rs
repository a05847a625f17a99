//! Server selection for the detail screen
//!
//! Exactly one server is selected once a non-empty list is loaded. Every
//! selection change bumps a generation counter; resolution results carry the
//! generation they were requested for and are ignored once it is stale.

use crate::models::{ResolvedStream, StreamServer};

/// Token for an outstanding resolution request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveTicket {
    pub generation: u64,
    pub server: StreamServer,
}

/// Resolution progress for the selected server
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Resolution {
    /// Nothing requested (no selection, or no extraction needed)
    #[default]
    NotRequired,
    Pending,
    Resolved(ResolvedStream),
    /// Proxy answered without a direct stream or failed
    Failed(String),
}

/// What the player area should show for the current selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackTarget {
    /// No server selected
    None,
    /// Waiting on the proxy
    Resolving,
    /// Direct media URL for the native player
    Native(ResolvedStream),
    /// Source must be opened through the embed page
    Embed(String),
    /// Extraction failed; embed page is still offered
    Failed { reason: String, embed_url: String },
}

/// Server list plus the single-selection invariant
#[derive(Debug, Clone, Default)]
pub struct ServerSelection {
    servers: Vec<StreamServer>,
    selected: Option<usize>,
    resolution: Resolution,
    generation: u64,
}

impl ServerSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list and select its first entry
    pub fn load(&mut self, servers: Vec<StreamServer>) -> Option<ResolveTicket> {
        self.servers = servers;
        self.selected = None;
        self.resolution = Resolution::NotRequired;
        self.generation += 1;
        if self.servers.is_empty() {
            None
        } else {
            self.select(0)
        }
    }

    /// Select the server at `index`
    ///
    /// Always invalidates any resolved stream. Returns a ticket when the new
    /// server needs extraction.
    pub fn select(&mut self, index: usize) -> Option<ResolveTicket> {
        let server = self.servers.get(index)?.clone();
        self.selected = Some(index);
        self.generation += 1;

        if server.requires_extraction {
            self.resolution = Resolution::Pending;
            Some(ResolveTicket {
                generation: self.generation,
                server,
            })
        } else {
            self.resolution = Resolution::NotRequired;
            None
        }
    }

    /// Select the next server, wrapping around
    pub fn select_next(&mut self) -> Option<ResolveTicket> {
        let len = self.servers.len();
        let index = self.selected.map(|i| (i + 1) % len.max(1))?;
        self.select(index)
    }

    /// Select the previous server, wrapping around
    pub fn select_prev(&mut self) -> Option<ResolveTicket> {
        let len = self.servers.len();
        let index = self.selected.map(|i| (i + len - 1) % len.max(1))?;
        self.select(index)
    }

    /// Record a resolution outcome; returns false if the ticket is stale
    pub fn apply(&mut self, generation: u64, outcome: Result<Option<ResolvedStream>, String>) -> bool {
        if generation != self.generation || self.resolution != Resolution::Pending {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale stream resolution"
            );
            return false;
        }

        self.resolution = match outcome {
            Ok(Some(stream)) => Resolution::Resolved(stream),
            Ok(None) => Resolution::Failed("Proxy returned no direct stream".to_string()),
            Err(e) => Resolution::Failed(e),
        };
        true
    }

    pub fn servers(&self) -> &[StreamServer] {
        &self.servers
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&StreamServer> {
        self.selected.and_then(|i| self.servers.get(i))
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolved stream for the current selection, if any
    pub fn resolved(&self) -> Option<&ResolvedStream> {
        match &self.resolution {
            Resolution::Resolved(stream) => Some(stream),
            _ => None,
        }
    }

    /// Decide how the current selection plays, given an embed URL builder
    pub fn playback_target(&self, embed_url: impl Fn(&StreamServer) -> String) -> PlaybackTarget {
        let Some(server) = self.selected() else {
            return PlaybackTarget::None;
        };

        match &self.resolution {
            Resolution::Pending => PlaybackTarget::Resolving,
            Resolution::Resolved(stream) => PlaybackTarget::Native(stream.clone()),
            Resolution::Failed(reason) => PlaybackTarget::Failed {
                reason: reason.clone(),
                embed_url: embed_url(server),
            },
            Resolution::NotRequired => PlaybackTarget::Embed(embed_url(server)),
        }
    }
}
