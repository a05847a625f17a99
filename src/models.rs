//! Data structures and types for reeltui
//!
//! Contains all shared models used across the application organized by domain:
//! - **Catalog**: movie summaries, details and genres
//! - **Streams**: playback server candidates and resolved streams
//! - **Playback**: buffered ranges and seek previews used by the player

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest page number the catalog providers will serve
pub const MAX_PAGE: u32 = 500;

/// TMDB poster base (w500 renditions)
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// Poster shown when a TMDB result carries no poster path
pub const PLACEHOLDER_POSTER: &str =
    "https://via.placeholder.com/500x750?text=No+Poster+Available";

/// Clamp a requested page number into the range providers accept
pub fn clamp_page(page: u32) -> u32 {
    page.clamp(1, MAX_PAGE)
}

// =============================================================================
// Catalog Models
// =============================================================================

/// Movie card shown in rows and grids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: String,
    pub title: String,
    pub poster_url: String,
    /// Quality badge ("HD", "CAM", ...)
    pub resolution: String,
    /// Rating as displayed ("7.4", "N/A")
    pub rating: String,
}

impl fmt::Display for MovieSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] ★ {}", self.title, self.resolution, self.rating)
    }
}

/// Full movie information for the detail screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub release_year: Option<i32>,
    /// Runtime as reported by the catalog ("120m", "1h 55m")
    pub duration: String,
    pub rating: String,
    pub genres: Vec<String>,
    pub cast: Vec<String>,
    pub director: String,
    pub poster_url: String,
}

impl MovieDetail {
    /// Metadata line: `year • duration • rating`
    pub fn meta_line(&self) -> String {
        let year = self
            .release_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "----".to_string());
        format!("{} • {} • {}", year, self.duration, self.rating)
    }
}

impl fmt::Display for MovieDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.release_year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{}", self.title),
        }
    }
}

/// TMDB movie genre
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One page of TMDB discover results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverPage {
    pub page: u32,
    /// Total pages, already clamped to [`MAX_PAGE`]
    pub total_pages: u32,
    pub results: Vec<MovieSummary>,
}

/// Extract the release year from a catalog date string
///
/// Accepts full ISO dates (`2020-05-01`), RFC 3339 timestamps and bare years.
pub fn parse_release_year(date: &str) -> Option<i32> {
    use chrono::{DateTime, Datelike, NaiveDate};

    let date = date.trim();
    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(d.year());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.year());
    }
    if date.len() >= 4 && date.is_char_boundary(4) {
        return date[..4].parse().ok();
    }
    None
}

// =============================================================================
// Stream Models
// =============================================================================

/// A playback server candidate for a movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamServer {
    pub url: String,
    pub provider: String,
    /// The source must be run through the proxy to obtain a direct media URL
    pub requires_extraction: bool,
}

impl StreamServer {
    /// Button label for the server at `index` (zero based)
    pub fn label(&self, index: usize) -> String {
        if self.requires_extraction {
            format!("SERVER {} No Ads", index + 1)
        } else {
            format!("SERVER {}", index + 1)
        }
    }
}

impl fmt::Display for StreamServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.provider, self.url)
    }
}

/// Direct media URL returned by the stream proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStream {
    /// Media kind reported by the proxy ("hls", "mp4", ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

// =============================================================================
// Playback Models
// =============================================================================

/// A contiguous buffered interval in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Clamp into `[0, duration]` keeping `start <= end`
    pub fn clamped(self, duration: f64) -> Self {
        let upper = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            f64::MAX
        };
        let start = self.start.max(0.0).min(upper);
        let end = self.end.max(start).min(upper);
        Self { start, end }
    }

    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }
}

/// Frame captured while scrubbing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeekPreview {
    /// `data:image/...;base64,` encoded frame
    pub data_url: String,
    /// Horizontal position on the scrub bar (0.0 - 1.0)
    pub fraction: f64,
    /// Media time the frame was taken for
    pub time: f64,
}
