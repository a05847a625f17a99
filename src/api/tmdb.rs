//! TMDB (The Movie Database) API client
//!
//! Provides the genre list and paginated discover results for the movie grid.
//! API docs: https://developer.themoviedb.org/docs

use serde::Deserialize;

use crate::api::http::{ApiError, JsonClient};
use crate::models::{
    clamp_page, DiscoverPage, Genre, MovieSummary, MAX_PAGE, PLACEHOLDER_POSTER, TMDB_IMAGE_BASE,
};

/// Default TMDB v3 endpoint
pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// TMDB API client
#[derive(Debug, Clone)]
pub struct TmdbClient {
    api_key: String,
    http: JsonClient,
}

impl TmdbClient {
    /// Create a new TMDB client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, TMDB_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: JsonClient::new(base_url),
        }
    }

    /// Movie genres, in TMDB order
    pub async fn genres(&self) -> Result<Vec<Genre>, ApiError> {
        let response: GenreListResponse = self
            .http
            .get("genre/movie/list", &[("api_key", self.api_key.clone())])
            .await?;
        Ok(response.genres)
    }

    /// Discover movies, optionally restricted to a genre
    pub async fn discover(&self, page: u32, genre: Option<u32>) -> Result<DiscoverPage, ApiError> {
        let page = clamp_page(page);
        let mut query = vec![
            ("api_key", self.api_key.clone()),
            ("page", page.to_string()),
        ];
        if let Some(genre) = genre {
            query.push(("with_genres", genre.to_string()));
        }

        let response: DiscoverResponse = self.http.get("discover/movie", &query).await?;
        Ok(response.into_page(page))
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    page: Option<u32>,
    results: Vec<DiscoverMovieRaw>,
    total_pages: Option<u32>,
}

impl DiscoverResponse {
    fn into_page(self, requested: u32) -> DiscoverPage {
        DiscoverPage {
            page: self.page.unwrap_or(requested),
            total_pages: self.total_pages.unwrap_or(1).clamp(1, MAX_PAGE),
            results: self
                .results
                .into_iter()
                .map(DiscoverMovieRaw::into_summary)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DiscoverMovieRaw {
    id: u64,
    title: String,
    poster_path: Option<String>,
    vote_average: Option<f32>,
}

impl DiscoverMovieRaw {
    fn into_summary(self) -> MovieSummary {
        MovieSummary {
            id: self.id.to_string(),
            title: self.title,
            poster_url: poster_url(self.poster_path.as_deref()),
            resolution: "HD".to_string(),
            rating: format!("{:.1}", self.vote_average.unwrap_or(0.0)),
        }
    }
}

/// Full poster URL for a TMDB poster path
pub fn poster_url(path: Option<&str>) -> String {
    match path {
        Some(p) if !p.is_empty() => format!("{}{}", TMDB_IMAGE_BASE, p),
        _ => PLACEHOLDER_POSTER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_url() {
        assert_eq!(
            poster_url(Some("/abc.jpg")),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(poster_url(None), PLACEHOLDER_POSTER);
        assert_eq!(poster_url(Some("")), PLACEHOLDER_POSTER);
    }

    #[test]
    fn test_total_pages_clamped() {
        let response = DiscoverResponse {
            page: Some(3),
            results: vec![],
            total_pages: Some(41_234),
        };
        let page = response.into_page(3);
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, MAX_PAGE);
    }

    #[test]
    fn test_rating_formatting() {
        let raw = DiscoverMovieRaw {
            id: 603,
            title: "The Matrix".to_string(),
            poster_path: None,
            vote_average: Some(8.214),
        };
        let summary = raw.into_summary();
        assert_eq!(summary.id, "603");
        assert_eq!(summary.rating, "8.2");
        assert_eq!(summary.resolution, "HD");
    }
}
