//! Movie catalog API client
//!
//! Lists popular and recently released movies, fetches movie details and
//! the raw playback server list for a movie.

use serde::Deserialize;

use crate::api::http::{ApiError, JsonClient};
use crate::models::{clamp_page, parse_release_year, MovieDetail, MovieSummary};

/// Server entry exactly as the catalog returns it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawServer {
    pub url: String,
    #[serde(default)]
    pub provider: String,
}

/// Movie card from list endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovieCardRaw {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    poster_img: Option<String>,
    #[serde(default)]
    resolution: Option<String>,
    #[serde(default)]
    rating: Option<serde_json::Value>,
}

impl MovieCardRaw {
    fn into_summary(self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            title: self.title,
            poster_url: self.poster_img.unwrap_or_default(),
            resolution: self
                .resolution
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "HD".to_string()),
            rating: rating_text(self.rating).unwrap_or_else(|| "N/A".to_string()),
        }
    }
}

/// Movie detail payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovieRaw {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    synopsis: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    rating: Option<serde_json::Value>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    casts: Vec<String>,
    #[serde(default)]
    directors: Vec<String>,
    #[serde(default)]
    poster_img: Option<String>,
}

impl MovieRaw {
    fn into_detail(self) -> MovieDetail {
        let mut genres: Vec<String> = Vec::with_capacity(self.genres.len());
        for genre in self.genres {
            if !genres.contains(&genre) {
                genres.push(genre);
            }
        }

        MovieDetail {
            id: self.id,
            title: self.title,
            description: self.synopsis.unwrap_or_default(),
            release_year: self.release_date.as_deref().and_then(parse_release_year),
            duration: self.duration.unwrap_or_default(),
            rating: rating_text(self.rating).unwrap_or_else(|| "N/A".to_string()),
            genres,
            cast: self.casts,
            director: self.directors.join(", "),
            poster_url: self.poster_img.unwrap_or_default(),
        }
    }
}

/// Ratings arrive as either strings ("PG-13", "7.2") or numbers
fn rating_text(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Catalog API client
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: JsonClient,
}

impl CatalogClient {
    /// Create a client for the catalog at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: JsonClient::new(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Get movie details by catalog id
    pub async fn movie(&self, id: &str) -> Result<MovieDetail, ApiError> {
        let raw: MovieRaw = self
            .http
            .get(&format!("movies/{}", urlencoding::encode(id)), &[])
            .await?;
        Ok(raw.into_detail())
    }

    /// Get the playback servers for a movie, unfiltered
    pub async fn streams(&self, id: &str) -> Result<Vec<RawServer>, ApiError> {
        self.http
            .get(&format!("movies/{}/streams", urlencoding::encode(id)), &[])
            .await
    }

    /// Popular movies
    pub async fn popular(&self, page: u32) -> Result<Vec<MovieSummary>, ApiError> {
        self.list("popular/movies", page).await
    }

    /// Recently released movies
    pub async fn recent_releases(&self, page: u32) -> Result<Vec<MovieSummary>, ApiError> {
        self.list("recent-release/movies", page).await
    }

    async fn list(&self, path: &str, page: u32) -> Result<Vec<MovieSummary>, ApiError> {
        let page = clamp_page(page);
        let cards: Vec<MovieCardRaw> = self.http.get(path, &[("page", page.to_string())]).await?;
        Ok(cards.into_iter().map(MovieCardRaw::into_summary).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_defaults() {
        let raw: MovieCardRaw =
            serde_json::from_str(r#"{"_id":"m1","title":"Heat","posterImg":"p.jpg"}"#).unwrap();
        let summary = raw.into_summary();
        assert_eq!(summary.resolution, "HD");
        assert_eq!(summary.rating, "N/A");
        assert_eq!(summary.poster_url, "p.jpg");
    }

    #[test]
    fn test_numeric_rating() {
        let raw: MovieCardRaw =
            serde_json::from_str(r#"{"_id":"m1","title":"Heat","rating":7.5}"#).unwrap();
        assert_eq!(raw.into_summary().rating, "7.5");
    }

    #[test]
    fn test_detail_mapping() {
        let raw: MovieRaw = serde_json::from_str(
            r#"{
                "_id": "abc123",
                "title": "X",
                "synopsis": "Plot",
                "releaseDate": "2020-05-01",
                "duration": "120m",
                "rating": "PG-13",
                "genres": ["Action", "Action", "Drama"],
                "casts": ["A", "C"],
                "directors": ["B", "D"],
                "posterImg": "u"
            }"#,
        )
        .unwrap();

        let detail = raw.into_detail();
        assert_eq!(detail.release_year, Some(2020));
        assert_eq!(detail.genres, vec!["Action", "Drama"]);
        assert_eq!(detail.cast, vec!["A", "C"]);
        assert_eq!(detail.director, "B, D");
        assert_eq!(detail.description, "Plot");
    }
}
