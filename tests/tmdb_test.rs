//! TMDB API client tests
//!
//! Tests genre listing, discover pagination, and error handling.

use mockito::{Matcher, Server};
use reeltui::api::{ApiError, TmdbClient};
use reeltui::models::{PLACEHOLDER_POSTER, TMDB_IMAGE_BASE};

// =============================================================================
// Genre Tests
// =============================================================================

#[tokio::test]
async fn test_genres_parse() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/genre/movie/list")
        .match_query(Matcher::UrlEncoded("api_key".into(), "test_key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"genres": [
                {"id": 28, "name": "Action"},
                {"id": 35, "name": "Comedy"},
                {"id": 27, "name": "Horror"}
            ]}"#,
        )
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let genres = client.genres().await.unwrap();

    mock.assert_async().await;

    assert_eq!(genres.len(), 3);
    assert_eq!(genres[0].id, 28);
    assert_eq!(genres[0].name, "Action");
    assert_eq!(genres[2].name, "Horror");
}

#[tokio::test]
async fn test_genres_unauthorized() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/genre/movie/list")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"status_code": 7, "status_message": "Invalid API key"}"#)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("bad_key", server.url());
    let result = client.genres().await;

    assert!(matches!(result, Err(ApiError::Status(401))));
}

// =============================================================================
// Discover Tests
// =============================================================================

#[tokio::test]
async fn test_discover_with_genre() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/discover/movie")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("api_key".into(), "test_key".into()),
            Matcher::UrlEncoded("page".into(), "3".into()),
            Matcher::UrlEncoded("with_genres".into(), "28".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "page": 3,
                "results": [
                    {"id": 414906, "title": "The Batman", "poster_path": "/74xTEgt7R36Fpooo50r9T25onhq.jpg", "vote_average": 7.8},
                    {"id": 157336, "title": "Interstellar", "poster_path": null}
                ],
                "total_pages": 42
            }"#,
        )
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let page = client.discover(3, Some(28)).await.unwrap();

    mock.assert_async().await;

    assert_eq!(page.page, 3);
    assert_eq!(page.total_pages, 42);
    assert_eq!(page.results.len(), 2);

    let batman = &page.results[0];
    assert_eq!(batman.id, "414906");
    assert_eq!(batman.resolution, "HD");
    assert_eq!(batman.rating, "7.8");
    assert_eq!(
        batman.poster_url,
        format!("{}/74xTEgt7R36Fpooo50r9T25onhq.jpg", TMDB_IMAGE_BASE)
    );

    let interstellar = &page.results[1];
    assert_eq!(interstellar.rating, "0.0");
    assert_eq!(interstellar.poster_url, PLACEHOLDER_POSTER);
}

#[tokio::test]
async fn test_discover_without_genre_omits_filter() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/discover/movie")
        .match_query(Matcher::Regex("^api_key=test_key&page=1$".into()))
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let page = client.discover(1, None).await.unwrap();

    mock.assert_async().await;

    // Missing page fields fall back to the request and a single page
    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 1);
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn test_discover_total_pages_clamped() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/discover/movie")
        .match_query(Matcher::UrlEncoded("page".into(), "500".into()))
        .with_status(200)
        .with_body(r#"{"page": 500, "results": [], "total_pages": 43210}"#)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let page = client.discover(777, None).await.unwrap();

    mock.assert_async().await;

    assert_eq!(page.page, 500);
    assert_eq!(page.total_pages, 500);
}

#[tokio::test]
async fn test_discover_malformed_payload() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/discover/movie")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"results": "nope"}"#)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let result = client.discover(1, None).await;

    assert!(matches!(result, Err(ApiError::Parse(_))));
}
