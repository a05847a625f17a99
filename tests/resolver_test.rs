//! Stream resolver tests
//!
//! Server list filtering, the extraction capability flag, proxy extraction
//! and selection bookkeeping across stale results.

use mockito::{Matcher, Server, ServerGuard};
use reeltui::api::{ApiError, CatalogClient, ProxyClient};
use reeltui::models::{ResolvedStream, StreamServer};
use reeltui::stream::{PlaybackTarget, ProviderPolicy, Resolution, ServerSelection, StreamResolver};

// =============================================================================
// Helpers
// =============================================================================

fn resolver_for(server: &ServerGuard) -> StreamResolver {
    StreamResolver::new(
        CatalogClient::new(server.url()),
        ProxyClient::new(server.url()),
        ProviderPolicy::default(),
    )
}

fn streams_body() -> &'static str {
    r#"[
        {"url": "https://cloud.hownetwork.xyz/video.php?id=1", "provider": "HOWNET"},
        {"url": "https://turbovid.test/e/abc", "provider": "TURBOV"},
        {"url": "https://other.test/embed/abc", "provider": "VIDPLAY"}
    ]"#
}

fn server(url: &str, provider: &str, requires_extraction: bool) -> StreamServer {
    StreamServer {
        url: url.to_string(),
        provider: provider.to_string(),
        requires_extraction,
    }
}

// =============================================================================
// Server Lists
// =============================================================================

#[tokio::test]
async fn test_list_drops_low_quality_first_entry() {
    let mut mock_server = Server::new_async().await;

    let mock = mock_server
        .mock("GET", "/movies/abc123/streams")
        .with_status(200)
        .with_body(streams_body())
        .create_async()
        .await;

    let resolver = resolver_for(&mock_server);
    let servers = resolver.list_servers("abc123").await;

    mock.assert_async().await;

    assert_eq!(servers.len(), 2);
    assert_eq!(servers[0].provider, "TURBOV");
    assert!(servers[0].requires_extraction);
    assert_eq!(servers[1].provider, "VIDPLAY");
    assert!(!servers[1].requires_extraction);
}

#[tokio::test]
async fn test_list_keeps_low_quality_host_when_not_first() {
    let mut mock_server = Server::new_async().await;

    let _mock = mock_server
        .mock("GET", "/movies/abc123/streams")
        .with_status(200)
        .with_body(
            r#"[
                {"url": "https://other.test/embed/abc", "provider": "VIDPLAY"},
                {"url": "https://cloud.hownetwork.xyz/video.php?id=1", "provider": "HOWNET"}
            ]"#,
        )
        .create_async()
        .await;

    let resolver = resolver_for(&mock_server);
    let servers = resolver.list_servers("abc123").await;

    assert_eq!(servers.len(), 2);
    assert_eq!(servers[1].provider, "HOWNET");
}

#[tokio::test]
async fn test_list_servers_swallows_errors() {
    let mut mock_server = Server::new_async().await;

    let _mock = mock_server
        .mock("GET", "/movies/abc123/streams")
        .with_status(500)
        .create_async()
        .await;

    let resolver = resolver_for(&mock_server);

    assert!(resolver.list_servers("abc123").await.is_empty());
    assert!(matches!(
        resolver.try_list_servers("abc123").await,
        Err(ApiError::Status(500))
    ));
}

#[tokio::test]
async fn test_custom_policy_flags_providers() {
    let mut mock_server = Server::new_async().await;

    let _mock = mock_server
        .mock("GET", "/movies/abc123/streams")
        .with_status(200)
        .with_body(streams_body())
        .create_async()
        .await;

    let policy = ProviderPolicy::new(Vec::<String>::new(), ["vidplay"]).unwrap();
    let resolver = StreamResolver::new(
        CatalogClient::new(mock_server.url()),
        ProxyClient::new(mock_server.url()),
        policy,
    );
    let servers = resolver.list_servers("abc123").await;

    // Nothing is dropped without host patterns
    assert_eq!(servers.len(), 3);
    let flagged: Vec<&str> = servers
        .iter()
        .filter(|s| s.requires_extraction)
        .map(|s| s.provider.as_str())
        .collect();
    assert_eq!(flagged, vec!["VIDPLAY"]);
}

#[test]
fn test_invalid_policy_pattern() {
    let result = ProviderPolicy::new(["(unclosed"], ["TURBOV"]);
    assert!(result.is_err());
}

// =============================================================================
// Resolution
// =============================================================================

#[tokio::test]
async fn test_resolve_extracts_through_proxy() {
    let mut mock_server = Server::new_async().await;

    let mock = mock_server
        .mock("GET", "/api/movies/streams")
        .match_query(Matcher::UrlEncoded(
            "url".into(),
            "https://turbovid.test/e/abc".into(),
        ))
        .with_status(200)
        .with_body(r#"{"type": "hls", "url": "https://cdn.test/master.m3u8"}"#)
        .create_async()
        .await;

    let resolver = resolver_for(&mock_server);
    let stream = resolver
        .resolve(&server("https://turbovid.test/e/abc", "TURBOV", true))
        .await
        .unwrap()
        .unwrap();

    mock.assert_async().await;

    assert_eq!(stream.kind, "hls");
    assert_eq!(stream.url, "https://cdn.test/master.m3u8");
}

#[tokio::test]
async fn test_resolve_skips_proxy_without_extraction() {
    let mut mock_server = Server::new_async().await;

    let mock = mock_server
        .mock("GET", "/api/movies/streams")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let resolver = resolver_for(&mock_server);
    let result = resolver
        .resolve(&server("https://other.test/embed/abc", "VIDPLAY", false))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(result.is_none());
}

#[tokio::test]
async fn test_resolve_unusable_payload_is_none() {
    let mut mock_server = Server::new_async().await;

    let _mock = mock_server
        .mock("GET", "/api/movies/streams")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"error": "no sources"}"#)
        .create_async()
        .await;

    let resolver = resolver_for(&mock_server);
    let result = resolver
        .resolve(&server("https://turbovid.test/e/abc", "TURBOV", true))
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_resolve_proxy_failure() {
    let mut mock_server = Server::new_async().await;

    let _mock = mock_server
        .mock("GET", "/api/movies/streams")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let resolver = resolver_for(&mock_server);
    let result = resolver
        .resolve(&server("https://turbovid.test/e/abc", "TURBOV", true))
        .await;

    assert!(matches!(result, Err(ApiError::Status(503))));
}

#[test]
fn test_embed_url_points_at_proxy() {
    let resolver = StreamResolver::new(
        CatalogClient::new("http://catalog.test"),
        ProxyClient::new("http://localhost:3000"),
        ProviderPolicy::default(),
    );
    let url = resolver.embed_url(&server("https://other.test/embed/abc", "VIDPLAY", false));

    assert_eq!(
        url,
        "http://localhost:3000/api/movies/streams?url=https%3A%2F%2Fother.test%2Fembed%2Fabc"
    );
}

// =============================================================================
// Selection
// =============================================================================

fn sample_servers() -> Vec<StreamServer> {
    vec![
        server("https://turbovid.test/e/abc", "TURBOV", true),
        server("https://other.test/embed/abc", "VIDPLAY", false),
        server("https://third.test/embed/abc", "UPCLOUD", false),
    ]
}

fn hls() -> ResolvedStream {
    ResolvedStream {
        kind: "hls".to_string(),
        url: "https://cdn.test/master.m3u8".to_string(),
    }
}

#[test]
fn test_selection_starts_on_first_server() {
    let mut selection = ServerSelection::new();
    let ticket = selection.load(sample_servers()).unwrap();

    assert_eq!(selection.selected_index(), Some(0));
    assert_eq!(ticket.server.provider, "TURBOV");
    assert_eq!(ticket.generation, selection.generation());
    assert_eq!(selection.resolution(), &Resolution::Pending);
    assert_eq!(
        selection.playback_target(|s| s.url.clone()),
        PlaybackTarget::Resolving
    );
}

#[test]
fn test_selection_empty_list() {
    let mut selection = ServerSelection::new();
    assert!(selection.load(Vec::new()).is_none());
    assert_eq!(selection.selected_index(), None);
    assert!(selection.select_next().is_none());
    assert_eq!(
        selection.playback_target(|s| s.url.clone()),
        PlaybackTarget::None
    );
}

#[test]
fn test_stale_resolution_is_ignored() {
    let mut selection = ServerSelection::new();
    let first = selection.load(sample_servers()).unwrap();

    // Switch away before the proxy answers
    assert!(selection.select(1).is_none());
    assert!(!selection.apply(first.generation, Ok(Some(hls()))));
    assert!(selection.resolved().is_none());
    assert_eq!(
        selection.playback_target(|s| format!("embed:{}", s.provider)),
        PlaybackTarget::Embed("embed:VIDPLAY".to_string())
    );

    // Switch back: only the newest ticket counts
    let second = selection.select(0).unwrap();
    assert_ne!(first.generation, second.generation);
    assert!(!selection.apply(first.generation, Ok(Some(hls()))));
    assert!(selection.apply(second.generation, Ok(Some(hls()))));
    assert_eq!(selection.resolved(), Some(&hls()));

    // A late duplicate for the same generation is ignored too
    assert!(!selection.apply(second.generation, Err("late".to_string())));
    assert_eq!(selection.resolved(), Some(&hls()));
}

#[test]
fn test_reselect_clears_resolved_stream() {
    let mut selection = ServerSelection::new();
    let ticket = selection.load(sample_servers()).unwrap();
    assert!(selection.apply(ticket.generation, Ok(Some(hls()))));

    let again = selection.select(0).unwrap();
    assert!(selection.resolved().is_none());
    assert_eq!(selection.resolution(), &Resolution::Pending);
    assert!(again.generation > ticket.generation);
}

#[test]
fn test_failed_resolution_offers_embed() {
    let mut selection = ServerSelection::new();
    let ticket = selection.load(sample_servers()).unwrap();
    assert!(selection.apply(ticket.generation, Ok(None)));

    match selection.playback_target(|s| format!("embed:{}", s.provider)) {
        PlaybackTarget::Failed { reason, embed_url } => {
            assert!(!reason.is_empty());
            assert_eq!(embed_url, "embed:TURBOV");
        }
        other => panic!("expected failed target, got {:?}", other),
    }
}

#[test]
fn test_selection_wraps() {
    let mut selection = ServerSelection::new();
    selection.load(sample_servers());

    selection.select_prev();
    assert_eq!(selection.selected_index(), Some(2));
    selection.select_next();
    assert_eq!(selection.selected_index(), Some(0));
    selection.select_next();
    assert_eq!(selection.selected_index(), Some(1));

    // Out of range leaves the selection alone
    assert!(selection.select(9).is_none());
    assert_eq!(selection.selected_index(), Some(1));
}
