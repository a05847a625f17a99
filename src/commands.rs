//! CLI Command Handlers
//!
//! Implements all CLI commands by calling the catalog, TMDB and resolver
//! clients. Each handler takes CLI args, the configured services and Output,
//! and returns ExitCode.

use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;

use crate::api::ApiError;
use crate::cli::{
    DiscoverCmd, ExitCode, GenresCmd, InfoCmd, Output, PageCmd, PlayCmd, PlayResponse,
    PlaybackKind, ResolveCmd, ResolveResponse, ServerInfo, ServersCmd,
};
use crate::models::{Genre, MovieSummary};
use crate::stream::embed;
use crate::tasks::Services;

/// Which catalog list to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogList {
    Popular,
    Recent,
}

fn print_or_fail<T: serde::Serialize>(output: &Output, data: T, lines: &[String]) -> ExitCode {
    match output.print_lines(data, lines) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
    }
}

fn api_failure(output: &Output, what: &str, err: &ApiError) -> ExitCode {
    output.error(format!("{}: {}", what, err), ExitCode::for_api_error(err))
}

fn summary_lines(movies: &[MovieSummary]) -> Vec<String> {
    movies
        .iter()
        .map(|m| format!("{:<12} {:<40} {:>4}  ★ {}", m.id, m.title, m.resolution, m.rating))
        .collect()
}

// =============================================================================
// Catalog Lists
// =============================================================================

pub async fn list_cmd(
    list: CatalogList,
    cmd: PageCmd,
    services: &Services,
    output: &Output,
) -> ExitCode {
    output.info(format!("Fetching {:?} movies (page {})...", list, cmd.page));

    let result = match list {
        CatalogList::Popular => services.catalog.popular(cmd.page).await,
        CatalogList::Recent => services.catalog.recent_releases(cmd.page).await,
    };

    match result {
        Ok(mut movies) => {
            if let Some(limit) = cmd.limit {
                movies.truncate(limit);
            }
            let lines = summary_lines(&movies);
            print_or_fail(output, &movies, &lines)
        }
        Err(e) => api_failure(output, "Catalog request failed", &e),
    }
}

// =============================================================================
// TMDB Commands
// =============================================================================

/// Find a genre by numeric id or case-insensitive name
pub fn match_genre<'a>(genres: &'a [Genre], query: &str) -> Option<&'a Genre> {
    let query = query.trim();
    if let Ok(id) = query.parse::<u32>() {
        return genres.iter().find(|g| g.id == id);
    }
    genres.iter().find(|g| g.name.eq_ignore_ascii_case(query))
}

pub async fn genres_cmd(_cmd: GenresCmd, services: &Services, output: &Output) -> ExitCode {
    let tmdb = match services.tmdb() {
        Ok(tmdb) => tmdb,
        Err(msg) => return output.error(msg, ExitCode::InvalidArgs),
    };

    match tmdb.genres().await {
        Ok(genres) => {
            let lines: Vec<String> = genres.iter().map(|g| format!("{:>6}  {}", g.id, g.name)).collect();
            print_or_fail(output, &genres, &lines)
        }
        Err(e) => api_failure(output, "Genre request failed", &e),
    }
}

pub async fn discover_cmd(cmd: DiscoverCmd, services: &Services, output: &Output) -> ExitCode {
    let tmdb = match services.tmdb() {
        Ok(tmdb) => tmdb,
        Err(msg) => return output.error(msg, ExitCode::InvalidArgs),
    };

    let genre = match cmd.genre.as_deref() {
        None => None,
        Some(query) => {
            let genres = match tmdb.genres().await {
                Ok(genres) => genres,
                Err(e) => return api_failure(output, "Genre request failed", &e),
            };
            match match_genre(&genres, query) {
                Some(genre) => Some(genre.id),
                None => {
                    return output.error(format!("Unknown genre: {}", query), ExitCode::InvalidArgs)
                }
            }
        }
    };

    match tmdb.discover(cmd.page, genre).await {
        Ok(page) => {
            let mut lines = summary_lines(&page.results);
            lines.push(format!("Page {} of {}", page.page, page.total_pages));
            print_or_fail(output, &page, &lines)
        }
        Err(e) => api_failure(output, "Discover request failed", &e),
    }
}

// =============================================================================
// Info Command
// =============================================================================

pub async fn info_cmd(cmd: InfoCmd, services: &Services, output: &Output) -> ExitCode {
    output.info(format!("Getting info for: {}", cmd.movie_id));

    match services.catalog.movie(&cmd.movie_id).await {
        Ok(detail) => {
            let mut lines = vec![detail.to_string(), detail.meta_line()];
            if !detail.genres.is_empty() {
                lines.push(detail.genres.join(", "));
            }
            lines.push(String::new());
            lines.push(detail.description.clone());
            if !detail.director.is_empty() {
                lines.push(format!("Director: {}", detail.director));
            }
            if !detail.cast.is_empty() {
                lines.push(format!("Cast: {}", detail.cast.join(", ")));
            }
            print_or_fail(output, &detail, &lines)
        }
        Err(e) => api_failure(output, "Movie info failed", &e),
    }
}

// =============================================================================
// Servers & Resolution
// =============================================================================

pub async fn servers_cmd(cmd: ServersCmd, services: &Services, output: &Output) -> ExitCode {
    output.info(format!("Finding servers for: {}", cmd.movie_id));

    match services.resolver.try_list_servers(&cmd.movie_id).await {
        Ok(servers) if servers.is_empty() => {
            output.error("No servers available", ExitCode::NoServers)
        }
        Ok(servers) => {
            let infos: Vec<ServerInfo> = servers
                .iter()
                .enumerate()
                .map(|(i, s)| ServerInfo::new(i, s))
                .collect();
            let lines: Vec<String> = infos
                .iter()
                .map(|s| format!("{:<18} {:<10} {}", s.label, s.provider, s.url))
                .collect();
            print_or_fail(output, &infos, &lines)
        }
        Err(e) => api_failure(output, "Server request failed", &e),
    }
}

/// Pick server `number` (1-based) for a movie and work out how it plays
pub async fn resolve_target(
    services: &Services,
    movie_id: &str,
    number: usize,
) -> Result<ResolveResponse, (String, ExitCode)> {
    let servers = services
        .resolver
        .try_list_servers(movie_id)
        .await
        .map_err(|e| (format!("Server request failed: {}", e), ExitCode::for_api_error(&e)))?;

    if servers.is_empty() {
        return Err(("No servers available".to_string(), ExitCode::NoServers));
    }
    let index = number
        .checked_sub(1)
        .filter(|i| *i < servers.len())
        .ok_or_else(|| {
            (
                format!("Server {} out of range (1-{})", number, servers.len()),
                ExitCode::InvalidArgs,
            )
        })?;
    let server = &servers[index];
    let info = ServerInfo::new(index, server);
    let embed_url = services.resolver.embed_url(server);

    let response = match services.resolver.resolve(server).await {
        Ok(Some(stream)) => ResolveResponse {
            server: info,
            kind: PlaybackKind::Native,
            url: stream.url,
            stream_type: Some(stream.kind),
            fallback_reason: None,
        },
        Ok(None) => ResolveResponse {
            server: info,
            kind: PlaybackKind::Embed,
            url: embed_url,
            stream_type: None,
            fallback_reason: server
                .requires_extraction
                .then(|| "proxy returned no direct stream".to_string()),
        },
        Err(e) => {
            tracing::warn!(error = %e, "extraction failed, using embed page");
            ResolveResponse {
                server: info,
                kind: PlaybackKind::Embed,
                url: embed_url,
                stream_type: None,
                fallback_reason: Some(e.to_string()),
            }
        }
    };
    Ok(response)
}

pub async fn resolve_cmd(cmd: ResolveCmd, services: &Services, output: &Output) -> ExitCode {
    output.info(format!("Resolving server {} for: {}", cmd.server, cmd.movie_id));

    match resolve_target(services, &cmd.movie_id, cmd.server).await {
        Ok(target) => {
            let mut lines = vec![format!("{} ({})", target.server.label, target.server.provider)];
            if let Some(reason) = &target.fallback_reason {
                lines.push(format!("Extraction failed: {}", reason));
            }
            lines.push(target.url.clone());
            print_or_fail(output, &target, &lines)
        }
        Err((msg, code)) => output.error(msg, code),
    }
}

// =============================================================================
// Play Command
// =============================================================================

/// Run mpv in the foreground until the user closes it
async fn run_mpv(program: &str, url: &str, title: &str) -> anyhow::Result<std::process::ExitStatus> {
    Command::new(program)
        .arg(format!("--force-media-title={}", title))
        .arg(url)
        .stdin(Stdio::null())
        .status()
        .await
        .with_context(|| format!("Failed to start {}", program))
}

#[cfg(unix)]
async fn mpv_available(program: &str) -> bool {
    crate::player::mpv::is_available(program).await
}

#[cfg(not(unix))]
async fn mpv_available(_program: &str) -> bool {
    true
}

pub async fn play_cmd(cmd: PlayCmd, services: &Services, mpv: &str, output: &Output) -> ExitCode {
    let target = match resolve_target(services, &cmd.movie_id, cmd.server).await {
        Ok(target) => target,
        Err((msg, code)) => return output.error(msg, code),
    };

    if cmd.dry_run {
        let lines = vec![target.url.clone()];
        return print_or_fail(output, &target, &lines);
    }

    let player = match target.kind {
        PlaybackKind::Native => {
            if !mpv_available(mpv).await {
                return output.error(format!("{} not found. Install it first.", mpv), ExitCode::PlaybackFailed);
            }
            output.info(format!("Opening in mpv: {}", target.url));
            match run_mpv(mpv, &target.url, &cmd.movie_id).await {
                Ok(status) if status.success() => "mpv".to_string(),
                Ok(status) => {
                    return output.error(format!("mpv exited with {}", status), ExitCode::PlaybackFailed)
                }
                Err(e) => return output.error(format!("{:#}", e), ExitCode::PlaybackFailed),
            }
        }
        PlaybackKind::Embed => {
            output.info(format!("Opening embed page: {}", target.url));
            if let Err(e) = embed::open_in_browser(&target.url).await {
                return output.error(format!("Could not open browser: {}", e), ExitCode::PlaybackFailed);
            }
            embed::opener().to_string()
        }
    };

    let response = PlayResponse {
        status: "played".to_string(),
        player,
        target,
    };
    let lines = vec![format!("Played via {}", response.player)];
    print_or_fail(output, &response, &lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres() -> Vec<Genre> {
        vec![
            Genre {
                id: 28,
                name: "Action".into(),
            },
            Genre {
                id: 35,
                name: "Comedy".into(),
            },
        ]
    }

    #[test]
    fn test_match_genre_by_id_and_name() {
        let genres = genres();
        assert_eq!(match_genre(&genres, "35").map(|g| g.id), Some(35));
        assert_eq!(match_genre(&genres, "action").map(|g| g.id), Some(28));
        assert_eq!(match_genre(&genres, " Comedy ").map(|g| g.id), Some(35));
        assert!(match_genre(&genres, "Horror").is_none());
        assert!(match_genre(&genres, "99").is_none());
    }

    #[test]
    fn test_summary_lines() {
        let movies = vec![MovieSummary {
            id: "abc123".into(),
            title: "Heat".into(),
            poster_url: String::new(),
            resolution: "HD".into(),
            rating: "8.3".into(),
        }];
        let lines = summary_lines(&movies);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("abc123"));
        assert!(lines[0].contains("★ 8.3"));
    }
}
