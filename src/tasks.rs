//! Background task runner for the TUI
//!
//! Turns [`Action`]s into spawned tokio tasks whose results come back over an
//! mpsc channel as [`AppMessage`]s. Each action runs in a [`TaskSlot`];
//! starting a new task in a slot aborts the previous one, and leaving a
//! screen cancels its slots.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::api::{CatalogClient, ProxyClient, TmdbClient};
use crate::app::{Action, AppMessage, TaskSlot};
use crate::config::Config;
use crate::models::DiscoverPage;
use crate::stream::resolver::PolicyError;
use crate::stream::{embed, StreamResolver};

/// Clients the background tasks use
#[derive(Debug, Clone)]
pub struct Services {
    pub catalog: CatalogClient,
    pub tmdb: Option<TmdbClient>,
    pub resolver: StreamResolver,
}

impl Services {
    /// Build every client from resolved configuration
    pub fn from_config(config: &Config) -> Result<Self, PolicyError> {
        let catalog = CatalogClient::new(config.catalog_url());
        let proxy = ProxyClient::new(config.proxy_url());
        let resolver = StreamResolver::new(catalog.clone(), proxy, config.provider_policy()?);
        let tmdb = config.tmdb_api_key().map(TmdbClient::new);
        tracing::debug!(
            catalog = catalog.base_url(),
            tmdb = tmdb.is_some(),
            "services configured"
        );
        Ok(Self {
            catalog,
            tmdb,
            resolver,
        })
    }

    /// TMDB client, or the error to show when no key is configured
    pub fn tmdb(&self) -> Result<&TmdbClient, String> {
        self.tmdb.as_ref().ok_or_else(missing_tmdb_key)
    }
}

/// Spawns and tracks background tasks
#[derive(Debug)]
pub struct TaskRunner {
    services: Arc<Services>,
    tx: UnboundedSender<AppMessage>,
    slots: HashMap<TaskSlot, JoinHandle<()>>,
}

impl TaskRunner {
    pub fn new(services: Services, tx: UnboundedSender<AppMessage>) -> Self {
        Self {
            services: Arc::new(services),
            tx,
            slots: HashMap::new(),
        }
    }

    /// Run every action in order
    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.dispatch(action);
        }
    }

    /// Run one action, replacing whatever ran in its slot
    pub fn dispatch(&mut self, action: Action) {
        let slot = action.slot();
        self.cancel(slot);
        if let Action::Cancel(_) = action {
            return;
        }

        tracing::debug!(?action, "spawning task");
        let services = Arc::clone(&self.services);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            if let Some(msg) = run(&services, action).await {
                // Receiver gone means the app is shutting down
                let _ = tx.send(msg);
            }
        });
        self.slots.insert(slot, handle);
    }

    /// Abort the task in `slot`, if any
    pub fn cancel(&mut self, slot: TaskSlot) {
        if let Some(handle) = self.slots.remove(&slot) {
            if !handle.is_finished() {
                tracing::debug!(?slot, "aborting task");
            }
            handle.abort();
        }
    }

    /// Abort everything
    pub fn shutdown(&mut self) {
        for (_, handle) in self.slots.drain() {
            handle.abort();
        }
    }

    /// Whether a task is still running in `slot`
    pub fn is_running(&self, slot: TaskSlot) -> bool {
        self.slots.get(&slot).is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TaskRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Execute one action to completion
pub async fn run(services: &Services, action: Action) -> Option<AppMessage> {
    let msg = match action {
        Action::LoadHome => {
            let (popular, recent) = tokio::join!(
                services.catalog.popular(1),
                services.catalog.recent_releases(1)
            );
            let result = match (popular, recent) {
                (Ok(popular), Ok(recent)) => Ok((popular, recent)),
                (Err(e), _) | (_, Err(e)) => Err(e.to_string()),
            };
            AppMessage::HomeLoaded(result)
        }
        Action::LoadGenres => {
            let result = match services.tmdb() {
                Ok(tmdb) => tmdb.genres().await.map_err(|e| e.to_string()),
                Err(e) => Err(e),
            };
            AppMessage::GenresLoaded(result)
        }
        Action::LoadDiscover { page, genre } => {
            let result: Result<DiscoverPage, String> = match services.tmdb() {
                Ok(tmdb) => tmdb.discover(page, genre).await.map_err(|e| e.to_string()),
                Err(e) => Err(e),
            };
            AppMessage::DiscoverLoaded {
                page,
                genre,
                result,
            }
        }
        Action::LoadDetail { movie_id } => {
            let result = services.catalog.movie(&movie_id).await.map_err(|e| e.to_string());
            AppMessage::DetailLoaded { movie_id, result }
        }
        Action::LoadServers { movie_id } => {
            let result = services
                .resolver
                .try_list_servers(&movie_id)
                .await
                .map_err(|e| e.to_string());
            AppMessage::ServersLoaded { movie_id, result }
        }
        Action::Resolve { movie_id, ticket } => {
            let result = services
                .resolver
                .resolve(&ticket.server)
                .await
                .map_err(|e| e.to_string());
            AppMessage::StreamResolved {
                movie_id,
                generation: ticket.generation,
                result,
            }
        }
        Action::OpenEmbed(url) => {
            let result = embed::open_in_browser(&url).await.map_err(|e| e.to_string());
            AppMessage::EmbedOpened(result)
        }
        Action::Cancel(_) => return None,
    };
    Some(msg)
}

/// Message shown when TMDB features are used without a key
pub fn missing_tmdb_key() -> String {
    "TMDB API key not configured (set TMDB_API_KEY or tmdb_api_key in config.toml)".to_string()
}
