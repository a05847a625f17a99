//! API clients for external services
//!
//! - Catalog: movie lists, details and playback servers
//! - TMDB: genres and discover pages
//! - Proxy: direct media URL extraction and embed pages

pub mod catalog;
pub mod http;
pub mod proxy;
pub mod tmdb;

pub use catalog::{CatalogClient, RawServer};
pub use http::ApiError;
pub use proxy::ProxyClient;
pub use tmdb::TmdbClient;
