//! Torrent indexer providers
//!
//! A provider turns a [SearchTarget] into one or more [SearchRequest]s, runs
//! them against the remote site and returns [FeedItem]s. Providers that
//! expose a "latest" feed also keep a [cache::FeedCache] topped up.

pub mod cache;
pub mod definitions;
pub mod feed;
pub mod fetcher;
pub mod manager;
pub mod query;
pub mod types;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use cache::{CacheEntry, CacheStore, MemoryCacheStore, PollOutcome};
pub use definitions::kat::{KatProvider, KatSettings};
pub use feed::{FeedDocument, FeedError, ItemNode};
pub use fetcher::{FetchError, Fetcher};
pub use manager::{ProviderRegistry, ProviderSearchResult};
pub use types::*;

/// A search provider backed by a remote indexer
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Stable identifier, e.g. "kat"
    fn id(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    /// Icon shown next to results from this provider
    fn image_identifier(&self) -> &str;

    /// Whether the provider is turned on
    fn is_enabled(&self) -> bool;

    /// Whether the provider can search for already-aired episodes
    fn supports_backlog(&self) -> bool;

    /// Turn a search target into the provider's requests
    fn build_search_requests(&self, target: &SearchTarget) -> Vec<SearchRequest>;

    /// Run a single request. Failures are logged and yield no items.
    async fn search(&self, request: &SearchRequest) -> Vec<FeedItem>;

    /// Give the provider's feed cache a chance to update
    async fn poll_cache(&self, now: DateTime<Utc>);
}
