//! Feed cache polling
//!
//! Every provider with a "latest" feed owns a [FeedCache]. On each tick the
//! host calls [FeedCache::maybe_poll]; the feed is only fetched when at least
//! [MIN_POLL_INTERVAL_MINUTES] have passed since the last successful fetch.

use std::sync::{Arc, Weak};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error};

use super::feed::parse_feed;

/// Minimum time between two cache fetches
pub const MIN_POLL_INTERVAL_MINUTES: i64 = 15;

/// Storage for items seen in provider feeds
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Offer an item to the cache. Deduplication is up to the store.
    async fn insert(&self, title: &str, download_url: &str) -> Result<()>;
}

/// An item accepted into a cache store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub title: String,
    pub download_url: String,
}

/// In-memory cache store keeping entries in insertion order
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<Vec<CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<CacheEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn insert(&self, title: &str, download_url: &str) -> Result<()> {
        self.entries.write().push(CacheEntry {
            title: title.to_string(),
            download_url: download_url.to_string(),
        });
        Ok(())
    }
}

/// The provider side of a feed cache: where the feed lives and how to get it
#[async_trait]
pub trait CacheFeedSource: Send + Sync {
    fn provider_name(&self) -> &str;

    fn cache_url(&self) -> String;

    async fn fetch_feed(&self, url: &str) -> Option<Vec<u8>>;
}

/// Result of a poll attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Last fetch was too recent
    Skipped,
    /// Another poll is in progress
    Busy,
    /// Fetch failed or returned nothing; the gate was not advanced
    NoData,
    /// Feed fetched and processed
    Updated { inserted: usize },
}

#[derive(Debug, Default)]
struct PollState {
    last_poll: Option<DateTime<Utc>>,
}

impl PollState {
    fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_poll {
            None => true,
            Some(last) => now - last >= Duration::minutes(MIN_POLL_INTERVAL_MINUTES),
        }
    }
}

/// Periodic cache of a provider's "latest" feed
pub struct FeedCache<P> {
    source: Weak<P>,
    store: Arc<dyn CacheStore>,
    state: Mutex<PollState>,
}

impl<P: CacheFeedSource> FeedCache<P> {
    pub fn new(source: Weak<P>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            source,
            store,
            state: Mutex::new(PollState::default()),
        }
    }

    /// Time of the last fetch that returned data
    pub async fn last_poll(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.last_poll
    }

    /// Fetch the feed into the store if the poll interval has elapsed.
    ///
    /// The gate advances as soon as the fetch returns data, even if the feed
    /// then fails to parse. Concurrent calls don't wait: they return
    /// [PollOutcome::Busy].
    pub async fn maybe_poll(&self, now: DateTime<Utc>) -> PollOutcome {
        let Ok(mut state) = self.state.try_lock() else {
            debug!("Cache update already in progress");
            return PollOutcome::Busy;
        };

        if !state.is_due(now) {
            debug!("Last update was too soon, using old cache");
            return PollOutcome::Skipped;
        }

        let Some(source) = self.source.upgrade() else {
            debug!("Cache source dropped, nothing to poll");
            return PollOutcome::NoData;
        };

        let url = source.cache_url();
        debug!(provider = source.provider_name(), url = %url, "Cache update URL: {}", url);

        let data = match source.fetch_feed(&url).await {
            Some(data) if !data.is_empty() => data,
            _ => return PollOutcome::NoData,
        };

        state.last_poll = Some(now);

        let mut inserted = 0;
        for item in parse_feed(&data) {
            debug!("Adding item from RSS to cache: {}", item.title);
            match self.store.insert(&item.title, &item.download_url).await {
                Ok(()) => inserted += 1,
                Err(e) => {
                    error!(
                        provider = source.provider_name(),
                        title = %item.title,
                        error = %e,
                        "Failed to add item to cache"
                    );
                }
            }
        }

        PollOutcome::Updated { inserted }
    }
}

impl<P> std::fmt::Debug for FeedCache<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedCache")
            .field("source_alive", &(self.source.strong_count() > 0))
            .finish()
    }
}
