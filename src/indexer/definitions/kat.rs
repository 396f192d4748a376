//! KAT (KickassTorrents) indexer implementation
//!
//! KAT is a public tracker with RSS output on both its search endpoint and its
//! category listings. Searches go through `usearch/` (see [crate::indexer::query]);
//! the cache follows the `tv/` category feed.
//!
//! # Configuration
//!
//! - `base_url`: site root, always stored with a trailing `/`
//! - `user_agent`: sent with every request
//! - `timeout`: per-request timeout

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::indexer::cache::{CacheFeedSource, CacheStore, FeedCache};
use crate::indexer::feed::parse_feed;
use crate::indexer::fetcher::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, Fetcher};
use crate::indexer::query::build_search_url;
use crate::indexer::{
    FeedItem, QualityClassifier, SearchProvider, SearchRequest, SearchTarget, ShowInfo,
};
use crate::services::filename_parser::extract_name_from_filename;

/// Default site root
pub const DEFAULT_BASE_URL: &str = "http://kat.ph/";

const IMAGE_NAME: &str = "kat.png";

/// KAT provider settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KatSettings {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl KatSettings {
    pub fn new(base_url: &str) -> Self {
        Self {
            id: "kat".to_string(),
            name: "KickAssTorrents".to_string(),
            enabled: true,
            base_url: normalize_base_url(base_url),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = normalize_base_url(base_url);
    }
}

impl Default for KatSettings {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// KAT search provider
pub struct KatProvider {
    settings: KatSettings,
    fetcher: Fetcher,
    cache: FeedCache<KatProvider>,
}

impl KatProvider {
    /// Create a provider whose cache feeds into `store`
    pub fn new(settings: KatSettings, store: Arc<dyn CacheStore>) -> Result<Arc<Self>> {
        let fetcher = Fetcher::new(&settings.user_agent, settings.timeout)?;

        Ok(Arc::new_cyclic(|provider| Self {
            settings,
            fetcher,
            cache: FeedCache::new(provider.clone(), store),
        }))
    }

    pub fn settings(&self) -> &KatSettings {
        &self.settings
    }

    pub fn cache(&self) -> &FeedCache<KatProvider> {
        &self.cache
    }

    /// Search URL for a request
    pub fn search_url(&self, request: &SearchRequest) -> String {
        build_search_url(&self.settings.base_url, request)
    }

    /// URL of the feed polled into the cache
    pub fn cache_url(&self) -> String {
        format!("{}tv/?rss=1", self.settings.base_url)
    }

    /// Fetch a URL; `None` when nothing usable came back
    pub async fn get_url(&self, url: &str, headers: &[(&str, &str)]) -> Option<Vec<u8>> {
        self.fetcher.fetch(url, headers).await
    }

    /// Backlog search for a whole season
    pub async fn find_season_results(&self, show: &ShowInfo, season: u32) -> Vec<FeedItem> {
        if show.air_by_date {
            warn!(
                show = %show.name,
                "KAT doesn't support air-by-date backlog because of limitations on their RSS search."
            );
            return Vec::new();
        }

        let target = SearchTarget::Season {
            show: show.clone(),
            season,
        };

        let mut results = Vec::new();
        for request in self.build_search_requests(&target) {
            results.extend(self.search(&request).await);
        }
        results
    }

    /// Quality of an item, as judged by the host's classifier
    pub fn quality_of<C: QualityClassifier>(
        &self,
        item: &FeedItem,
        classifier: &C,
        anime: bool,
    ) -> C::Quality {
        classifier.name_quality(&item.title, anime)
    }

    /// Release name from a torrent filename served by KAT
    pub fn name_from_filename(&self, filename: &str) -> Option<String> {
        extract_name_from_filename(filename)
    }
}

#[async_trait]
impl SearchProvider for KatProvider {
    fn id(&self) -> &str {
        &self.settings.id
    }

    fn name(&self) -> &str {
        &self.settings.name
    }

    fn image_identifier(&self) -> &str {
        IMAGE_NAME
    }

    fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    fn supports_backlog(&self) -> bool {
        true
    }

    fn build_search_requests(&self, target: &SearchTarget) -> Vec<SearchRequest> {
        let show = match target {
            SearchTarget::Season { show, .. } => show,
            SearchTarget::Episode(ep) => &ep.show,
        };
        let show_name = show.search_name().trim().to_string();
        if show_name.is_empty() {
            debug!(show = %show.name, "No usable show name, skipping KAT search");
            return Vec::new();
        }

        let request = match target {
            SearchTarget::Season { season, .. } => SearchRequest::BySeason {
                show_name,
                season: *season,
            },
            SearchTarget::Episode(ep) => match ep.airdate {
                Some(date) if ep.show.air_by_date => SearchRequest::ByAirDate { show_name, date },
                _ => SearchRequest::ByEpisode {
                    show_name,
                    season: ep.season,
                    episode: ep.episode,
                },
            },
        };

        debug!(request = %request, "Built KAT search request");
        vec![request]
    }

    async fn search(&self, request: &SearchRequest) -> Vec<FeedItem> {
        let url = self.search_url(request);
        debug!("Search string: {}", url);

        match self.get_url(&url, &[]).await {
            Some(data) => parse_feed(&data),
            None => Vec::new(),
        }
    }

    async fn poll_cache(&self, now: DateTime<Utc>) {
        let outcome = self.cache.maybe_poll(now).await;
        debug!(provider = self.id(), ?outcome, "Cache poll finished");
    }
}

#[async_trait]
impl CacheFeedSource for KatProvider {
    fn provider_name(&self) -> &str {
        &self.settings.name
    }

    fn cache_url(&self) -> String {
        KatProvider::cache_url(self)
    }

    async fn fetch_feed(&self, url: &str) -> Option<Vec<u8>> {
        self.get_url(url, &[]).await
    }
}

impl std::fmt::Debug for KatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KatProvider")
            .field("id", &self.settings.id)
            .field("base_url", &self.settings.base_url)
            .field("enabled", &self.settings.enabled)
            .finish()
    }
}
