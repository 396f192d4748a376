//! Provider registry
//!
//! The ProviderRegistry is responsible for:
//! - Holding the configured provider instances
//! - Orchestrating searches across enabled providers
//! - Driving cache polls

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use super::{FeedItem, SearchProvider, SearchRequest};

/// Results from one provider for one request
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSearchResult {
    pub provider_id: String,
    pub provider_name: String,
    pub items: Vec<FeedItem>,
    pub elapsed_ms: u64,
    /// Set when the search task itself failed
    pub error: Option<String>,
}

/// Registered providers by id
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn SearchProvider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Fails if the id is already taken.
    pub fn register(&self, provider: Arc<dyn SearchProvider>) -> Result<()> {
        let id = provider.id().to_string();
        let mut providers = self.providers.write();
        if providers.contains_key(&id) {
            return Err(anyhow!("Provider already registered: {}", id));
        }

        tracing::info!(provider_id = %id, provider_name = provider.name(), "Registered provider");
        providers.insert(id, provider);
        Ok(())
    }

    /// Get a provider by id
    pub fn get(&self, id: &str) -> Option<Arc<dyn SearchProvider>> {
        self.providers.read().get(id).cloned()
    }

    /// All enabled providers, sorted by id
    pub fn enabled(&self) -> Vec<Arc<dyn SearchProvider>> {
        let mut providers: Vec<_> = self
            .providers
            .read()
            .values()
            .filter(|p| p.is_enabled())
            .cloned()
            .collect();
        providers.sort_by(|a, b| a.id().cmp(b.id()));
        providers
    }

    /// Run a request against every enabled provider concurrently
    pub async fn search_all(&self, request: &SearchRequest) -> Vec<ProviderSearchResult> {
        let providers = self.enabled();
        let mut results = Vec::with_capacity(providers.len());

        let mut handles = vec![];
        for provider in providers {
            let request = request.clone();
            let id = provider.id().to_string();
            let name = provider.name().to_string();

            let handle = tokio::spawn(async move {
                let start = Instant::now();
                let items = provider.search(&request).await;
                (items, start.elapsed().as_millis() as u64)
            });
            handles.push((id, name, handle));
        }

        for (provider_id, provider_name, handle) in handles {
            match handle.await {
                Ok((items, elapsed_ms)) => results.push(ProviderSearchResult {
                    provider_id,
                    provider_name,
                    items,
                    elapsed_ms,
                    error: None,
                }),
                Err(e) => {
                    tracing::error!(
                        provider_id = %provider_id,
                        error = %e,
                        "Provider search task panicked"
                    );
                    results.push(ProviderSearchResult {
                        provider_id,
                        provider_name,
                        items: vec![],
                        elapsed_ms: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        results
    }

    /// Give every enabled provider's cache a chance to update
    pub async fn poll_caches(&self, now: DateTime<Utc>) {
        for provider in self.enabled() {
            provider.poll_cache(now).await;
        }
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers_count", &self.providers.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::indexer::SearchTarget;

    struct StaticProvider {
        id: &'static str,
        enabled: bool,
        panics: bool,
        polls: AtomicUsize,
    }

    impl StaticProvider {
        fn new(id: &'static str, enabled: bool) -> Self {
            Self {
                id,
                enabled,
                panics: false,
                polls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for StaticProvider {
        fn id(&self) -> &str {
            self.id
        }

        fn name(&self) -> &str {
            self.id
        }

        fn image_identifier(&self) -> &str {
            "static.png"
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn supports_backlog(&self) -> bool {
            false
        }

        fn build_search_requests(&self, _target: &SearchTarget) -> Vec<SearchRequest> {
            vec![]
        }

        async fn search(&self, request: &SearchRequest) -> Vec<FeedItem> {
            if self.panics {
                panic!("provider blew up");
            }
            vec![FeedItem::new(
                format!("{} from {}", request, self.id),
                "http://e/x.torrent",
            )]
        }

        async fn poll_cache(&self, _now: DateTime<Utc>) {
            self.polls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn request() -> SearchRequest {
        SearchRequest::BySeason {
            show_name: "Top Gear".to_string(),
            season: 1,
        }
    }

    #[test]
    fn test_register_and_get() {
        let registry = ProviderRegistry::new();
        registry.register(Arc::new(StaticProvider::new("a", true))).unwrap();
        assert!(registry.register(Arc::new(StaticProvider::new("a", true))).is_err());
        assert!(registry.get("a").is_some());
        assert!(registry.get("b").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_search_all_only_enabled() {
        let registry = ProviderRegistry::new();
        registry.register(Arc::new(StaticProvider::new("b", true))).unwrap();
        registry.register(Arc::new(StaticProvider::new("a", true))).unwrap();
        registry.register(Arc::new(StaticProvider::new("off", false))).unwrap();

        let results = registry.search_all(&request()).await;
        let ids: Vec<_> = results.iter().map(|r| r.provider_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(results[0].items[0].title, "Top Gear S01 from a");
    }

    #[tokio::test]
    async fn test_search_failure_is_isolated() {
        let registry = ProviderRegistry::new();
        registry.register(Arc::new(StaticProvider::new("good", true))).unwrap();
        registry
            .register(Arc::new(StaticProvider {
                panics: true,
                ..StaticProvider::new("bad", true)
            }))
            .unwrap();

        let results = registry.search_all(&request()).await;
        assert_eq!(results.len(), 2);
        let bad = results.iter().find(|r| r.provider_id == "bad").unwrap();
        assert!(bad.error.is_some());
        assert!(bad.items.is_empty());
        let good = results.iter().find(|r| r.provider_id == "good").unwrap();
        assert_eq!(good.items.len(), 1);
    }

    #[tokio::test]
    async fn test_poll_caches_skips_disabled() {
        let on = Arc::new(StaticProvider::new("on", true));
        let off = Arc::new(StaticProvider::new("off", false));
        let registry = ProviderRegistry::new();
        registry.register(on.clone()).unwrap();
        registry.register(off.clone()).unwrap();

        registry.poll_caches(Utc::now()).await;
        assert_eq!(on.polls.load(Ordering::SeqCst), 1);
        assert_eq!(off.polls.load(Ordering::SeqCst), 0);
    }
}
