//! Provider definitions
//!
//! # Adding a new provider
//!
//! 1. Create a new file in this directory (e.g., `myprovider.rs`)
//! 2. Implement `SearchProvider` (and `CacheFeedSource` if it has a latest feed)
//! 3. Add it to the `AVAILABLE_PROVIDERS` list
//! 4. Register it in the `ProviderRegistry`

pub mod kat;

use once_cell::sync::Lazy;

/// Information about an available provider type
#[derive(Debug, Clone)]
pub struct ProviderTypeInfo {
    /// Unique identifier (e.g., "kat")
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Default site URL
    pub site_link: &'static str,
    pub image: &'static str,
    pub supports_backlog: bool,
    /// Whether the provider polls a latest feed into the cache
    pub has_cache: bool,
}

/// All available provider types
pub static AVAILABLE_PROVIDERS: Lazy<Vec<ProviderTypeInfo>> = Lazy::new(|| {
    vec![ProviderTypeInfo {
        id: "kat",
        name: "KickAssTorrents",
        description: "Public torrent index with RSS search and a latest TV feed",
        site_link: kat::DEFAULT_BASE_URL,
        image: "kat.png",
        supports_backlog: true,
        has_cache: true,
    }]
});

/// Get information about all available provider types
pub fn get_available_providers() -> &'static [ProviderTypeInfo] {
    &AVAILABLE_PROVIDERS
}

/// Get information about a specific provider type
pub fn get_provider_info(id: &str) -> Option<&'static ProviderTypeInfo> {
    AVAILABLE_PROVIDERS.iter().find(|p| p.id == id)
}
