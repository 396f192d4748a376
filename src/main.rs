//! KAT indexer - command line entry point
//!
//! `kat-indexer` polls the KAT latest TV feed into an in-memory cache on a
//! schedule; `kat-indexer search <show> <season> [episode]` runs one search.

use std::sync::Arc;

use kat_indexer::cli::{CliOptions, Command};
use kat_indexer::config::Config;
use kat_indexer::indexer::definitions::get_available_providers;
use kat_indexer::indexer::{
    EpisodeInfo, KatProvider, MemoryCacheStore, ProviderRegistry, SearchTarget, ShowInfo,
};
use kat_indexer::jobs;
use kat_indexer::services::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let options = CliOptions::from_args()?;
    let config = Config::from_env()?;

    let _recent_logs = init_tracing(&config.logging())?;

    tracing::info!("Starting KAT indexer");
    tracing::info!(kat_url = %config.kat_url, enabled = config.kat_enabled, "Configuration loaded");

    let store = Arc::new(MemoryCacheStore::new());
    let registry = Arc::new(ProviderRegistry::new());
    registry.register(KatProvider::new(config.kat_settings(), store.clone())?)?;

    match options.command {
        Command::Providers => {
            for info in get_available_providers() {
                println!("{}\t{}\t{}", info.id, info.name, info.site_link);
            }
        }
        Command::Search {
            show,
            season,
            episode,
        } => {
            let show = ShowInfo::new(show);
            let target = match episode {
                Some(episode) => SearchTarget::Episode(EpisodeInfo {
                    show,
                    season,
                    episode,
                    airdate: None,
                }),
                None => SearchTarget::Season { show, season },
            };

            for provider in registry.enabled() {
                for request in provider.build_search_requests(&target) {
                    for item in provider.search(&request).await {
                        println!("{}\t{}", item.title, item.download_url);
                    }
                }
            }
        }
        Command::Run => {
            let mut scheduler = jobs::start_scheduler(registry.clone()).await?;
            tracing::info!("Polling provider caches, press Ctrl-C to stop");

            tokio::signal::ctrl_c().await?;

            tracing::info!(cached_items = store.len(), "Shutting down");
            scheduler.shutdown().await?;
        }
    }

    Ok(())
}
