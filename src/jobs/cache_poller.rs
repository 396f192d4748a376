//! Provider cache poller

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;

use crate::indexer::ProviderRegistry;

/// Poll the latest feed of every enabled provider
pub async fn poll_caches(registry: Arc<ProviderRegistry>) -> Result<()> {
    if registry.is_empty() {
        tracing::debug!("No providers registered, skipping cache poll");
        return Ok(());
    }

    registry.poll_caches(Utc::now()).await;

    tracing::debug!("Cache polling completed");
    Ok(())
}
