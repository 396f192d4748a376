//! Background job scheduling

pub mod cache_poller;

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use crate::indexer::ProviderRegistry;

/// Cache poll tick. Each provider's own interval gate decides whether it fetches.
pub const CACHE_POLL_SCHEDULE: &str = "0 * * * * *";

/// Initialize and start the job scheduler
pub async fn start_scheduler(registry: Arc<ProviderRegistry>) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    // Provider cache poll - tick every minute
    let cache_job = Job::new_async(CACHE_POLL_SCHEDULE, move |_uuid, _l| {
        let registry = registry.clone();
        Box::pin(async move {
            if let Err(e) = cache_poller::poll_caches(registry).await {
                tracing::error!("Cache poller error: {}", e);
            }
        })
    })?;
    scheduler.add(cache_job).await?;

    scheduler.start().await?;

    info!("Job scheduler started");
    Ok(scheduler)
}
