//! Optional time-based pruning of analytics records

use anyhow::Context;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::storage::Storage;

const PRUNE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Unix millisecond cutoff before which records are pruned.
///
/// `None` when the cutoff falls outside the representable date range.
pub fn retention_cutoff(now: DateTime<Utc>, retention_days: u32) -> Option<i64> {
    now.checked_sub_signed(ChronoDuration::days(i64::from(retention_days)))
        .map(|cutoff| cutoff.timestamp_millis())
}

/// Delete analytics records older than `retention_days`
pub async fn prune_expired(
    storage: &dyn Storage,
    now: DateTime<Utc>,
    retention_days: u32,
) -> anyhow::Result<u64> {
    let cutoff = retention_cutoff(now, retention_days)
        .with_context(|| format!("retention of {retention_days} days is out of range"))?;
    let deleted = storage.prune_analytics(cutoff).await?;
    if deleted > 0 {
        info!(deleted, retention_days, "pruned expired analytics records");
    }
    Ok(deleted)
}

/// Spawn the hourly retention task
pub fn start_retention_task(
    storage: Arc<dyn Storage>,
    retention_days: u32,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);

        loop {
            interval.tick().await;

            if let Err(e) = prune_expired(storage.as_ref(), Utc::now(), retention_days).await {
                error!("Failed to prune analytics records: {}", e);
            }
        }
    })
}
