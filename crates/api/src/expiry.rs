//! Expiry enforcement for stories.
//!
//! Two overlapping mechanisms share the same predicate-based bulk update
//! (`archived = false AND expires_at <= now` → archived):
//!
//! 1. **Lazy sweep** - the active listing handler calls [`sweep_overdue`]
//!    before querying, so no client ever observes an overdue story there.
//! 2. **Scheduled sweep** - [`run_scheduled`] runs the identical sweep on a
//!    fixed interval, so stories expire even when nothing lists them.
//!
//! Running both concurrently is safe: the update only touches rows still
//! matching the predicate, so a row flipped by one path is skipped by the
//! other and `archived_at` is set exactly once. A third mechanism, raw
//! store-level TTL deletion, is intentionally absent (see `repos::stories`).

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::time::MissedTickBehavior;

use crate::repos::StoryRepo;

/// Archive every currently-overdue story. Returns how many transitioned.
pub async fn sweep_overdue(stories: &dyn StoryRepo) -> Result<u64> {
    let archived = stories.sweep_expired(Utc::now()).await?;
    if archived > 0 {
        tracing::info!(archived, "expired stories archived");
    }
    Ok(archived)
}

/// Run the sweep forever on a fixed interval. Errors are logged and the
/// loop keeps going; an interrupted sweep is simply re-run next tick.
pub async fn run_scheduled(stories: Arc<dyn StoryRepo>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if let Err(err) = sweep_overdue(stories.as_ref()).await {
            tracing::error!(error = ?err, "scheduled expiry sweep failed");
        }
    }
}
