//! Best-effort external asset cleanup after story deletion.
//!
//! The story row is already gone when this runs, so there is nothing to
//! roll back: every destroy call is attempted concurrently, individual
//! failures are logged and swallowed, and nothing retries. An orphaned
//! asset in the media store is a cost-bearing but harmless leak.

use std::sync::Arc;

use futures::future::join_all;
use uuid::Uuid;

use crate::models::{MediaItem, Story};
use crate::services::MediaStore;

/// Spawn the cleanup cascade for a deleted story. The caller's response
/// never waits on this.
pub fn spawn(media_store: Arc<dyn MediaStore>, deleted: Story) {
    tokio::spawn(destroy_story_assets(
        media_store,
        deleted.id,
        deleted.media.0,
    ));
}

/// Destroy every external asset referenced by the deleted story's media.
pub async fn destroy_story_assets(
    media_store: Arc<dyn MediaStore>,
    story_id: Uuid,
    media: Vec<MediaItem>,
) {
    let tasks: Vec<_> = media
        .iter()
        .filter_map(|item| item.external_asset_id().map(str::to_owned))
        .map(|asset_id| {
            let store = media_store.clone();
            async move {
                if let Err(err) = store.destroy(&asset_id).await {
                    tracing::warn!(
                        story_id = %story_id,
                        asset_id = %asset_id,
                        error = ?err,
                        "media asset cleanup failed"
                    );
                }
            }
        })
        .collect();

    join_all(tasks).await;

    tracing::info!(story_id = %story_id, "story media cleanup finished");
}
