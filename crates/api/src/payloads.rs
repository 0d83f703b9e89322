//! Request/response types for the HTTP surface.

use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{MediaItem, Story, MAX_MEDIA_ITEMS, MAX_TITLE_CHARS};

/// Max story ids per batch like-check request.
const MAX_BATCH_CHECK_IDS: usize = 100;

/// Create a story from already-uploaded media references.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateStoryPayload {
    #[garde(custom(not_blank), length(chars, max = MAX_TITLE_CHARS))]
    pub title: String,
    #[garde(length(min = 1, max = MAX_MEDIA_ITEMS), dive)]
    pub media: Vec<MediaItemPayload>,
}

/// One media reference in a create request. Mirrors [`MediaItem`] but is
/// validated at the boundary before anything touches the store.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaItemPayload {
    Image {
        #[garde(url)]
        url: String,
        #[garde(skip)]
        #[serde(default, skip_serializing_if = "Option::is_none")]
        external_asset_id: Option<String>,
    },
    Video {
        #[garde(url)]
        url: String,
        #[garde(skip)]
        #[serde(default, skip_serializing_if = "Option::is_none")]
        external_asset_id: Option<String>,
    },
}

impl From<MediaItemPayload> for MediaItem {
    fn from(payload: MediaItemPayload) -> Self {
        match payload {
            MediaItemPayload::Image {
                url,
                external_asset_id,
            } => MediaItem::Image {
                url,
                external_asset_id,
            },
            MediaItemPayload::Video {
                url,
                external_asset_id,
            } => MediaItem::Video {
                url,
                external_asset_id,
            },
        }
    }
}

fn not_blank(value: &str, _: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("cannot be blank"));
    }
    Ok(())
}

/// Returned by the like endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct LikeResponse {
    /// True when this user had already liked the story; the counter was not
    /// incremented again.
    pub already_liked: bool,
    pub item: Story,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeCheckResponse {
    pub has_liked: bool,
}

/// Check like state for a list of stories in one round trip.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BatchLikeCheckPayload {
    #[garde(length(min = 1, max = MAX_BATCH_CHECK_IDS))]
    pub content_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchLikeCheckResponse {
    pub results: Vec<BatchLikeCheckEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchLikeCheckEntry {
    pub content_id: Uuid,
    pub has_liked: bool,
}
