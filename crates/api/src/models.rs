use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Hours a story stays visible before it expires.
pub const STORY_TTL_HOURS: i64 = 24;

/// Maximum number of media entries per story.
pub const MAX_MEDIA_ITEMS: usize = 10;

/// Maximum story title length in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// A single media entry attached to a story.
///
/// The bytes live in the external media store; we only keep the public URL
/// and the opaque asset id the store handed back at upload time. The asset
/// id is what the cleanup cascade uses to destroy the asset on deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaItem {
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        external_asset_id: Option<String>,
    },
    Video {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        external_asset_id: Option<String>,
    },
}

impl MediaItem {
    pub fn external_asset_id(&self) -> Option<&str> {
        match self {
            MediaItem::Image {
                external_asset_id, ..
            }
            | MediaItem::Video {
                external_asset_id, ..
            } => external_asset_id.as_deref(),
        }
    }
}

/// An ephemeral story.
///
/// Stories are visible for exactly [`STORY_TTL_HOURS`] after creation and
/// then transition to archived, exactly once, via the expiry sweep or a
/// manual archive. `expires_at` is computed at creation and never touched
/// again. `archived_at` is set the instant the transition happens and is
/// immutable from then on (the database enforces `archived` ⇔
/// `archived_at IS NOT NULL`).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Story {
    pub id: Uuid,
    pub title: String,
    pub media: Json<Vec<MediaItem>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    /// Denormalized like counter, only ever mutated through the atomic
    /// increment in the like path.
    pub like_count: i32,
}

/// A story ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewStory {
    pub id: Uuid,
    pub title: String,
    pub media: Vec<MediaItem>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewStory {
    pub fn new(title: String, media: Vec<MediaItem>, created_by: Uuid) -> Self {
        let created_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            media,
            created_by,
            created_at,
            expires_at: created_at + Duration::hours(STORY_TTL_HOURS),
        }
    }
}
