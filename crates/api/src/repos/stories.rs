//! Story repository for PostgreSQL.
//!
//! The archive transition and the expiry sweep are single predicate-based
//! UPDATE statements, so concurrent sweeps (lazy and scheduled) are safe by
//! construction: a row flipped by one path no longer matches the other's
//! predicate. There is deliberately no store-level TTL auto-delete here -
//! a raw auto-delete would destroy rows before the archived surfaces could
//! ever see them and would orphan their external media with no cleanup.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::{NewStory, Story};

/// Repository for story operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoryRepo: Send + Sync {
    /// Health check - verify database connectivity.
    async fn health_check(&self) -> Result<bool>;

    /// Insert a new story.
    async fn create(&self, story: &NewStory) -> Result<Story>;

    /// Find a story by ID, in any state.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Story>>;

    /// List active stories, newest first.
    async fn list_active(&self) -> Result<Vec<Story>>;

    /// List archived stories, most recently archived first.
    async fn list_archived(&self) -> Result<Vec<Story>>;

    /// Archive a story if it is still active. Returns the updated story, or
    /// `None` when the row was missing or already archived.
    async fn archive(&self, id: Uuid, archived_at: DateTime<Utc>) -> Result<Option<Story>>;

    /// Archive every overdue story (`archived = false AND expires_at <= now`)
    /// in one statement. Returns the number of rows transitioned. Idempotent:
    /// re-running when nothing qualifies is a no-op.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64>;

    /// Delete a story in any state. Returns the deleted row so the caller
    /// can hand its media to the cleanup cascade.
    async fn delete(&self, id: Uuid) -> Result<Option<Story>>;

    /// Atomically bump the like counter. Returns the updated story, or
    /// `None` if it no longer exists. Only reachable from the branch of the
    /// like path where a ledger insert is known to have just happened.
    async fn increment_like_count(&self, id: Uuid) -> Result<Option<Story>>;
}

/// PostgreSQL implementation of StoryRepo.
#[derive(Clone)]
pub struct PgStoryRepo {
    pool: Pool<Postgres>,
}

impl PgStoryRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoryRepo for PgStoryRepo {
    async fn health_check(&self) -> Result<bool> {
        let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(one == 1)
    }

    async fn create(&self, story: &NewStory) -> Result<Story> {
        let created = sqlx::query_as::<_, Story>(
            r#"
            INSERT INTO stories (id, title, media, created_by, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(story.id)
        .bind(&story.title)
        .bind(Json(&story.media))
        .bind(story.created_by)
        .bind(story.created_at)
        .bind(story.expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Story>> {
        let story = sqlx::query_as::<_, Story>("SELECT * FROM stories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(story)
    }

    async fn list_active(&self) -> Result<Vec<Story>> {
        let stories = sqlx::query_as::<_, Story>(
            "SELECT * FROM stories WHERE archived = FALSE ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stories)
    }

    async fn list_archived(&self) -> Result<Vec<Story>> {
        let stories = sqlx::query_as::<_, Story>(
            "SELECT * FROM stories WHERE archived = TRUE ORDER BY archived_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stories)
    }

    async fn archive(&self, id: Uuid, archived_at: DateTime<Utc>) -> Result<Option<Story>> {
        let story = sqlx::query_as::<_, Story>(
            r#"
            UPDATE stories
            SET archived = TRUE, archived_at = $2
            WHERE id = $1 AND archived = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(archived_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(story)
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE stories
            SET archived = TRUE, archived_at = $1
            WHERE archived = FALSE AND expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Story>> {
        let story = sqlx::query_as::<_, Story>("DELETE FROM stories WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(story)
    }

    async fn increment_like_count(&self, id: Uuid) -> Result<Option<Story>> {
        let story = sqlx::query_as::<_, Story>(
            r#"
            UPDATE stories
            SET like_count = like_count + 1
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(story)
    }
}
