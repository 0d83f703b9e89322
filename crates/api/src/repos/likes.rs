//! Like ledger repository for PostgreSQL.
//!
//! The whole concurrency story of likes lives in `insert_once`: a single
//! `INSERT .. ON CONFLICT DO NOTHING` whose rows-affected count reports
//! whether this call actually inserted the row. Callers condition the
//! counter increment on that signal, never on a separate existence check,
//! so two racing likes from the same user can never double-increment.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Repository for like-ledger operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikeRepo: Send + Sync {
    /// Insert a like if none exists for this (story, user) pair.
    /// Returns true when this call inserted the row.
    async fn insert_once(
        &self,
        story_id: Uuid,
        user_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Existence check against the composite key.
    async fn has_liked(&self, story_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// Batched existence check. Returns the subset of `story_ids` this user
    /// has liked, in one round trip.
    async fn has_liked_batch(&self, story_ids: &[Uuid], user_id: Uuid) -> Result<Vec<Uuid>>;
}

/// PostgreSQL implementation of LikeRepo.
#[derive(Clone)]
pub struct PgLikeRepo {
    pool: Pool<Postgres>,
}

impl PgLikeRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepo for PgLikeRepo {
    async fn insert_once(
        &self,
        story_id: Uuid,
        user_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO likes (story_id, user_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (story_id, user_id) DO NOTHING
            "#,
        )
        .bind(story_id)
        .bind(user_id)
        .bind(created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn has_liked(&self, story_id: Uuid, user_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE story_id = $1 AND user_id = $2)",
        )
        .bind(story_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn has_liked_batch(&self, story_ids: &[Uuid], user_id: Uuid) -> Result<Vec<Uuid>> {
        let liked: Vec<Uuid> = sqlx::query_scalar(
            "SELECT story_id FROM likes WHERE user_id = $1 AND story_id = ANY($2)",
        )
        .bind(user_id)
        .bind(story_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(liked)
    }
}
