//! Like endpoints.
//!
//! A like exists at most once per (story, user), forever - there is no
//! unlike. The handler performs a conditional-insert-only upsert against
//! the ledger and bumps the denormalized counter only when that insert
//! actually happened. The increment is conditioned on the insert's own
//! success signal, never on a separate existence check, so concurrent
//! likes from the same user cannot double-increment. No transaction spans
//! the two writes.
//!
//! ## Endpoints
//!
//! - POST /content/{id}/like - like a story
//! - GET /content/{id}/like/check - has this user liked the story
//! - POST /content/likes/check-batch - same check for a list of stories

use std::collections::HashSet;

use axum::{
    Json, Router, debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use garde::Validate;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    payloads::{BatchLikeCheckEntry, BatchLikeCheckPayload, BatchLikeCheckResponse,
        LikeCheckResponse, LikeResponse},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/like", post(like_story))
        .route("/{id}/like/check", get(check_like))
        .route("/likes/check-batch", post(check_like_batch))
}

#[debug_handler]
async fn like_story(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let inserted = state
        .repos
        .likes
        .insert_once(id, user.id, Utc::now())
        .await?;

    // Existence is checked after the ledger write. A like left dangling by
    // a concurrent story deletion is a harmless orphan, not worth a
    // rollback.
    let story = if inserted {
        state.repos.stories.increment_like_count(id).await?
    } else {
        state.repos.stories.find_by_id(id).await?
    };

    let story = story.ok_or(AppError::External(StatusCode::NOT_FOUND, "Story not found"))?;

    if inserted {
        tracing::info!(story_id = %id, user_id = %user.id, "story liked");
    }

    Ok(Json(LikeResponse {
        already_liked: !inserted,
        item: story,
    }))
}

#[debug_handler]
async fn check_like(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let has_liked = state.repos.likes.has_liked(id, user.id).await?;

    Ok(Json(LikeCheckResponse { has_liked }))
}

/// One query instead of N round trips when rendering a story list.
#[debug_handler]
async fn check_like_batch(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<BatchLikeCheckPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let liked: HashSet<Uuid> = state
        .repos
        .likes
        .has_liked_batch(&payload.content_ids, user.id)
        .await?
        .into_iter()
        .collect();

    let results = payload
        .content_ids
        .iter()
        .map(|&content_id| BatchLikeCheckEntry {
            content_id,
            has_liked: liked.contains(&content_id),
        })
        .collect();

    Ok(Json(BatchLikeCheckResponse { results }))
}
