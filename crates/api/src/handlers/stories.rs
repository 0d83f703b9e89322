//! Story lifecycle endpoints.
//!
//! Stories are ephemeral media posts: visible for exactly 24 hours, then
//! archived, never deleted behind the owner's back. The archive transition
//! is one-way and happens exactly once, through either the lazy sweep (run
//! at the top of the active listing) or the scheduled sweep - both share
//! one predicate-based bulk update, so racing them is harmless.
//!
//! ## Endpoints
//!
//! - GET /stories - list active (sweeps first; public)
//! - GET /stories/{id} - fetch one, any state (public)
//! - POST /stories - create (owner only, rate guarded)
//! - PUT /stories/{id}/archive - manual archive (creator/admin)
//! - DELETE /stories/{id} - delete from any state (creator/admin)
//! - GET /stories/archived - archived listing (authenticated)
//! - GET /stories/archived/{id} - archived-scope read (authenticated)
//! - DELETE /stories/archived/{id} - archived-scope delete (creator/admin);
//!   fails on a still-active story to keep the two delete surfaces distinct
//!
//! Deletion spawns the media cleanup cascade and never waits on it.

use axum::{
    Json, Router, debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use chrono::Utc;
use garde::Validate;
use uuid::Uuid;

use crate::{
    cleanup,
    error::AppError,
    expiry,
    middleware::auth::AuthUser,
    models::{NewStory, Story},
    payloads::CreateStoryPayload,
    services::StoryCreatedEvent,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stories).post(create_story))
        .route("/archived", get(list_archived))
        .route("/archived/{id}", get(get_archived).delete(delete_archived))
        .route("/{id}", get(get_story).delete(delete_story))
        .route("/{id}/archive", put(archive_story))
}

fn can_modify(user: &AuthUser, story: &Story) -> bool {
    user.admin || story.created_by == user.id
}

#[debug_handler]
async fn create_story(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateStoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    if !user.admin {
        return Err(AppError::External(
            StatusCode::FORBIDDEN,
            "Only the site owner can publish stories",
        ));
    }

    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    // Shed abusive callers before touching the database.
    let rate = state
        .stores
        .rate_limiter
        .check_simple(
            &format!("ratelimit:stories:create:{}", user.id),
            state.config.create_rate_limit,
            state.config.create_rate_window_secs,
        )
        .await?;
    if !rate.is_allowed() {
        return Err(AppError::External(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many stories created, slow down",
        ));
    }

    let new = NewStory::new(
        payload.title,
        payload.media.into_iter().map(Into::into).collect(),
        user.id,
    );
    let story = state.repos.stories.create(&new).await?;

    // Fire-and-forget fan-out: the notification collaborator picks up the
    // event with a shareable link. Failure never fails the create.
    let event = StoryCreatedEvent {
        story_id: story.id,
        title: story.title.clone(),
        share_url: format!(
            "{}/stories/{}",
            state.config.public_base_url.trim_end_matches('/'),
            story.id
        ),
    };
    let notifier = state.notifier.clone();
    tokio::spawn(async move {
        if let Err(err) = notifier.story_created(&event).await {
            tracing::warn!(story_id = %event.story_id, error = ?err, "story created notification failed");
        }
    });

    tracing::info!(story_id = %story.id, media = story.media.0.len(), "story created");

    Ok((StatusCode::CREATED, Json(story)))
}

/// Lists active stories, newest first. Always runs the lazy expiry sweep
/// first so an overdue-but-unarchived story is never observable here.
#[debug_handler]
async fn list_stories(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    expiry::sweep_overdue(state.repos.stories.as_ref()).await?;

    let stories = state.repos.stories.list_active().await?;
    Ok(Json(stories))
}

#[debug_handler]
async fn get_story(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let story = state
        .repos
        .stories
        .find_by_id(id)
        .await?
        .ok_or(AppError::External(StatusCode::NOT_FOUND, "Story not found"))?;

    Ok(Json(story))
}

#[debug_handler]
async fn archive_story(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let story = state
        .repos
        .stories
        .find_by_id(id)
        .await?
        .ok_or(AppError::External(StatusCode::NOT_FOUND, "Story not found"))?;

    if !can_modify(&user, &story) {
        return Err(AppError::External(
            StatusCode::FORBIDDEN,
            "Not authorized to archive this story",
        ));
    }

    if story.archived {
        return Err(AppError::External(
            StatusCode::CONFLICT,
            "Story is already archived",
        ));
    }

    // Predicate update: a sweep racing us flips the row first and we land
    // in the None arm instead of double-setting archived_at.
    match state.repos.stories.archive(id, Utc::now()).await? {
        Some(archived) => {
            tracing::info!(story_id = %id, user_id = %user.id, "story archived manually");
            Ok(Json(archived))
        }
        None => Err(AppError::External(
            StatusCode::CONFLICT,
            "Story is already archived",
        )),
    }
}

/// Deletes a story from either state. The row goes first; external media
/// cleanup is spawned afterwards and the response never waits on it.
#[debug_handler]
async fn delete_story(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let story = state
        .repos
        .stories
        .find_by_id(id)
        .await?
        .ok_or(AppError::External(StatusCode::NOT_FOUND, "Story not found"))?;

    if !can_modify(&user, &story) {
        return Err(AppError::External(
            StatusCode::FORBIDDEN,
            "Not authorized to delete this story",
        ));
    }

    if let Some(deleted) = state.repos.stories.delete(id).await? {
        cleanup::spawn(state.media.clone(), deleted);
    }

    tracing::info!(story_id = %id, user_id = %user.id, "story deleted");

    Ok(StatusCode::OK)
}

#[debug_handler]
async fn list_archived(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stories = state.repos.stories.list_archived().await?;
    Ok(Json(stories))
}

/// Archived-scope read: a still-active story is not visible through here.
#[debug_handler]
async fn get_archived(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let story = state.repos.stories.find_by_id(id).await?;

    match story {
        Some(story) if story.archived => Ok(Json(story)),
        _ => Err(AppError::External(
            StatusCode::NOT_FOUND,
            "Archived story not found",
        )),
    }
}

/// Archived-scope delete: rejects a still-active story so this surface
/// stays semantically distinct from the general delete.
#[debug_handler]
async fn delete_archived(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let story = state
        .repos
        .stories
        .find_by_id(id)
        .await?
        .ok_or(AppError::External(StatusCode::NOT_FOUND, "Story not found"))?;

    if !can_modify(&user, &story) {
        return Err(AppError::External(
            StatusCode::FORBIDDEN,
            "Not authorized to delete this story",
        ));
    }

    if !story.archived {
        return Err(AppError::External(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Story is still active",
        ));
    }

    if let Some(deleted) = state.repos.stories.delete(id).await? {
        cleanup::spawn(state.media.clone(), deleted);
    }

    tracing::info!(story_id = %id, user_id = %user.id, "archived story deleted");

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaItem;
    use crate::payloads::MediaItemPayload;
    use crate::repos::MockStoryRepo;
    use crate::services::MockNotifier;
    use crate::stores::{MockRateLimiter, RateLimitResult};
    use crate::test_utils::{TestStateBuilder, mock_archived_story, mock_story};

    fn admin() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            admin: true,
        }
    }

    fn visitor() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            admin: false,
        }
    }

    fn create_payload() -> CreateStoryPayload {
        CreateStoryPayload {
            title: "Sunset from the roof".into(),
            media: vec![MediaItemPayload::Image {
                url: "https://cdn.example.com/a.jpg".into(),
                external_asset_id: Some("asset-1".into()),
            }],
        }
    }

    #[tokio::test]
    async fn create_story_rejects_non_owner() {
        let state = TestStateBuilder::new().build();

        let result = create_story(visitor(), State(state), Json(create_payload())).await;

        let Err(AppError::External(status, _)) = result else {
            panic!("Expected External error");
        };
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn create_story_rejects_blank_title() {
        let state = TestStateBuilder::new().build();

        let mut payload = create_payload();
        payload.title = "   ".into();

        let result = create_story(admin(), State(state), Json(payload)).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_story_sheds_load_before_touching_the_database() {
        let mut rate_limiter = MockRateLimiter::new();
        rate_limiter
            .expect_check_simple()
            .returning(|_, _, _| Ok(RateLimitResult::Exceeded(31)));

        // No story repo expectations: any repo call would panic the test.
        let state = TestStateBuilder::new()
            .with_rate_limiter(rate_limiter)
            .build();

        let result = create_story(admin(), State(state), Json(create_payload())).await;

        let Err(AppError::External(status, _)) = result else {
            panic!("Expected External error");
        };
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn create_story_persists_with_one_day_expiry() {
        let user = admin();
        let user_id = user.id;
        let story = mock_story(user_id);

        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_create()
            .withf(move |new: &NewStory| {
                new.title == "Sunset from the roof"
                    && new.created_by == user_id
                    && new.media.len() == 1
                    && new.expires_at - new.created_at == chrono::Duration::hours(24)
            })
            .returning(move |_| Ok(story.clone()));

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = create_story(user, State(state), Json(create_payload()))
            .await
            .unwrap();

        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn create_story_succeeds_when_notifier_fails() {
        let user = admin();
        let story = mock_story(user.id);

        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_create()
            .returning(move |_| Ok(story.clone()));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_story_created()
            .returning(|_| Err(anyhow::anyhow!("webhook endpoint down")));

        let state = TestStateBuilder::new()
            .with_story_repo(story_repo)
            .with_notifier(notifier)
            .build();

        let result = create_story(user, State(state), Json(create_payload()))
            .await
            .unwrap();

        assert_eq!(result.into_response().status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn list_stories_sweeps_before_listing() {
        let mut seq = mockall::Sequence::new();
        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_sweep_expired()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(1));
        story_repo
            .expect_list_active()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![]));

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = list_stories(State(state)).await.unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn list_stories_fails_when_sweep_fails() {
        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_sweep_expired()
            .returning(|_| Err(anyhow::anyhow!("connection reset")));
        // list_active must not run if the sweep failed: an overdue story
        // would leak into the listing.

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = list_stories(State(state)).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn get_story_returns_any_state() {
        let story = mock_archived_story(Uuid::new_v4());
        let story_id = story.id;

        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_find_by_id()
            .with(mockall::predicate::eq(story_id))
            .returning(move |_| Ok(Some(story.clone())));

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = get_story(State(state), Path(story_id)).await.unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn get_story_returns_not_found() {
        let mut story_repo = MockStoryRepo::new();
        story_repo.expect_find_by_id().returning(|_| Ok(None));

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = get_story(State(state), Path(Uuid::new_v4())).await;

        let Err(AppError::External(status, _)) = result else {
            panic!("Expected External error");
        };
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn archive_story_transitions_once() {
        let user = visitor();
        let story = mock_story(user.id);
        let story_id = story.id;
        let archived = mock_archived_story(user.id);

        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(story.clone())));
        story_repo
            .expect_archive()
            .with(mockall::predicate::eq(story_id), mockall::predicate::always())
            .times(1)
            .returning(move |_, _| Ok(Some(archived.clone())));

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = archive_story(user, State(state), Path(story_id))
            .await
            .unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn archive_story_conflicts_when_already_archived() {
        let user = admin();
        let story = mock_archived_story(user.id);
        let story_id = story.id;

        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(story.clone())));
        // No expect_archive: the archived_at already set must never be touched.

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = archive_story(user, State(state), Path(story_id)).await;

        let Err(AppError::External(status, _)) = result else {
            panic!("Expected External error");
        };
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn archive_story_conflicts_when_sweep_won_the_race() {
        let user = admin();
        let story = mock_story(user.id);
        let story_id = story.id;

        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(story.clone())));
        // The row stopped matching the predicate between fetch and update.
        story_repo.expect_archive().returning(|_, _| Ok(None));

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = archive_story(user, State(state), Path(story_id)).await;

        let Err(AppError::External(status, _)) = result else {
            panic!("Expected External error");
        };
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn archive_story_forbidden_for_other_users() {
        let story = mock_story(Uuid::new_v4());
        let story_id = story.id;

        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(story.clone())));

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = archive_story(visitor(), State(state), Path(story_id)).await;

        let Err(AppError::External(status, _)) = result else {
            panic!("Expected External error");
        };
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn delete_story_works_from_active_state() {
        let user = admin();
        let story = mock_story(user.id);
        let story_id = story.id;
        let deleted = story.clone();

        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(story.clone())));
        story_repo
            .expect_delete()
            .with(mockall::predicate::eq(story_id))
            .times(1)
            .returning(move |_| Ok(Some(deleted.clone())));

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = delete_story(user, State(state), Path(story_id))
            .await
            .unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn delete_story_forbidden_for_other_users() {
        let story = mock_story(Uuid::new_v4());
        let story_id = story.id;

        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(story.clone())));

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = delete_story(visitor(), State(state), Path(story_id)).await;

        let Err(AppError::External(status, _)) = result else {
            panic!("Expected External error");
        };
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn delete_archived_rejects_still_active_story() {
        let user = admin();
        let story = mock_story(user.id);
        let story_id = story.id;

        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(story.clone())));
        // No expect_delete: the wrong-scope surface must not delete.

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = delete_archived(user, State(state), Path(story_id)).await;

        let Err(AppError::External(status, _)) = result else {
            panic!("Expected External error");
        };
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn delete_archived_works_on_archived_story() {
        let user = admin();
        let story = mock_archived_story(user.id);
        let story_id = story.id;
        let deleted = story.clone();

        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(story.clone())));
        story_repo
            .expect_delete()
            .times(1)
            .returning(move |_| Ok(Some(deleted.clone())));

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = delete_archived(user, State(state), Path(story_id))
            .await
            .unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn get_archived_hides_active_stories() {
        let story = mock_story(Uuid::new_v4());
        let story_id = story.id;

        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(story.clone())));

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = get_archived(visitor(), State(state), Path(story_id)).await;

        let Err(AppError::External(status, _)) = result else {
            panic!("Expected External error");
        };
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_archived_returns_archived_stories() {
        let mut story_repo = MockStoryRepo::new();
        story_repo
            .expect_list_archived()
            .returning(|| Ok(vec![mock_archived_story(Uuid::new_v4())]));

        let state = TestStateBuilder::new().with_story_repo(story_repo).build();

        let result = list_archived(visitor(), State(state)).await.unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[test]
    fn create_story_media_payload_carries_asset_id() {
        let payload = create_payload();
        let media: Vec<MediaItem> = payload.media.into_iter().map(Into::into).collect();

        assert_eq!(media[0].external_asset_id(), Some("asset-1"));
    }
}
