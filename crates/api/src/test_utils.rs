//! Shared test utilities for API handler tests.
//!
//! Provides common mock factories and a flexible `TestStateBuilder` for
//! constructing `AppState` instances with only the mocks needed for each test.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::test_utils::{TestStateBuilder, mock_story};
//!
//! let mut story_repo = MockStoryRepo::new();
//! story_repo.expect_find_by_id().returning(|_| Ok(Some(mock_story(owner_id))));
//!
//! let state = TestStateBuilder::new()
//!     .with_story_repo(story_repo)
//!     .build();
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{MediaItem, Story, STORY_TTL_HOURS};
use crate::repos::{MockLikeRepo, MockStoryRepo, Repos};
use crate::services::{MockAuthService, MockMediaStore, MockNotifier};
use crate::state::AppState;
use crate::stores::{MockRateLimiter, RateLimitResult, Stores};

/// Creates a test configuration with dummy values.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        database_url: "postgres://test".to_string(),
        redis_url: "redis://test".to_string(),
        public_base_url: "https://lightbox.test".to_string(),
        auth_verify_url: "https://auth.test/verify".to_string(),
        media_api_url: "https://media.test".to_string(),
        media_api_key: "test".to_string(),
        notify_webhook_url: None,
        sweep_interval_secs: 3600,
        create_rate_limit: 30,
        create_rate_window_secs: 3600,
        env: "test".to_string(),
        sentry_dsn: None,
    }
}

/// Creates an active story owned by the given user, with one image that
/// carries an external asset id.
pub fn mock_story(created_by: Uuid) -> Story {
    let created_at = Utc::now();
    Story {
        id: Uuid::new_v4(),
        title: "Test story".to_string(),
        media: Json(vec![MediaItem::Image {
            url: "https://cdn.test/a.jpg".to_string(),
            external_asset_id: Some("asset-1".to_string()),
        }]),
        created_by,
        created_at,
        expires_at: created_at + Duration::hours(STORY_TTL_HOURS),
        archived: false,
        archived_at: None,
        like_count: 0,
    }
}

/// Creates a story that expired and was archived an hour ago.
pub fn mock_archived_story(created_by: Uuid) -> Story {
    let created_at = Utc::now() - Duration::hours(25);
    let mut story = mock_story(created_by);
    story.created_at = created_at;
    story.expires_at = created_at + Duration::hours(STORY_TTL_HOURS);
    story.archived = true;
    story.archived_at = Some(Utc::now() - Duration::hours(1));
    story
}

/// Builder for constructing test `AppState` with custom mocks.
///
/// Uses default mocks for anything not explicitly set. Defaults are
/// permissive where handlers touch them incidentally: the rate limiter
/// allows, the notifier and media store accept calls. Repos default to
/// empty mocks, so any unexpected repo call fails the test.
pub struct TestStateBuilder {
    story_repo: Option<MockStoryRepo>,
    like_repo: Option<MockLikeRepo>,
    rate_limiter: Option<MockRateLimiter>,
    auth_service: Option<MockAuthService>,
    media_store: Option<MockMediaStore>,
    notifier: Option<MockNotifier>,
}

impl TestStateBuilder {
    /// Creates a new builder with no mocks configured.
    pub fn new() -> Self {
        Self {
            story_repo: None,
            like_repo: None,
            rate_limiter: None,
            auth_service: None,
            media_store: None,
            notifier: None,
        }
    }

    pub fn with_story_repo(mut self, repo: MockStoryRepo) -> Self {
        self.story_repo = Some(repo);
        self
    }

    pub fn with_like_repo(mut self, repo: MockLikeRepo) -> Self {
        self.like_repo = Some(repo);
        self
    }

    pub fn with_rate_limiter(mut self, limiter: MockRateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    #[allow(dead_code)]
    pub fn with_auth_service(mut self, service: MockAuthService) -> Self {
        self.auth_service = Some(service);
        self
    }

    #[allow(dead_code)]
    pub fn with_media_store(mut self, store: MockMediaStore) -> Self {
        self.media_store = Some(store);
        self
    }

    pub fn with_notifier(mut self, notifier: MockNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Builds the `AppState` using configured mocks or defaults.
    pub fn build(self) -> AppState {
        let repos = Repos {
            stories: Arc::new(self.story_repo.unwrap_or_else(MockStoryRepo::new)),
            likes: Arc::new(self.like_repo.unwrap_or_else(MockLikeRepo::new)),
        };

        let stores = Stores {
            rate_limiter: Arc::new(self.rate_limiter.unwrap_or_else(default_rate_limiter)),
        };

        let auth = Arc::new(self.auth_service.unwrap_or_else(MockAuthService::new))
            as Arc<dyn crate::services::AuthService>;
        let media = Arc::new(self.media_store.unwrap_or_else(default_media_store))
            as Arc<dyn crate::services::MediaStore>;
        let notifier = Arc::new(self.notifier.unwrap_or_else(default_notifier))
            as Arc<dyn crate::services::Notifier>;

        AppState {
            config: test_config(),
            repos,
            stores,
            auth,
            media,
            notifier,
        }
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Rate limiter mock that allows everything.
fn default_rate_limiter() -> MockRateLimiter {
    let mut limiter = MockRateLimiter::new();
    limiter
        .expect_check_simple()
        .returning(|_, _, _| Ok(RateLimitResult::Allowed(1)));
    limiter
}

/// Media store mock that accepts any destroy call. Cleanup runs in spawned
/// tasks, so an unconfigured mock would panic off-thread.
fn default_media_store() -> MockMediaStore {
    let mut store = MockMediaStore::new();
    store.expect_destroy().returning(|_| Ok(()));
    store
}

/// Notifier mock that accepts any event, matching the fire-and-forget
/// contract of the create path.
fn default_notifier() -> MockNotifier {
    let mut notifier = MockNotifier::new();
    notifier.expect_story_created().returning(|_| Ok(()));
    notifier
}
