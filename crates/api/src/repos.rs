//! Database repositories (PostgreSQL).
//!
//! This module contains traits and implementations for database access.
//! Each repository is abstracted behind a trait to enable mocking in tests.
//!
//! ## Repositories
//!
//! - **stories** - Story lifecycle (create, list, archive, sweep, delete)
//!   and the atomic like-counter increment
//! - **likes** - The like ledger: one row per (story, user), inserted with
//!   a conditional-insert-only upsert
//!
//! ## Usage in Handlers
//!
//! Repositories are accessed via `state.repos`:
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     let story = state.repos.stories.find_by_id(story_id).await?;
//!     let liked = state.repos.likes.has_liked(story_id, user_id).await?;
//! }
//! ```

mod likes;
mod stories;

pub use likes::{LikeRepo, PgLikeRepo};
pub use stories::{PgStoryRepo, StoryRepo};

#[cfg(test)]
pub use likes::MockLikeRepo;
#[cfg(test)]
pub use stories::MockStoryRepo;

use std::sync::Arc;

/// Collection of all database repositories.
#[derive(Clone)]
pub struct Repos {
    pub stories: Arc<dyn StoryRepo>,
    pub likes: Arc<dyn LikeRepo>,
}
