//! External service abstractions.
//!
//! This module contains traits and implementations for external services
//! that the API depends on. Each service is abstracted behind a trait to
//! enable mocking in tests.
//!
//! ## Services
//!
//! - **auth** - Bearer token verification against the external auth provider
//! - **media** - Asset destruction in the external media store (uploads go
//!   straight from the client to the store; we only ever delete)
//! - **notify** - Fire-and-forget story-created events for the notification
//!   fan-out collaborator
//!
//! ## Usage in Handlers
//!
//! Services are accessed via `AppState`:
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     let identity = state.auth.verify(token).await?;
//!     state.media.destroy("asset-id").await?;
//! }
//! ```

mod auth;
mod media;
mod notify;

pub use auth::{AuthService, HttpAuthService, Identity};
pub use media::{HttpMediaStore, MediaStore};
pub use notify::{HttpNotifier, Notifier, StoryCreatedEvent};

#[cfg(test)]
pub use auth::MockAuthService;
#[cfg(test)]
pub use media::MockMediaStore;
#[cfg(test)]
pub use notify::MockNotifier;
