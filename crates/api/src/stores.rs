//! Ephemeral stores (Redis).
//!
//! Only rate-limit counters live in Redis. Story state is durable and
//! belongs to PostgreSQL: the archive model depends on expired rows staying
//! readable through the archived surfaces, which rules out TTL'd storage.
//!
//! ## Redis Key Patterns
//!
//! ```text
//! ratelimit:{endpoint}:{caller}  → fixed-window counter (auto-expires)
//! ```
//!
//! ## Usage in Handlers
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     let result = state.stores.rate_limiter.check_simple(&key, limit, window).await?;
//! }
//! ```

mod rate_limit;

pub use rate_limit::{RateLimitResult, RateLimiter, RedisRateLimiter};

#[cfg(test)]
pub use rate_limit::MockRateLimiter;

use std::sync::Arc;

/// Collection of all ephemeral stores.
#[derive(Clone)]
pub struct Stores {
    pub rate_limiter: Arc<dyn RateLimiter>,
}
