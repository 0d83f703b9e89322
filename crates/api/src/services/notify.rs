//! Story-created event fan-out.
//!
//! The core's contract ends at "event emitted": the notification
//! collaborator (SMS/email/push) consumes the event out-of-band. Emission
//! is spawned fire-and-forget by the create handler; a failure here is
//! logged and must never fail the create call.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

/// Event emitted after a story is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryCreatedEvent {
    pub story_id: Uuid,
    pub title: String,
    /// Shareable link to the new story.
    pub share_url: String,
}

/// Sender for story lifecycle events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn story_created(&self, event: &StoryCreatedEvent) -> Result<()>;
}

/// HTTP webhook implementation of Notifier.
///
/// No-op when no webhook URL is configured.
#[derive(Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl HttpNotifier {
    pub fn new(webhook_url: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            webhook_url,
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn story_created(&self, event: &StoryCreatedEvent) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            return Ok(());
        };

        self.client
            .post(url)
            .json(event)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
