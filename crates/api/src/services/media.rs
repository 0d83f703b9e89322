//! External media store client.
//!
//! The store holds the actual image/video bytes; stories only carry URLs
//! and opaque asset ids. The single operation we need is destroy-by-id,
//! used by the cleanup cascade after a story is deleted. Calls carry a
//! short timeout so a slow store can never stall a caller.

use anyhow::Result;
use async_trait::async_trait;

/// Client for the external media store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Destroy an uploaded asset by its opaque id.
    async fn destroy(&self, asset_id: &str) -> Result<()>;
}

/// HTTP implementation of MediaStore.
#[derive(Clone)]
pub struct HttpMediaStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpMediaStore {
    pub fn new(base_url: String, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn destroy(&self, asset_id: &str) -> Result<()> {
        let url = format!("{}/assets/{}", self.base_url.trim_end_matches('/'), asset_id);
        self.client
            .delete(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
