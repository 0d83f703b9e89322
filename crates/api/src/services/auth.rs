//! Token verification against the external auth provider.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

/// Identity attached to a verified token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    /// True for the site owner (admin-equivalent actor).
    pub admin: bool,
}

/// Service for verifying bearer tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify a bearer token. Returns `None` for unknown or expired tokens.
    async fn verify(&self, token: &str) -> Result<Option<Identity>>;
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    valid: bool,
    user_id: Option<Uuid>,
    #[serde(default)]
    role: Option<String>,
}

/// HTTP implementation of AuthService.
#[derive(Clone)]
pub struct HttpAuthService {
    client: reqwest::Client,
    verify_url: String,
}

impl HttpAuthService {
    pub fn new(verify_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { client, verify_url })
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn verify(&self, token: &str) -> Result<Option<Identity>> {
        let response = self
            .client
            .post(&self.verify_url)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await?
            .error_for_status()?
            .json::<VerifyResponse>()
            .await?;

        if !response.valid {
            return Ok(None);
        }

        let user_id = response
            .user_id
            .ok_or_else(|| anyhow::anyhow!("auth provider returned valid token without user_id"))?;

        Ok(Some(Identity {
            user_id,
            admin: response.role.as_deref() == Some("admin"),
        }))
    }
}
