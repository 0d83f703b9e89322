use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub redis_url: String,
    /// Public base URL used to build shareable story links
    /// (e.g., https://lightbox.example.com)
    pub public_base_url: String,
    /// Token verification endpoint of the external auth provider.
    pub auth_verify_url: String,
    /// Base URL of the external media store API.
    pub media_api_url: String,
    pub media_api_key: String,
    /// Webhook receiving story-created events. Fan-out is disabled when unset.
    #[serde(default)]
    pub notify_webhook_url: Option<String>,
    /// Period of the scheduled expiry sweep, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Story creations allowed per caller per window.
    #[serde(default = "default_create_rate_limit")]
    pub create_rate_limit: i64,
    #[serde(default = "default_create_rate_window_secs")]
    pub create_rate_window_secs: u64,
    /// Set to "production" for JSON logging, anything else for human-readable.
    #[serde(default)]
    pub env: String,
    /// Sentry DSN for error tracking.
    #[serde(default)]
    pub sentry_dsn: Option<String>,
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_create_rate_limit() -> i64 {
    30
}

fn default_create_rate_window_secs() -> u64 {
    3600
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}
