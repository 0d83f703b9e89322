use std::sync::Arc;

use crate::{
    config::Config,
    repos::Repos,
    services::{AuthService, MediaStore, Notifier},
    stores::Stores,
};

#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Database repositories.
    pub repos: Repos,
    /// Ephemeral stores (Redis).
    pub stores: Stores,
    /// Token verification (external auth provider).
    pub auth: Arc<dyn AuthService>,
    /// External media store client.
    pub media: Arc<dyn MediaStore>,
    /// Story event fan-out.
    pub notifier: Arc<dyn Notifier>,
}
