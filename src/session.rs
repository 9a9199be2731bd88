//! Logged-in handle to the inventory service.
//!
//! A `Session` is created once per process (one login) and passed explicitly
//! to every reconciler operation.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::client::{HttpInventoryClient, InventoryApi, RemoteError};
use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Idefix URL is not configured; set IDEFIX_URL")]
    MissingUrl,
    #[error("Idefix credentials are not configured; set IDEFIX_LOGIN and IDEFIX_PASSWORD")]
    MissingCredentials,
    #[error("Idefix login failed: {0}")]
    Remote(#[from] RemoteError),
}

#[derive(Clone)]
pub struct Session {
    api: Arc<dyn InventoryApi>,
}

impl Session {
    /// Wrap an already authenticated API implementation.
    pub fn new(api: Arc<dyn InventoryApi>) -> Self {
        Self { api }
    }

    /// Build the HTTP client from configuration and log in.
    pub async fn login(config: &AppConfig) -> Result<Self, SessionError> {
        let url = config.url.as_deref().ok_or(SessionError::MissingUrl)?;
        let (Some(login), Some(password)) = (config.login.as_deref(), config.password.as_deref())
        else {
            return Err(SessionError::MissingCredentials);
        };

        let client = HttpInventoryClient::new(
            url,
            Duration::from_secs(config.request_timeout_seconds),
        )?
        .login(login, password)
        .await?;

        info!(base_url = %url, "Idefix session established");
        Ok(Self::new(Arc::new(client)))
    }

    pub fn api(&self) -> &dyn InventoryApi {
        self.api.as_ref()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
