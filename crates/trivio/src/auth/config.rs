//! Session configuration.

use std::time::Duration;

use crate::types::ApiUrl;

use super::credentials::Credentials;
use super::endpoints::{DEFAULT_LOGIN_PATH, DEFAULT_REFRESH_PATH};

/// Everything a [`crate::TokenSession`] needs to know about its API.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL every path is resolved against.
    pub base_url: ApiUrl,
    /// Login endpoint, relative to `base_url`.
    pub login_path: String,
    /// Refresh endpoint, relative to `base_url`.
    pub refresh_path: String,
    /// Identity submitted on every full login.
    pub credentials: Credentials,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl SessionConfig {
    /// Configuration with the default `/auth/login/` and `/auth/refresh/` paths.
    pub fn new(base_url: ApiUrl, credentials: Credentials) -> Self {
        Self {
            base_url,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            credentials,
            timeout: None,
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn login_url(&self) -> String {
        self.base_url.endpoint(&self.login_path)
    }

    pub(crate) fn refresh_url(&self) -> String {
        self.base_url.endpoint(&self.refresh_path)
    }
}
