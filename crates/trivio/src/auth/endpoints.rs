//! Login and refresh endpoint definitions and wire types.

use serde::{Deserialize, Serialize};

use crate::error::BadResponseError;

/// Default login endpoint, relative to the API base.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login/";

/// Default token refresh endpoint, relative to the API base.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh/";

/// Request body for login.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response from login. Both tokens are required; see [`required`].
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Request body for refresh.
#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response from refresh. Servers that do not rotate refresh tokens omit `refresh`.
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Unwrap a token field the server must send, naming it if absent.
pub(crate) fn required(
    value: Option<String>,
    field: &str,
    url: &str,
) -> Result<String, BadResponseError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BadResponseError::MissingField {
            url: url.to_string(),
            field: field.to_string(),
        })
}
