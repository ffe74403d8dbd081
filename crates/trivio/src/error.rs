//! Error types for the trivio library.
//!
//! Every failure a caller may need to react to differently has its own
//! variant: transport failures, authentication failures, malformed server
//! responses, unexpected statuses and invalid input.
//!
//! Note that the two "soft" outcomes of a retried call (the server
//! authoritatively refused, or no confirmed answer was obtained) are not
//! errors at all; they are reported through [`crate::CallOutcome`].

use std::fmt;
use thiserror::Error;

/// The unified error type for trivio operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// An authenticated session could not be established.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The server answered, but not with what the protocol promises.
    #[error("bad server response: {0}")]
    BadResponse(#[from] BadResponseError),

    /// A response carried a non-success status the caller asked to treat as an error.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (URLs, header values).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true for the "cannot establish authenticated session" kind.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Returns true if the error came from the network rather than the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error, including failures while reading the body.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login endpoint refused the session identity.
    #[error("login rejected with HTTP {status}")]
    LoginRejected { status: u16 },

    /// The refresh endpoint failed with something other than 401.
    #[error("token refresh rejected with HTTP {status}")]
    RefreshRejected { status: u16 },

    /// The server kept answering 401 right after a successful re-authentication.
    #[error("server still answers HTTP 401 after re-authentication")]
    StillUnauthorized,
}

/// Malformed responses: bodies that are not JSON, or lack expected fields.
#[derive(Debug, Error)]
pub enum BadResponseError {
    /// The body could not be decoded into the expected shape.
    #[error("cannot decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// A field the protocol requires is missing.
    #[error("response from {url} is missing field '{field}'")]
    MissingField { url: String, field: String },
}

/// A non-success status surfaced by [`crate::ApiResponse::error_for_status`].
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// URL the response came from.
    pub url: String,
    /// Leading part of the response body, if any.
    pub body: Option<String>,
}

/// Maximum number of body characters kept in a [`ProtocolError`].
const BODY_PREVIEW_CHARS: usize = 256;

impl ProtocolError {
    /// Create a new protocol error, truncating the body preview.
    pub fn new(status: u16, url: impl Into<String>, body: &str) -> Self {
        let body = body.trim();
        let body = if body.is_empty() {
            None
        } else {
            Some(body.chars().take(BODY_PREVIEW_CHARS).collect())
        };
        Self {
            status,
            url: url.into(),
            body,
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} for {}", self.status, self.url)?;
        if let Some(ref body) = self.body {
            write!(f, ": {}", body)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid request URL.
    #[error("invalid URL '{value}': {reason}")]
    Url { value: String, reason: String },

    /// A header value that cannot be sent.
    #[error("invalid value for header '{name}'")]
    Header { name: String },
}
