//! trivio - resilient calls against HTTP APIs.
//!
//! Two independent building blocks live here:
//!
//! - [`RetryingRequester`] executes one logical HTTP call with bounded
//!   retries and exponential backoff, reporting whether the call succeeded,
//!   was authoritatively rejected, or had to be given up.
//! - [`TokenSession`] keeps a bearer-token identity against one API,
//!   logging in, refreshing and re-authenticating so callers never handle
//!   the credential lifecycle themselves.
//!
//! # Example
//!
//! ```no_run
//! use trivio::{ApiUrl, Credentials, SessionConfig, TokenSession};
//!
//! # async fn example() -> Result<(), trivio::Error> {
//! let base = ApiUrl::new("http://localhost:8000/api/v1")?;
//! let config = SessionConfig::new(base, Credentials::new("alice", "secret"));
//! let session = TokenSession::new(config)?;
//!
//! let post = session
//!     .post("/posts/", &serde_json::json!({"title": "hello", "content": "world"}))
//!     .await?
//!     .error_for_status()?;
//! println!("created post {}", post.json::<serde_json::Value>()?["id"]);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod external;
pub mod http;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{AccessToken, Credentials, RefreshToken, RequestOptions, SessionConfig, TokenSession};
pub use error::Error;
pub use http::{ApiResponse, Backoff, Call, CallOutcome, RetryingRequester, Sleeper, TokioSleeper};
pub use reqwest::{Method, StatusCode, header};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// User agent sent with every request.
pub(crate) const USER_AGENT: &str = concat!("trivio/", env!("CARGO_PKG_VERSION"));
