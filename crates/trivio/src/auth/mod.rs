//! Bearer-token authentication.
//!
//! [`TokenSession`] owns a credential pair for one API and keeps it valid:
//! it logs in on first use, refreshes on 401 and falls back to a full login
//! when the refresh token itself has expired.

mod config;
mod credentials;
mod endpoints;
mod session;
mod tokens;

pub use config::SessionConfig;
pub use credentials::Credentials;
pub use endpoints::{DEFAULT_LOGIN_PATH, DEFAULT_REFRESH_PATH};
pub use session::{RequestOptions, TokenSession};
pub use tokens::{AccessToken, RefreshToken};
