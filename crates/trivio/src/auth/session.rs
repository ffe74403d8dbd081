//! Self-refreshing bearer-token session.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::{AuthError, Error, InvalidInputError, TransportError};
use crate::http::ApiResponse;

use super::config::SessionConfig;
use super::endpoints::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, required};
use super::tokens::{AccessToken, RefreshToken, TokenPair};

/// Per-request options for [`TokenSession::request`].
#[derive(Debug, Clone)]
pub struct RequestOptions {
    authenticated: bool,
    headers: HeaderMap,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            authenticated: true,
            headers: HeaderMap::new(),
        }
    }
}

impl RequestOptions {
    /// Send the request without logging in or attaching a bearer token.
    pub fn no_auth() -> Self {
        Self {
            authenticated: false,
            ..Self::default()
        }
    }

    /// Add an extra header. An `Authorization` header is overwritten on
    /// authenticated requests.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// A bearer-token identity against one API.
///
/// A session starts unauthenticated and logs in the first time a request
/// needs a token. When a request comes back 401 the session refreshes its
/// access token (logging in again if the refresh token was rejected too) and
/// re-issues the request exactly once. A second 401 is reported as
/// [`AuthError::StillUnauthorized`].
///
/// Transient failures are not retried here; use [`crate::RetryingRequester`]
/// for that.
///
/// # Thread Safety
///
/// Sessions are cheap to clone (they use internal `Arc`) and clones share
/// one credential pair. Login and refresh run under a single lock: when
/// several requests hit 401 at once, one of them re-authenticates and the
/// others pick up its token.
///
/// # Example
///
/// ```no_run
/// use trivio::{ApiUrl, Credentials, SessionConfig, TokenSession};
///
/// # async fn example() -> Result<(), trivio::Error> {
/// let config = SessionConfig::new(
///     ApiUrl::new("http://localhost:8000/api/v1")?,
///     Credentials::new("alice", "secret"),
/// );
/// let session = TokenSession::new(config)?;
/// let response = session.post("/posts/42/like/", &serde_json::json!({})).await?;
/// println!("{}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TokenSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    client: reqwest::Client,
    tokens: Mutex<Option<TokenPair>>,
}

impl TokenSession {
    /// Create an unauthenticated session with its own HTTP client.
    pub fn new(config: SessionConfig) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder().user_agent(crate::USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TransportError::from)?;
        Ok(Self::with_client(config, client))
    }

    /// Create an unauthenticated session sharing an existing HTTP client.
    ///
    /// The client's own timeout applies; `config.timeout` is ignored.
    pub fn with_client(config: SessionConfig, client: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                config,
                client,
                tokens: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Returns true once a credential pair is held.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.tokens.lock().await.is_some()
    }

    /// Install a credential pair obtained elsewhere, e.g. from a sign-up response.
    pub async fn set_tokens(&self, access: AccessToken, refresh: RefreshToken) {
        *self.inner.tokens.lock().await = Some(TokenPair { access, refresh });
    }

    /// Export the current access token.
    ///
    /// # Security
    ///
    /// Handle the returned token securely. It grants access to the account.
    pub async fn export_access_token(&self) -> Option<String> {
        let tokens = self.inner.tokens.lock().await;
        tokens.as_ref().map(|t| t.access.as_str().to_string())
    }

    /// Export the current refresh token.
    ///
    /// # Security
    ///
    /// Handle the returned token securely. It can be used to obtain new access tokens.
    pub async fn export_refresh_token(&self) -> Option<String> {
        let tokens = self.inner.tokens.lock().await;
        tokens.as_ref().map(|t| t.refresh.as_str().to_string())
    }

    /// Log in with the session identity, replacing any held tokens.
    ///
    /// # Errors
    ///
    /// [`AuthError::LoginRejected`] on any non-2xx answer. Login is never
    /// retried automatically.
    pub async fn login(&self) -> Result<(), Error> {
        let mut tokens = self.inner.tokens.lock().await;
        self.login_locked(&mut tokens).await.map(|_| ())
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Falls back to a full login if the refresh token is rejected with 401,
    /// or if no refresh token is held yet.
    pub async fn refresh(&self) -> Result<(), Error> {
        let mut tokens = self.inner.tokens.lock().await;
        self.refresh_locked(&mut tokens).await.map(|_| ())
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, Error> {
        self.request(Method::GET, path, None, &RequestOptions::default())
            .await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, Error> {
        self.request(Method::POST, path, Some(body), &RequestOptions::default())
            .await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse, Error> {
        self.request(Method::PUT, path, Some(body), &RequestOptions::default())
            .await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<ApiResponse, Error> {
        self.request(Method::PATCH, path, Some(body), &RequestOptions::default())
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, Error> {
        self.request(Method::DELETE, path, None, &RequestOptions::default())
            .await
    }

    /// Issue a request against `path` below the base URL.
    ///
    /// Authenticated requests log in first if no token is held. On 401 the
    /// session re-authenticates once and re-issues the request; any other
    /// status, including errors, is returned unmodified.
    ///
    /// # Errors
    ///
    /// - [`Error::Auth`] if login or refresh is rejected, or the request is
    ///   still 401 after re-authentication.
    /// - [`Error::BadResponse`] if a login or refresh response lacks tokens.
    /// - [`Error::Transport`] on network failure; not retried.
    #[instrument(skip(self, body, options), fields(authenticated = options.authenticated))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<ApiResponse, Error> {
        let url = self.inner.config.base_url.endpoint(path);

        if !options.authenticated {
            return self.send(method, &url, body, &options.headers, None).await;
        }

        let token = self.access_token().await?;
        let response = self
            .send(method.clone(), &url, body, &options.headers, Some(&token))
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("Access token rejected, re-authenticating");
        let token = self.reauthenticate(&token).await?;
        let response = self
            .send(method, &url, body, &options.headers, Some(&token))
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Still unauthorized after re-authentication");
            return Err(AuthError::StillUnauthorized.into());
        }

        Ok(response)
    }

    /// Current access token, logging in first if there is none.
    async fn access_token(&self) -> Result<AccessToken, Error> {
        let mut tokens = self.inner.tokens.lock().await;
        if let Some(pair) = tokens.as_ref() {
            return Ok(pair.access.clone());
        }
        self.login_locked(&mut tokens).await
    }

    /// Replace `stale` with a fresh access token.
    ///
    /// If another caller already replaced it while we waited for the lock,
    /// its token is reused instead of refreshing again.
    async fn reauthenticate(&self, stale: &AccessToken) -> Result<AccessToken, Error> {
        let mut tokens = self.inner.tokens.lock().await;
        if let Some(pair) = tokens.as_ref()
            && pair.access != *stale
        {
            debug!("Token already replaced by a concurrent request");
            return Ok(pair.access.clone());
        }
        self.refresh_locked(&mut tokens).await
    }

    #[instrument(skip(self, tokens), fields(username = %self.inner.config.credentials.username()))]
    async fn login_locked(&self, tokens: &mut Option<TokenPair>) -> Result<AccessToken, Error> {
        info!("Logging in");

        let credentials = &self.inner.config.credentials;
        let request = LoginRequest {
            username: credentials.username(),
            password: credentials.password(),
        };
        let response = self
            .send(
                Method::POST,
                &self.inner.config.login_url(),
                Some(&request),
                &HeaderMap::new(),
                None,
            )
            .await?;

        if !response.is_success() {
            warn!(status = %response.status(), "Login rejected");
            return Err(AuthError::LoginRejected {
                status: response.status().as_u16(),
            }
            .into());
        }

        let body: LoginResponse = response.json()?;
        let access = AccessToken::new(required(body.access, "access", response.url())?);
        let refresh = RefreshToken::new(required(body.refresh, "refresh", response.url())?);
        *tokens = Some(TokenPair {
            access: access.clone(),
            refresh,
        });

        debug!("Logged in successfully");
        Ok(access)
    }

    #[instrument(skip(self, tokens))]
    async fn refresh_locked(&self, tokens: &mut Option<TokenPair>) -> Result<AccessToken, Error> {
        let Some(refresh) = tokens.as_ref().map(|t| t.refresh.clone()) else {
            debug!("No refresh token held, logging in instead");
            return self.login_locked(tokens).await;
        };

        info!("Refreshing access token");

        let request = RefreshRequest {
            refresh: refresh.as_str(),
        };
        let response = self
            .send(
                Method::POST,
                &self.inner.config.refresh_url(),
                Some(&request),
                &HeaderMap::new(),
                None,
            )
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                info!("Refresh token rejected, logging in again");
                self.login_locked(tokens).await
            }
            status if status.is_success() => {
                let body: RefreshResponse = response.json()?;
                let access = AccessToken::new(required(body.access, "access", response.url())?);
                let refresh = body.refresh.map(RefreshToken::new).unwrap_or(refresh);
                *tokens = Some(TokenPair {
                    access: access.clone(),
                    refresh,
                });
                debug!("Access token refreshed");
                Ok(access)
            }
            status => {
                warn!(%status, "Refresh rejected");
                Err(AuthError::RefreshRejected {
                    status: status.as_u16(),
                }
                .into())
            }
        }
    }

    /// Send one request and read the response. No retries.
    async fn send<B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        headers: &HeaderMap,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse, Error>
    where
        B: Serialize + ?Sized,
    {
        debug!(%method, %url, "Sending request");

        let mut headers = headers.clone();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&token.bearer()).map_err(|_| {
                InvalidInputError::Header {
                    name: AUTHORIZATION.to_string(),
                }
            })?;
            value.set_sensitive(true);
            // insert, not append: the session token replaces a caller's Authorization
            headers.insert(AUTHORIZATION, value);
        }

        let mut request = self.inner.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Ok(ApiResponse::read(response).await?)
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for TokenSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSession")
            .field("base_url", &self.inner.config.base_url)
            .field("username", &self.inner.config.credentials.username())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use crate::types::ApiUrl;

    fn session() -> TokenSession {
        let config = SessionConfig::new(
            ApiUrl::new("http://localhost:8000/api/v1").unwrap(),
            Credentials::new("alice", "secret"),
        );
        TokenSession::new(config).unwrap()
    }

    #[tokio::test]
    async fn starts_unauthenticated() {
        let session = session();
        assert!(!session.is_authenticated().await);
        assert!(session.export_access_token().await.is_none());
        assert!(session.export_refresh_token().await.is_none());
    }

    #[tokio::test]
    async fn set_tokens_authenticates_all_clones() {
        let session = session();
        let clone = session.clone();
        session
            .set_tokens(AccessToken::new("a1"), RefreshToken::new("r1"))
            .await;
        assert!(clone.is_authenticated().await);
        assert_eq!(clone.export_access_token().await.as_deref(), Some("a1"));
        assert_eq!(clone.export_refresh_token().await.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn debug_hides_tokens() {
        let session = session();
        session
            .set_tokens(AccessToken::new("secret-access"), RefreshToken::new("secret-refresh"))
            .await;
        let debug = format!("{:?}", session);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
    }

    #[test]
    fn no_auth_options() {
        assert!(RequestOptions::default().authenticated);
        assert!(!RequestOptions::no_auth().authenticated);
    }
}
