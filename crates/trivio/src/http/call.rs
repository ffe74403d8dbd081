//! Endpoint call descriptors.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::error::{Error, InvalidInputError};

use super::backoff::{Backoff, DEFAULT_MULTIPLIER};

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default wait before the second attempt.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Everything [`crate::RetryingRequester`] needs to execute one logical call.
///
/// Built fresh per invocation and not modified while the call runs.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use trivio::{Call, StatusCode};
///
/// let call = Call::get("https://api.example.com/v2/lookup")
///     .query("email", "alice@example.com")
///     .timeout(Duration::from_secs(20))
///     .max_attempts(4)
///     .no_retry_status(StatusCode::NOT_FOUND);
/// assert_eq!(call.max_attempts_value(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Call {
    method: Method,
    url: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Option<Value>,
    timeout: Duration,
    max_attempts: u32,
    retry_interval: Duration,
    backoff_multiplier: f64,
    max_interval: Option<Duration>,
    no_retry_status_codes: HashSet<StatusCode>,
}

impl Call {
    /// A call with an arbitrary method and the default retry parameters.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            backoff_multiplier: DEFAULT_MULTIPLIER,
            max_interval: None,
            no_retry_status_codes: HashSet::new(),
        }
    }

    /// A GET call with the default retry parameters.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach `Authorization: Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Fails if the token contains characters not allowed in a header.
    pub fn bearer_auth(self, token: &str) -> Result<Self, Error> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            InvalidInputError::Header {
                name: AUTHORIZATION.to_string(),
            }
        })?;
        value.set_sensitive(true);
        Ok(self.header(AUTHORIZATION, value))
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Send `body` as JSON.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Per-attempt timeout. There is no deadline across attempts.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total number of attempts, at least one.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Wait before the second attempt.
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Upper bound for any single backoff sleep.
    pub fn max_interval(mut self, max: Duration) -> Self {
        self.max_interval = Some(max);
        self
    }

    /// Treat `status` as an authoritative answer: stop and report it instead of retrying.
    pub fn no_retry_status(mut self, status: StatusCode) -> Self {
        self.no_retry_status_codes.insert(status);
        self
    }

    pub fn no_retry_statuses(mut self, statuses: impl IntoIterator<Item = StatusCode>) -> Self {
        self.no_retry_status_codes.extend(statuses);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout_value(&self) -> Duration {
        self.timeout
    }

    pub fn max_attempts_value(&self) -> u32 {
        self.max_attempts
    }

    pub(crate) fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub(crate) fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub(crate) fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Returns true if `status` must short-circuit retries.
    pub fn is_final_status(&self, status: StatusCode) -> bool {
        self.no_retry_status_codes.contains(&status)
    }

    /// Fresh backoff state for one execution of this call.
    pub fn backoff(&self) -> Backoff {
        let backoff = Backoff::new(self.retry_interval, self.backoff_multiplier);
        match self.max_interval {
            Some(max) => backoff.with_max(max),
            None => backoff,
        }
    }
}
