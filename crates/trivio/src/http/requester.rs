//! Bounded retries with exponential backoff.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, InvalidInputError, TransportError};

use super::call::Call;
use super::response::ApiResponse;

/// How one retried call ended.
///
/// Only success carries a body. `Rejected` and `GaveUp` are deliberately
/// different: the first means the server answered authoritatively, the second
/// that no confirmed answer could be obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// HTTP 200 with a JSON body.
    Success(Value),
    /// The server answered with a status from the call's no-retry set.
    Rejected { status: StatusCode },
    /// Every attempt failed transiently.
    GaveUp { attempts: u32 },
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, CallOutcome::Rejected { .. })
    }

    pub fn is_gave_up(&self) -> bool {
        matches!(self, CallOutcome::GaveUp { .. })
    }

    /// The body of a successful call.
    pub fn into_body(self) -> Option<Value> {
        match self {
            CallOutcome::Success(body) => Some(body),
            _ => None,
        }
    }
}

/// Waits between attempts. Swappable so backoff timing can be observed.
#[async_trait]
pub trait Sleeper: Send + Sync + fmt::Debug {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Executes [`Call`]s, retrying transient failures.
///
/// The requester itself holds no per-call state: attempt counters and
/// backoff intervals live inside each [`RetryingRequester::execute`]
/// invocation, so one requester can serve any number of concurrent calls.
///
/// # Example
///
/// ```no_run
/// use trivio::{Call, CallOutcome, RetryingRequester, StatusCode};
///
/// # async fn example() -> Result<(), trivio::Error> {
/// let requester = RetryingRequester::new()?;
/// let call = Call::get("https://api.example.com/people/alice")
///     .no_retry_status(StatusCode::NOT_FOUND);
///
/// match requester.execute(&call).await? {
///     CallOutcome::Success(body) => println!("{body}"),
///     CallOutcome::Rejected { status } => println!("server said no: {status}"),
///     CallOutcome::GaveUp { attempts } => println!("no answer after {attempts} attempts"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RetryingRequester {
    client: reqwest::Client,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryingRequester {
    /// Create a requester with its own HTTP client.
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .build()
            .map_err(TransportError::from)?;
        Ok(Self::with_client(client))
    }

    /// Create a requester sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the component that waits between attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Execute `call`, retrying transient failures.
    ///
    /// Network errors and statuses other than 200 are transient unless the
    /// status is in the call's no-retry set. Between attempts the task
    /// sleeps for the next backoff delay; no sleep follows the last attempt.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if the call's URL is not an absolute
    ///   http(s) URL. Nothing is sent.
    /// - [`Error::BadResponse`] if a 200 response body is not JSON.
    ///
    /// Rejections and exhausted attempts are reported as [`CallOutcome`]
    /// values.
    #[instrument(skip(self, call), fields(method = %call.method(), url = %call.url()))]
    pub async fn execute(&self, call: &Call) -> Result<CallOutcome, Error> {
        validate_url(call.url())?;

        let max_attempts = call.max_attempts_value();
        let mut backoff = call.backoff();

        for attempt in 1..=max_attempts {
            info!(attempt, max_attempts, "Calling API");

            match self.attempt(call).await {
                Ok(response) if response.status() == StatusCode::OK => {
                    debug!("API call successful");
                    return response.json().map(CallOutcome::Success);
                }
                Ok(response) if call.is_final_status(response.status()) => {
                    let status = response.status();
                    info!(%status, "Final status, not retrying");
                    return Ok(CallOutcome::Rejected { status });
                }
                Ok(response) => {
                    warn!(attempt, status = %response.status(), "API call failed");
                }
                Err(e) => {
                    warn!(attempt, error = %e, "API call failed");
                }
            }

            if attempt < max_attempts {
                let delay = backoff.next_delay();
                debug!(?delay, "Retrying");
                self.sleeper.sleep(delay).await;
            }
        }

        warn!(attempts = max_attempts, "Giving up on API call");
        Ok(CallOutcome::GaveUp {
            attempts: max_attempts,
        })
    }

    async fn attempt(&self, call: &Call) -> Result<ApiResponse, TransportError> {
        let mut request = self
            .client
            .request(call.method().clone(), call.url())
            .headers(call.headers().clone())
            .timeout(call.timeout_value());

        if !call.query_pairs().is_empty() {
            request = request.query(call.query_pairs());
        }
        if let Some(body) = call.body() {
            request = request.json(body);
        }

        let response = request.send().await?;
        ApiResponse::read(response).await
    }
}

/// Reject URLs no attempt could ever send, so they are not mistaken for transient failures.
fn validate_url(url: &str) -> Result<(), InvalidInputError> {
    let invalid = |reason: &str| InvalidInputError::Url {
        value: url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(&format!("unsupported scheme '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_accessors() {
        let success = CallOutcome::Success(serde_json::json!({"ok": true}));
        assert!(success.is_success());
        assert_eq!(success.into_body(), Some(serde_json::json!({"ok": true})));

        let rejected = CallOutcome::Rejected {
            status: StatusCode::NOT_FOUND,
        };
        assert!(rejected.is_rejected());
        assert!(!rejected.is_gave_up());
        assert_eq!(rejected.into_body(), None);

        let gave_up = CallOutcome::GaveUp { attempts: 3 };
        assert!(gave_up.is_gave_up());
        assert_ne!(gave_up, CallOutcome::Rejected { status: StatusCode::NOT_FOUND });
    }

    #[test]
    fn validate_url_requires_http() {
        assert!(validate_url("https://api.hunter.io/v2/email-verifier").is_ok());
        assert!(validate_url("not a url").is_err());
        assert!(matches!(
            validate_url("ftp://example.com/file"),
            Err(InvalidInputError::Url { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_waits_for_duration() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(3)).await;
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }
}
