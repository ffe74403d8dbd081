//! Email verification (hunter.io) and person enrichment (clearbit).

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};
use url::Url;

use crate::error::{BadResponseError, Error, InvalidInputError};
use crate::http::{Call, CallOutcome, RetryingRequester};

/// hunter.io email verifier endpoint.
pub const HUNTER_VERIFIER_URL: &str = "https://api.hunter.io/v2/email-verifier";

/// clearbit person lookup endpoint; the email is appended as a path segment.
pub const CLEARBIT_ENRICHMENT_URL: &str = "https://person.clearbit.com/v1/people/email";

/// The verifier is slow for mail servers that greylist.
const VERIFIER_TIMEOUT: Duration = Duration::from_secs(20);

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").expect("valid email regex")
});

/// Cheap syntactic check, run before spending an API call.
pub fn is_well_formed_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Deserialize)]
struct VerifierResponse {
    data: VerifierData,
}

#[derive(Debug, Deserialize)]
struct VerifierData {
    regexp: bool,
    smtp_server: bool,
    smtp_check: bool,
}

/// Decides whether an email address is deliverable.
#[derive(Debug, Clone)]
pub struct EmailVerifier {
    requester: RetryingRequester,
    api_key: Option<String>,
    endpoint: String,
}

impl EmailVerifier {
    /// Without an API key every well-formed address is accepted.
    pub fn new(requester: RetryingRequester, api_key: Option<String>) -> Self {
        Self {
            requester,
            api_key,
            endpoint: HUNTER_VERIFIER_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Returns true if the address looks deliverable.
    ///
    /// Malformed addresses are rejected without a network call (the API
    /// answers 400 for them anyway). An API call that gives up counts as
    /// "not verified".
    ///
    /// # Errors
    ///
    /// [`Error::BadResponse`] if the API answers 200 without the verdict fields.
    #[instrument(skip(self))]
    pub async fn verify(&self, email: &str) -> Result<bool, Error> {
        if !is_well_formed_email(email) {
            info!("Address does not look like an email");
            return Ok(false);
        }
        let Some(api_key) = &self.api_key else {
            warn!("No verifier API key configured, accepting address unchecked");
            return Ok(true);
        };

        let call = Call::get(&self.endpoint)
            .query("email", email)
            .query("api_key", api_key)
            .timeout(VERIFIER_TIMEOUT);

        match self.requester.execute(&call).await? {
            CallOutcome::Success(body) => {
                let response: VerifierResponse =
                    serde_json::from_value(body).map_err(|e| BadResponseError::Decode {
                        url: self.endpoint.clone(),
                        message: e.to_string(),
                    })?;
                let data = response.data;
                Ok(data.regexp && data.smtp_server && data.smtp_check)
            }
            outcome => {
                info!(?outcome, "No verdict from verifier");
                Ok(false)
            }
        }
    }
}

/// Looks up public profile data for an email address.
#[derive(Debug, Clone)]
pub struct EmailEnricher {
    requester: RetryingRequester,
    api_key: Option<String>,
    endpoint: String,
}

impl EmailEnricher {
    /// Without an API key every lookup yields an empty object.
    pub fn new(requester: RetryingRequester, api_key: Option<String>) -> Self {
        Self {
            requester,
            api_key,
            endpoint: CLEARBIT_ENRICHMENT_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Fetch profile data, or an empty object when none could be obtained.
    #[instrument(skip(self))]
    pub async fn enrich(&self, email: &str) -> Result<Value, Error> {
        let Some(api_key) = &self.api_key else {
            return Ok(Value::Object(Map::new()));
        };

        let call = Call::get(self.person_url(email)?).bearer_auth(api_key)?;

        match self.requester.execute(&call).await? {
            CallOutcome::Success(body) => Ok(body),
            outcome => {
                info!(?outcome, "No enrichment data");
                Ok(Value::Object(Map::new()))
            }
        }
    }

    fn person_url(&self, email: &str) -> Result<String, Error> {
        let invalid = |reason: &str| InvalidInputError::Url {
            value: self.endpoint.clone(),
            reason: reason.to_string(),
        };
        let mut url = Url::parse(&self.endpoint).map_err(|e| invalid(&e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL"))?
            .pop_if_empty()
            .push(email);
        Ok(url.into())
    }
}
