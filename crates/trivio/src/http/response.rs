//! Buffered HTTP responses.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{BadResponseError, Error, ProtocolError, TransportError};

/// A fully read HTTP response.
///
/// The body is buffered as soon as the response arrives, so a response can
/// be inspected more than once and network failures while reading surface
/// together with the request that caused them.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    url: String,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    /// Build a response from parts.
    pub fn new(status: StatusCode, url: impl Into<String>, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            url: url.into(),
            headers,
            body,
        }
    }

    /// Read a reqwest response to the end.
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self, TransportError> {
        let status = response.status();
        let url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        trace!(%status, %url, len = body.len(), "response read");
        Ok(Self::new(status, url, headers, body))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The URL the response was served from.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadResponse`] if the body is not valid JSON for `T`,
    /// including when a required field is missing.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| {
            BadResponseError::Decode {
                url: self.url.clone(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Turn a non-2xx response into [`Error::Protocol`].
    pub fn error_for_status(self) -> Result<Self, Error> {
        if self.status.is_success() {
            Ok(self)
        } else {
            let body = self.text();
            Err(ProtocolError::new(self.status.as_u16(), self.url, &body).into())
        }
    }
}
