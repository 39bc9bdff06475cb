//! Resilient HTTP fetcher.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use jobsync_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use jobsync_core::{ApiKey, Result, RetryPolicy, SourceConfig};

use crate::endpoints::API_KEY_HEADER;

fn map_reqwest(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: timeout.as_millis() as u64,
        }
        .into()
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
        .into()
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
        .into()
    }
}

/// HTTP GET client with a fixed timeout and bounded retry.
///
/// Every request carries the API key. Transport failures, non-success
/// statuses and undecodable bodies are retried according to the
/// [`RetryPolicy`]; the last error is returned once attempts run out.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    headers: HeaderMap,
    retry: RetryPolicy,
    timeout: Duration,
}

impl Fetcher {
    /// Create a fetcher from the source configuration.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("jobsync/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Http {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            headers: Self::default_headers(&config.api_key)?,
            retry: config.retry,
            timeout: config.timeout,
        })
    }

    /// Returns the retry policy.
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// GET `url` with query `params` and decode the JSON body, retrying on
    /// failure.
    #[instrument(skip(self, params))]
    pub async fn get<Q, R>(&self, url: &str, params: &Q) -> Result<R>
    where
        Q: Serialize + std::fmt::Debug + ?Sized,
        R: DeserializeOwned,
    {
        trace!(?params, "query parameters");
        self.retry
            .run(|attempt| async move {
                debug!(attempt = attempt + 1, "GET");
                self.get_once(url, params).await
            })
            .await
    }

    /// A single GET attempt.
    async fn get_once<Q, R>(&self, url: &str, params: &Q) -> Result<R>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .get(url)
            .query(params)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| map_reqwest(e, self.timeout))?;

        let status = response.status();
        trace!(status = %status, "response");

        if !status.is_success() {
            let message = response.text().await.ok().filter(|t| !t.is_empty());
            return Err(ProtocolError::status(status.as_u16(), message).into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest(e, self.timeout))?;

        serde_json::from_slice(&body).map_err(|e| Error::from(ProtocolError::malformed(e.to_string())))
    }

    fn default_headers(api_key: &ApiKey) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(api_key.expose()).map_err(|e| {
            Error::InvalidInput(InvalidInputError::ApiKey {
                reason: e.to_string(),
            })
        })?;
        headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}
