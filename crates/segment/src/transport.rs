//! HTTP transport for posting payloads.

use crate::config::Config;
use crate::Error;
use serde_json::{Map, Value};
use std::future::Future;
use tracing::debug;

/// Status code and body text returned by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Posts a JSON payload to a URL and returns the raw response.
///
/// Implement this to add retries, timeouts or recording around the default
/// [`HttpTransport`].
pub trait Transport: Send + Sync {
    fn post(
        &self,
        url: &str,
        payload: &Map<String, Value>,
    ) -> impl Future<Output = Result<TransportResponse, Error>> + Send;
}

/// reqwest-backed transport authenticating with the source write key.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    write_key: String,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            write_key: config.write_key().to_string(),
        })
    }
}

impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        payload: &Map<String, Value>,
    ) -> Result<TransportResponse, Error> {
        let body = serde_json::to_vec(payload)?;

        debug!(url = %url, bytes = body.len(), "posting payload");

        // Basic auth with the write key as user name and an empty password.
        let response = self
            .client
            .post(url)
            .basic_auth(&self.write_key, Some(""))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }
}
