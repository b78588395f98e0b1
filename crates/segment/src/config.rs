//! Client configuration.

use std::time::Duration;

/// Default API host.
pub const DEFAULT_API_HOST: &str = "https://api.segment.io";

/// Default API version.
pub const DEFAULT_VERSION: &str = "v1";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Segment client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) write_key: String,
    pub(crate) api_host: String,
    pub(crate) version: String,
    pub(crate) timeout: Duration,
}

impl Config {
    /// Get the source write key.
    pub fn write_key(&self) -> &str {
        &self.write_key
    }

    /// Get the API host.
    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    /// Get the API version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder for the Segment client.
#[derive(Debug)]
pub struct SegmentBuilder {
    write_key: String,
    api_host: Option<String>,
    version: Option<String>,
    timeout: Option<Duration>,
}

impl SegmentBuilder {
    /// Create a new builder with the given write key.
    pub fn new(write_key: impl Into<String>) -> Self {
        Self {
            write_key: write_key.into(),
            api_host: None,
            version: None,
            timeout: None,
        }
    }

    /// Set the API host, e.g. `https://events.eu1.segmentapis.com`.
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = Some(host.into());
        self
    }

    /// Set the API version path segment.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    pub(crate) fn build_config(self) -> Result<Config, crate::Error> {
        if self.write_key.is_empty() {
            return Err(crate::Error::Config("write_key cannot be empty".into()));
        }

        let api_host = self
            .api_host
            .map(|host| host.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_HOST.into());

        Ok(Config {
            write_key: self.write_key,
            api_host,
            version: self.version.unwrap_or_else(|| DEFAULT_VERSION.into()),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}
