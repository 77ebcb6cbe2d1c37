//! Shared HTTP client construction

use crate::error::HttpError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Browser-like agent string the storefront expects
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 Gecko/20100101 Firefox/62.0";

/// Default `Accept` header
pub const DEFAULT_ACCEPT: &str = "*/*";

/// HTTP session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// `User-Agent` header
    pub user_agent: String,
    /// `Accept` header
    pub accept: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl HttpConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With user agent
    #[inline]
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Build a client carrying the configured headers
    ///
    /// # Errors
    /// - `HttpError::InvalidHeader` if a header value is not valid
    /// - `HttpError::Client` if the client cannot be constructed
    pub fn build_client(&self) -> Result<Client, HttpError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value("accept", &self.accept)?);
        headers.insert(USER_AGENT, header_value("user-agent", &self.user_agent)?);

        Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .build()
            .map_err(HttpError::Client)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, HttpError> {
    HeaderValue::from_str(value).map_err(|_| HttpError::InvalidHeader {
        name,
        value: value.to_string(),
    })
}
