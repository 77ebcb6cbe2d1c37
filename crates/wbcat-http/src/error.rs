//! HTTP layer errors

/// Errors building the HTTP transport
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Header value contains characters HTTP does not allow
    #[error("invalid {name} header value: {value:?}")]
    InvalidHeader {
        /// Header name
        name: &'static str,
        /// Rejected value
        value: String,
    },

    /// reqwest refused the client configuration
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
