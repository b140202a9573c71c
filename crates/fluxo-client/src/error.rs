/// Errors that can occur while constructing an [`ApiClient`](crate::ApiClient).
///
/// Request failures are never reported through this type; they are
/// [`ApiError`](fluxo_protocol::ApiError)s.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The configured base URL isn't an absolute http(s) URL.
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The underlying HTTP client could not be built (TLS backend etc.).
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),

    /// An environment variable held a value that couldn't be parsed.
    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}
