//! Client configuration.

use std::time::Duration;

use crate::ClientError;

/// Where the backend lives when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Per-request timeout when nothing else is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_BASE_URL: &str = "FLUXO_API_URL";
const ENV_TIMEOUT: &str = "FLUXO_TIMEOUT_SECS";

/// Settings for an [`ApiClient`](crate::ApiClient).
///
/// Create one with `ClientConfig::default()` and override what you need,
/// or read it from the environment with [`ClientConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend root, e.g. `https://api.example.com`. Endpoint paths are
    /// appended to it, so a trailing slash is ignored.
    pub base_url: String,

    /// Upper bound on a single request, connect through body.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// A default config pointing at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reads `FLUXO_API_URL` and `FLUXO_TIMEOUT_SECS`, falling back to
    /// the defaults for unset variables.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidEnv`] if the timeout isn't a number.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but with a custom variable
    /// source, so callers (and tests) don't have to touch the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty())
        {
            config.base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_TIMEOUT) {
            let secs: u64 =
                raw.trim().parse().map_err(|_| ClientError::InvalidEnv {
                    name: ENV_TIMEOUT,
                    value: raw.clone(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
