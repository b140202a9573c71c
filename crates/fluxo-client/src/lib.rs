//! HTTP gateway to the Fluxo backend.
//!
//! [`ApiClient`] is the only way the rest of the workspace reaches the
//! network. Every endpoint is a thin instantiation of one contract:
//!
//! ```text
//! (method, path, optional JSON body, optional bearer token)
//!     → Ok(typed response) | Err(ApiError)
//! ```
//!
//! Failures of every kind (connection refused, 422 field errors, 401,
//! 500 with an HTML page) come back as a single
//! [`ApiError`](fluxo_protocol::ApiError) whose message can be shown as
//! is. See [`fluxo_protocol::normalize_error`] for the rules.

mod client;
mod config;
mod error;

pub use client::ApiClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::ClientError;
pub use reqwest::Method;
