//! The error type shared by every layer that talks to the backend.
//!
//! Each crate in Fluxo defines its own error type. `ApiError` is the one
//! that crosses the wire boundary. Whatever went wrong (the network, a
//! 422 with field errors, a 500 with an HTML body) ends up as a single
//! human-readable message that a form can show inline.

use std::fmt;

/// Message used when no response was received, or the response could
/// not be read at all.
pub const UNEXPECTED_ERROR: &str = "unexpected error";

/// A normalized backend failure.
///
/// `#[derive(thiserror::Error)]` implements `std::error::Error` for us.
/// The `#[error("{message}")]` attribute makes `Display` print exactly
/// the message, so front ends can call `err.to_string()` and show it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    /// The message shown to the user.
    pub message: String,

    /// Extra context that is useful in logs but not in the UI: the
    /// transport error text, or the raw structured `detail` body.
    pub detail: Option<String>,

    /// HTTP status code, if a response was received at all.
    pub status: Option<u16>,
}

impl ApiError {
    /// Creates an error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
            status: None,
        }
    }

    /// The error for a request that never produced a usable response.
    ///
    /// `cause` is kept in `detail` for logging.
    pub fn unexpected(cause: impl fmt::Display) -> Self {
        Self {
            message: UNEXPECTED_ERROR.to_string(),
            detail: Some(cause.to_string()),
            status: None,
        }
    }

    /// Attaches a detail string.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attaches the HTTP status the error came from.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns `true` for 401 and 403 responses.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, Some(401 | 403))
    }

    /// Returns `true` for 422 responses.
    pub fn is_validation(&self) -> bool {
        self.status == Some(422)
    }

    /// Returns `true` when no response was received.
    pub fn is_transport(&self) -> bool {
        self.status.is_none() && self.message == UNEXPECTED_ERROR
    }
}
