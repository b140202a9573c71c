//! Error types for the flow layer.

use std::time::Duration;

use fluxo_protocol::ApiError;

/// Shown when the resend budget of a confirmation flow is used up.
pub const RESEND_LIMIT_MESSAGE: &str =
    "resend limit reached (3 per confirmation), please try again later";

/// Errors raised by the confirmation flow.
///
/// Everything except [`Api`](FlowError::Api) is decided locally, before
/// any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// The code isn't exactly six ASCII digits.
    #[error("the code must be exactly 6 digits")]
    InvalidCode,

    /// Every allowed resend has been used.
    #[error("{}", RESEND_LIMIT_MESSAGE)]
    ResendLimitReached,

    /// The previous resend was too recent.
    #[error(
        "please wait {}s before requesting another code",
        .remaining.as_secs() + u64::from(.remaining.subsec_nanos() > 0)
    )]
    CooldownActive { remaining: Duration },

    /// The address is already confirmed; the flow is finished.
    #[error("email is already confirmed")]
    AlreadyConfirmed,

    /// The backend refused the request.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A form field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FormError {
    /// Which field, e.g. `"email"` or `"new_password"`.
    pub field: &'static str,
    pub message: String,
}

impl FormError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
