//! Unified error type for the Fluxo client core.

use fluxo_client::ClientError;
use fluxo_flows::{FlowError, FormError};
use fluxo_protocol::ApiError;
use fluxo_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// Front ends only need to show `err.to_string()`: backend failures
/// already carry the normalized message.
#[derive(Debug, thiserror::Error)]
pub enum FluxoError {
    /// The backend (or the network) refused the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The gateway could not be configured.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The token store failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Rejected by the confirmation flow before sending.
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// A form field is invalid.
    #[error(transparent)]
    Form(#[from] FormError),

    /// An authenticated operation was attempted without a session.
    #[error("not signed in")]
    NotSignedIn,

    /// The backend issued a token but its profile could not be loaded,
    /// so the session stayed anonymous.
    #[error("signed in, but the profile could not be loaded")]
    ProfileUnavailable,
}

impl FluxoError {
    /// `true` for failures caught locally, before any request was sent.
    pub fn is_local(&self) -> bool {
        match self {
            Self::Form(_) | Self::NotSignedIn => true,
            Self::Flow(e) => !matches!(e, FlowError::Api(_)),
            _ => false,
        }
    }
}
