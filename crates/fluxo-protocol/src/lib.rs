//! Wire protocol for the Fluxo API.
//!
//! This crate defines the "language" that the client and the backend
//! speak over HTTP:
//!
//! - **Types** ([`User`], [`LoginRequest`], [`PromptRecord`], etc.):
//!   the JSON bodies that travel in requests and responses.
//! - **Errors** ([`ApiError`]): the single shape every backend failure
//!   is turned into.
//! - **Normalization** ([`normalize_error`]): how a failed response
//!   (status code + raw body) becomes an [`ApiError`].
//!
//! # Architecture
//!
//! The protocol layer sits below the HTTP client. It doesn't know about
//! connections or sessions; it only knows what the bodies look like and
//! how to read an error out of them.
//!
//! ```text
//! Client (HTTP) → Protocol (types, ApiError) ← Session (User snapshots)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod error;
mod normalize;
mod timestamp;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::{ApiError, UNEXPECTED_ERROR};
pub use normalize::normalize_error;
pub use types::{
    AuthResponse, ChangePasswordRequest, ConfirmEmailRequest,
    ConfirmEmailResponse, CreatePromptRequest, HealthStatus, HistoryQuery,
    LoginRequest, MessageResponse, PromptRecord, PromptStyle, RegisterRequest,
    ResendConfirmationRequest, StyleCatalog, StyleId, StyleInfo, UsageLimits,
    User, UserId,
};
