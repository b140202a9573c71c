//! The hook the session manager uses to validate a token.
//!
//! A token only means something once the backend agrees it belongs to a
//! user. [`ProfileSource`] is that check: give it a token, get back the
//! [`User`] or an [`ApiError`].
//!
//! # Why a trait?
//!
//! In production the source is the [`ApiClient`] (`GET /auth/me`). In
//! tests it is a map from token to user, with no network involved. The
//! session manager doesn't know or care which one it has.

use fluxo_client::ApiClient;
use fluxo_protocol::{ApiError, User};

/// Resolves a bearer token to the user it belongs to.
///
/// # Trait bounds
///
/// - `Send + Sync` → the manager can be shared across tasks behind an `Arc`.
/// - `'static` → the source lives as long as the manager.
pub trait ProfileSource: Send + Sync + 'static {
    /// Fetches the profile of the user owning `token`.
    ///
    /// # Returns
    /// - `Ok(User)`: the token is valid
    /// - `Err(ApiError)`: rejected, expired, or the backend is unreachable
    fn fetch_profile(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<User, ApiError>> + Send;
}

impl ProfileSource for ApiClient {
    async fn fetch_profile(&self, token: &str) -> Result<User, ApiError> {
        self.current_user(token).await
    }
}
