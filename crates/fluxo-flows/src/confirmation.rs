//! Email confirmation after sign-up.
//!
//! A new account has to prove it owns its address by entering the
//! six-digit code the backend emailed. The user may ask for a fresh code,
//! but only a few times and not in quick succession. Those limits are
//! enforced here, before any request goes out.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use fluxo_client::ApiClient;
use fluxo_protocol::{
    ApiError, ConfirmEmailRequest, ConfirmEmailResponse, MessageResponse,
    ResendConfirmationRequest,
};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::FlowError;

/// Number of digits in a confirmation code.
pub const CODE_LENGTH: usize = 6;

// ---------------------------------------------------------------------------
// ResendPolicy
// ---------------------------------------------------------------------------

/// Limits on "send me a new code".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResendPolicy {
    /// Resends allowed per flow. The flow has to be restarted (by a new
    /// registration) to get more.
    pub max_resends: u32,

    /// Minimum wait after a successful resend before the next one.
    pub cooldown: Duration,
}

impl Default for ResendPolicy {
    fn default() -> Self {
        Self {
            max_resends: 3,
            cooldown: Duration::from_secs(60),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfirmationState
// ---------------------------------------------------------------------------

/// ```text
/// AwaitingCode ──(correct code)──→ Confirmed
///      ↑   │
///      └───┘ (wrong or expired code)
/// ```
///
/// `Confirmed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationState {
    AwaitingCode,
    Confirmed,
}

impl ConfirmationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

impl fmt::Display for ConfirmationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingCode => write!(f, "awaiting code"),
            Self::Confirmed => write!(f, "confirmed"),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfirmationGateway
// ---------------------------------------------------------------------------

/// The two backend calls the flow needs.
///
/// Implemented for [`ApiClient`]; tests plug in a counting fake.
pub trait ConfirmationGateway: Send + Sync {
    fn confirm_email(
        &self,
        request: &ConfirmEmailRequest,
    ) -> impl Future<Output = Result<ConfirmEmailResponse, ApiError>> + Send;

    fn resend_confirmation(
        &self,
        request: &ResendConfirmationRequest,
    ) -> impl Future<Output = Result<MessageResponse, ApiError>> + Send;
}

impl ConfirmationGateway for ApiClient {
    async fn confirm_email(
        &self,
        request: &ConfirmEmailRequest,
    ) -> Result<ConfirmEmailResponse, ApiError> {
        ApiClient::confirm_email(self, request).await
    }

    async fn resend_confirmation(
        &self,
        request: &ResendConfirmationRequest,
    ) -> Result<MessageResponse, ApiError> {
        ApiClient::resend_confirmation(self, request).await
    }
}

// ---------------------------------------------------------------------------
// ConfirmationFlow
// ---------------------------------------------------------------------------

/// One confirmation session for one address.
///
/// The resend counter and cooldown live here and nowhere else, so they
/// reset exactly when a new flow is created or [`restart`](Self::restart)
/// is called.
#[derive(Debug, Clone)]
pub struct ConfirmationFlow {
    email: String,
    policy: ResendPolicy,
    state: ConfirmationState,
    resends: u32,
    cooldown_until: Option<Instant>,
}

impl ConfirmationFlow {
    /// Starts a flow for `email` with the default [`ResendPolicy`].
    pub fn new(email: impl Into<String>) -> Self {
        Self::with_policy(email, ResendPolicy::default())
    }

    pub fn with_policy(email: impl Into<String>, policy: ResendPolicy) -> Self {
        Self {
            email: email.into(),
            policy,
            state: ConfirmationState::AwaitingCode,
            resends: 0,
            cooldown_until: None,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn state(&self) -> ConfirmationState {
        self.state
    }

    pub fn policy(&self) -> ResendPolicy {
        self.policy
    }

    pub fn is_confirmed(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn resends_used(&self) -> u32 {
        self.resends
    }

    pub fn resends_left(&self) -> u32 {
        self.policy.max_resends.saturating_sub(self.resends)
    }

    /// Time until the next resend is allowed, or `None` if it is allowed
    /// now (as far as the cooldown is concerned).
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        let until = self.cooldown_until?;
        let remaining = until.saturating_duration_since(Instant::now());
        (!remaining.is_zero()).then_some(remaining)
    }

    /// Begins again for a (possibly different) address, as after a new
    /// registration. Resets the state, the counter and the cooldown.
    pub fn restart(&mut self, email: impl Into<String>) {
        *self = Self::with_policy(email, self.policy);
    }

    /// Checks that `code` is exactly [`CODE_LENGTH`] ASCII digits.
    pub fn check_code(code: &str) -> Result<(), FlowError> {
        if code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
        {
            Ok(())
        } else {
            Err(FlowError::InvalidCode)
        }
    }

    /// Whether a resend would be allowed right now, and if not, why.
    ///
    /// The count limit is checked before the cooldown, so a spent budget
    /// reports the fixed limit message even while a cooldown is running.
    pub fn check_resend(&self) -> Result<(), FlowError> {
        if self.is_confirmed() {
            return Err(FlowError::AlreadyConfirmed);
        }
        if self.resends >= self.policy.max_resends {
            return Err(FlowError::ResendLimitReached);
        }
        if let Some(remaining) = self.cooldown_remaining() {
            return Err(FlowError::CooldownActive { remaining });
        }
        Ok(())
    }

    /// Submits `code` (surrounding whitespace ignored).
    ///
    /// A malformed code is rejected without a request. On success the
    /// flow becomes `Confirmed`; on a backend error it stays
    /// `AwaitingCode` and the error is returned.
    #[tracing::instrument(skip_all, fields(email = %self.email))]
    pub async fn confirm<G: ConfirmationGateway>(
        &mut self,
        gateway: &G,
        code: &str,
    ) -> Result<ConfirmEmailResponse, FlowError> {
        if self.is_confirmed() {
            return Err(FlowError::AlreadyConfirmed);
        }
        let code = code.trim();
        Self::check_code(code)?;

        let request = ConfirmEmailRequest {
            email: self.email.clone(),
            code: code.to_string(),
        };
        match gateway.confirm_email(&request).await {
            Ok(response) => {
                self.state = ConfirmationState::Confirmed;
                tracing::info!("email confirmed");
                Ok(response)
            }
            Err(e) => {
                tracing::debug!(error = %e, "confirmation rejected");
                Err(e.into())
            }
        }
    }

    /// Asks the backend to send a new code.
    ///
    /// Only a successful resend counts against the budget and starts the
    /// cooldown.
    #[tracing::instrument(skip_all, fields(email = %self.email))]
    pub async fn resend<G: ConfirmationGateway>(
        &mut self,
        gateway: &G,
    ) -> Result<MessageResponse, FlowError> {
        if let Err(e) = self.check_resend() {
            tracing::debug!(error = %e, "resend refused locally");
            return Err(e);
        }

        let request = ResendConfirmationRequest {
            email: self.email.clone(),
        };
        let response = gateway.resend_confirmation(&request).await?;

        self.resends += 1;
        self.cooldown_until = Some(Instant::now() + self.policy.cooldown);
        tracing::info!(
            used = self.resends,
            max = self.policy.max_resends,
            "confirmation code resent"
        );
        Ok(response)
    }
}

// =========================================================================
// Tests
// =========================================================================
