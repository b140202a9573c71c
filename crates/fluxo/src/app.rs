//! `Fluxo` builder and front-end operations.
//!
//! This ties the layers together: forms → gateway → session. Each
//! operation validates locally first, then makes at most one backend
//! call (plus a profile refresh where the session changes).

use std::sync::Arc;
use std::time::Duration;

use fluxo_client::{ApiClient, ClientConfig};
use fluxo_flows::{
    ConfirmationFlow, LoginForm, PasswordChangeForm, PromptForm, RegisterForm,
    ResendPolicy,
};
use fluxo_protocol::{
    ConfirmEmailResponse, HealthStatus, HistoryQuery, MessageResponse,
    PromptRecord, StyleCatalog, UsageLimits, User,
};
use fluxo_session::{
    FileTokenStore, Session, SessionManager, SessionStatus, TokenStore,
};
use tokio::sync::watch;

use crate::FluxoError;

/// Builder for configuring and starting a [`Fluxo`] client.
///
/// # Example
///
/// ```rust,ignore
/// let app = Fluxo::builder()
///     .base_url("https://api.fluxo.example")
///     .build(FileTokenStore::default())
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct FluxoBuilder {
    config: ClientConfig,
    resend_policy: ResendPolicy,
}

impl FluxoBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder whose gateway settings come from `FLUXO_API_URL` and
    /// `FLUXO_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, FluxoError> {
        Ok(Self::new().config(ClientConfig::from_env()?))
    }

    /// Replaces the whole gateway configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Limits applied to every confirmation flow started by
    /// [`Fluxo::register`].
    pub fn resend_policy(mut self, policy: ResendPolicy) -> Self {
        self.resend_policy = policy;
        self
    }

    /// Builds the client and restores the persisted session from `store`.
    ///
    /// Returns once the session has settled to authenticated or
    /// anonymous. Fails only if the gateway configuration is invalid.
    pub async fn build<S: TokenStore>(
        self,
        store: S,
    ) -> Result<Fluxo<S>, FluxoError> {
        let api = ApiClient::new(&self.config)?;
        let session =
            Arc::new(SessionManager::start(api.clone(), store).await);

        tracing::info!(
            base_url = api.base_url(),
            status = %session.status(),
            "fluxo client ready"
        );

        Ok(Fluxo {
            api,
            session,
            resend_policy: self.resend_policy,
        })
    }
}

/// A running Fluxo client.
///
/// Cheap to share: clone the [`session_manager`](Self::session_manager)
/// handle or [`subscribe`](Self::subscribe) to follow the session from
/// other tasks.
pub struct Fluxo<S: TokenStore = FileTokenStore> {
    api: ApiClient,
    session: Arc<SessionManager<ApiClient, S>>,
    resend_policy: ResendPolicy,
}

impl Fluxo {
    /// Creates a new builder.
    pub fn builder() -> FluxoBuilder {
        FluxoBuilder::new()
    }
}

impl<S: TokenStore> Fluxo<S> {
    // -----------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------

    /// Exchanges credentials for a token and loads the profile.
    ///
    /// Wrong credentials fail with the backend's message. If the token is
    /// issued but the profile can't be fetched the session stays
    /// anonymous and [`FluxoError::ProfileUnavailable`] is returned.
    pub async fn sign_in(&self, form: &LoginForm) -> Result<User, FluxoError> {
        let credentials = form.validate()?;
        let auth = self.api.login(&credentials).await?;

        match self.session.login(auth.access_token).await {
            SessionStatus::Authenticated => {
                self.session.user().ok_or(FluxoError::ProfileUnavailable)
            }
            _ => Err(FluxoError::ProfileUnavailable),
        }
    }

    /// Forgets the session locally. The backend isn't told.
    pub fn sign_out(&self) {
        self.session.logout();
    }

    /// Re-fetches the profile of the signed-in user.
    pub async fn refresh(&self) -> SessionStatus {
        self.session.refresh_user().await
    }

    /// A snapshot of the current session.
    pub fn session(&self) -> Session {
        self.session.snapshot()
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<User> {
        self.session.user()
    }

    /// A receiver woken on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    pub fn session_manager(&self) -> &Arc<SessionManager<ApiClient, S>> {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // -----------------------------------------------------------------
    // Sign-up
    // -----------------------------------------------------------------

    /// Creates an account and starts its email confirmation.
    ///
    /// The new user is not signed in; confirm the address, then call
    /// [`sign_in`](Self::sign_in) with the same credentials.
    pub async fn register(
        &self,
        form: &RegisterForm,
    ) -> Result<ConfirmationFlow, FluxoError> {
        let request = form.validate()?;
        let user = self.api.register(&request).await?;
        tracing::info!(user_id = %user.id, "account registered");

        Ok(ConfirmationFlow::with_policy(user.email, self.resend_policy))
    }

    /// Submits the emailed code for `flow`.
    pub async fn confirm(
        &self,
        flow: &mut ConfirmationFlow,
        code: &str,
    ) -> Result<ConfirmEmailResponse, FluxoError> {
        Ok(flow.confirm(&self.api, code).await?)
    }

    /// Asks for a new code, subject to the flow's resend limits.
    pub async fn resend(
        &self,
        flow: &mut ConfirmationFlow,
    ) -> Result<MessageResponse, FluxoError> {
        Ok(flow.resend(&self.api).await?)
    }

    /// Changes the password, then signs out so the user logs in again
    /// with the new one.
    pub async fn change_password(
        &self,
        form: &PasswordChangeForm,
    ) -> Result<MessageResponse, FluxoError> {
        let request = form.validate()?;
        let token = self.token()?;

        let response = self.api.change_password(&request, &token).await?;
        tracing::info!("password changed, signing out");
        self.session.logout();
        Ok(response)
    }

    // -----------------------------------------------------------------
    // Prompts
    // -----------------------------------------------------------------

    /// Generates a prompt and refreshes the profile so the quota shown
    /// for the user is current.
    pub async fn generate(
        &self,
        form: &PromptForm,
    ) -> Result<PromptRecord, FluxoError> {
        let token = self.token()?;
        let request = form.validate()?;

        let record = self.api.create_prompt(&request, &token).await?;
        tracing::debug!(prompt_id = record.id, "prompt generated");
        self.session.refresh_user().await;
        Ok(record)
    }

    pub async fn history(
        &self,
        query: HistoryQuery,
    ) -> Result<Vec<PromptRecord>, FluxoError> {
        let token = self.token()?;
        Ok(self.api.prompt_history(query, &token).await?)
    }

    pub async fn styles(&self) -> Result<StyleCatalog, FluxoError> {
        let token = self.token()?;
        Ok(self.api.prompt_styles(&token).await?)
    }

    pub async fn limits(&self) -> Result<UsageLimits, FluxoError> {
        let token = self.token()?;
        Ok(self.api.usage_limits(&token).await?)
    }

    /// Backend liveness. Works signed out.
    pub async fn health(&self) -> Result<HealthStatus, FluxoError> {
        Ok(self.api.health().await?)
    }

    fn token(&self) -> Result<String, FluxoError> {
        self.session.token().ok_or(FluxoError::NotSignedIn)
    }
}

#[cfg(test)]
mod tests {
    use fluxo_flows::FormError;
    use fluxo_session::MemoryTokenStore;

    use super::*;

    /// A client pointed at a port nothing listens on: any request that
    /// does go out fails as a transport error, which the tests rule out.
    async fn offline() -> Fluxo<MemoryTokenStore> {
        Fluxo::builder()
            .base_url("http://127.0.0.1:9")
            .build(MemoryTokenStore::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_build_without_token_is_anonymous() {
        let app = offline().await;
        assert_eq!(app.session().status(), SessionStatus::Anonymous);
        assert!(app.user().is_none());
    }

    #[tokio::test]
    async fn test_build_rejects_bad_base_url() {
        let result = Fluxo::builder()
            .base_url("ftp://example.com")
            .build(MemoryTokenStore::new())
            .await;
        assert!(matches!(result, Err(FluxoError::Client(_))));
    }

    #[tokio::test]
    async fn test_authenticated_ops_require_session() {
        let app = offline().await;

        let form = PromptForm::new("hello", fluxo_protocol::StyleId(1));
        assert!(matches!(
            app.generate(&form).await,
            Err(FluxoError::NotSignedIn)
        ));
        assert!(matches!(
            app.history(HistoryQuery::default()).await,
            Err(FluxoError::NotSignedIn)
        ));
        assert!(matches!(app.styles().await, Err(FluxoError::NotSignedIn)));
        assert!(matches!(app.limits().await, Err(FluxoError::NotSignedIn)));
    }

    #[tokio::test]
    async fn test_invalid_forms_fail_before_network() {
        let app = offline().await;

        let err = app
            .sign_in(&LoginForm::new("not-an-email", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FluxoError::Form(FormError { field: "email", .. })
        ));

        let err = app
            .register(&RegisterForm::new("ada@example.com", "secret1", "A"))
            .await
            .unwrap_err();
        assert!(err.is_local());

        let err = app
            .change_password(&PasswordChangeForm::new("old", "short", "short"))
            .await
            .unwrap_err();
        assert!(err.is_local());
    }

    #[tokio::test]
    async fn test_change_password_valid_form_requires_session() {
        let app = offline().await;
        let form = PasswordChangeForm::new("oldpass", "newpassword", "newpassword");

        let err = app.change_password(&form).await.unwrap_err();

        assert!(matches!(err, FluxoError::NotSignedIn));
    }
}
