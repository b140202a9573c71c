//! The typed API client.

use std::sync::Arc;

use fluxo_protocol::{
    ApiError, AuthResponse, ChangePasswordRequest, ConfirmEmailRequest,
    ConfirmEmailResponse, CreatePromptRequest, HealthStatus, HistoryQuery,
    LoginRequest, MessageResponse, PromptRecord, RegisterRequest,
    ResendConfirmationRequest, StyleCatalog, UsageLimits, User,
    normalize_error,
};
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{ClientConfig, ClientError};

/// HTTP client for the Fluxo backend.
///
/// Cheap to clone: the connection pool and the base URL are shared
/// behind `Arc`s, so every clone talks through the same pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
}

impl ApiClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    /// - [`ClientError::InvalidBaseUrl`]: not an absolute http(s) URL
    /// - [`ClientError::Build`]: the HTTP stack failed to initialize
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let parsed = reqwest::Url::parse(&config.base_url).map_err(|e| {
            ClientError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: e.to_string(),
            }
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("fluxo/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
        })
    }

    /// The backend root this client talks to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one request and decodes the JSON response.
    ///
    /// This is the contract every endpoint method goes through:
    ///
    /// 1. `Content-Type: application/json` always, plus
    ///    `Authorization: Bearer <token>` when a token is given.
    /// 2. No response at all → `ApiError` "unexpected error".
    /// 3. Non-2xx → [`normalize_error`] on the body; a body that can't
    ///    be read counts as empty.
    /// 4. 2xx → the body parsed as `T`; a body that doesn't fit `T` is
    ///    also reported as "unexpected error".
    #[tracing::instrument(
        level = "debug",
        skip(self, body, token),
        fields(authenticated = token.is_some())
    )]
    pub async fn request<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut builder = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "request failed before a response");
            ApiError::unexpected(e)
        })?;

        let status = response.status();
        let body = response.bytes().await;

        if !status.is_success() {
            // An unreadable error body is treated like an empty one.
            let bytes = body.unwrap_or_else(|e| {
                tracing::debug!(%status, error = %e, "failed to read error body");
                Default::default()
            });
            let err = normalize_error(status.as_u16(), &bytes);
            tracing::debug!(%status, message = %err.message, "backend rejected request");
            return Err(err);
        }

        let bytes = body.map_err(|e| {
            tracing::warn!(%status, error = %e, "failed to read response body");
            ApiError::unexpected(e).with_status(status.as_u16())
        })?;

        tracing::debug!(%status, "request succeeded");
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(%status, error = %e, "unexpected response shape");
            ApiError::unexpected(e).with_status(status.as_u16())
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::GET, endpoint, None, token).await
    }

    async fn post<T, B>(
        &self,
        endpoint: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, endpoint, Some(body), token).await
    }

    // -----------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------

    /// Exchanges credentials for an access token.
    pub async fn login(
        &self,
        credentials: &LoginRequest,
    ) -> Result<AuthResponse, ApiError> {
        self.post("/auth/login", credentials, None).await
    }

    /// Creates an account. The new user starts unconfirmed.
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<User, ApiError> {
        self.post("/auth/register", request, None).await
    }

    /// Submits the emailed confirmation code.
    pub async fn confirm_email(
        &self,
        request: &ConfirmEmailRequest,
    ) -> Result<ConfirmEmailResponse, ApiError> {
        self.post("/auth/confirm-email", request, None).await
    }

    /// Asks the backend to email a fresh confirmation code.
    pub async fn resend_confirmation(
        &self,
        request: &ResendConfirmationRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.post("/auth/resend-confirmation", request, None).await
    }

    /// Changes the password of the user owning `token`.
    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
        token: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.post("/auth/change-password", request, Some(token)).await
    }

    /// Fetches the profile of the user owning `token`.
    pub async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        self.get("/auth/me", Some(token)).await
    }

    // -----------------------------------------------------------------
    // Prompts
    // -----------------------------------------------------------------

    /// Submits text for generation in the given style.
    pub async fn create_prompt(
        &self,
        request: &CreatePromptRequest,
        token: &str,
    ) -> Result<PromptRecord, ApiError> {
        self.post("/prompts/create", request, Some(token)).await
    }

    /// Past generations, newest first.
    pub async fn prompt_history(
        &self,
        query: HistoryQuery,
        token: &str,
    ) -> Result<Vec<PromptRecord>, ApiError> {
        let endpoint = format!(
            "/prompts/history?limit={}&offset={}",
            query.limit, query.offset
        );
        self.get(&endpoint, Some(token)).await
    }

    /// The styles the backend currently offers.
    pub async fn prompt_styles(
        &self,
        token: &str,
    ) -> Result<StyleCatalog, ApiError> {
        self.get("/prompts/styles", Some(token)).await
    }

    /// Today's quota usage.
    pub async fn usage_limits(
        &self,
        token: &str,
    ) -> Result<UsageLimits, ApiError> {
        self.get("/prompts/limits", Some(token)).await
    }

    // -----------------------------------------------------------------
    // Misc
    // -----------------------------------------------------------------

    /// Liveness probe. Needs no token.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get("/health", None).await
    }
}
