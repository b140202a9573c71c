//! Request and response bodies for every backend endpoint.
//!
//! These are the structures that get serialized to JSON, sent over HTTP,
//! and deserialized on the other side. Field names match the backend's
//! snake_case JSON exactly, so no `rename` attributes are needed.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A backend user id.
///
/// Newtype wrapper so a user id can't be confused with a prompt id or a
/// style id. `#[serde(transparent)]` keeps it a bare number in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// Identifier of a generation style, as the backend numbers them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct StyleId(pub u32);

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PromptStyle
// ---------------------------------------------------------------------------

/// The four generation modes a user picks from before submitting.
///
/// The backend only knows numeric ids; this enum is the client's typed
/// view of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptStyle {
    Professional,
    Creative,
    Analytical,
    Simple,
}

impl PromptStyle {
    /// Every style, in id order.
    pub const ALL: [PromptStyle; 4] = [
        Self::Professional,
        Self::Creative,
        Self::Analytical,
        Self::Simple,
    ];

    /// The backend id for this style.
    pub fn id(self) -> StyleId {
        match self {
            Self::Professional => StyleId(1),
            Self::Creative => StyleId(2),
            Self::Analytical => StyleId(3),
            Self::Simple => StyleId(4),
        }
    }

    /// Looks up a style by backend id. Unknown ids return `None`.
    pub fn from_id(id: StyleId) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.id() == id)
    }

    /// Lowercase name, also accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Creative => "creative",
            Self::Analytical => "analytical",
            Self::Simple => "simple",
        }
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<PromptStyle> for StyleId {
    fn from(style: PromptStyle) -> Self {
        style.id()
    }
}

/// Parses either a name (`"creative"`, any case) or a numeric id (`"2"`).
impl FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(id) = trimmed.parse::<u32>() {
            return Self::from_id(StyleId(id))
                .ok_or_else(|| format!("unknown style id {id}"));
        }
        Self::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown style \"{trimmed}\""))
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A user profile snapshot as returned by `/auth/me` and `/auth/register`.
///
/// The client never mutates this; a fresh snapshot replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub is_email_confirmed: bool,
    /// Requests allowed per day.
    pub daily_limit: u32,
    /// Requests consumed today.
    pub requests_today: u32,
    #[serde(default)]
    pub last_request_date: Option<NaiveDate>,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Requests left today, for display. Never negative.
    pub fn remaining_requests(&self) -> u32 {
        self.daily_limit.saturating_sub(self.requests_today)
    }

    /// The name to greet the user with: their display name if set,
    /// otherwise their email.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

// ---------------------------------------------------------------------------
// Auth bodies
// ---------------------------------------------------------------------------

/// `POST /auth/login` body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Passwords must never end up in logs via `{:?}`.
impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `POST /auth/login` response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// `POST /auth/register` body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// `POST /auth/confirm-email` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmEmailRequest {
    pub email: String,
    pub code: String,
}

/// `POST /auth/confirm-email` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmEmailResponse {
    pub message: String,
    #[serde(default)]
    pub email_confirmed: bool,
}

/// `POST /auth/resend-confirmation` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResendConfirmationRequest {
    pub email: String,
}

/// `POST /auth/change-password` body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChangePasswordRequest { .. }")
    }
}

/// Plain `{"message": "..."}` response used by several endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Prompt bodies
// ---------------------------------------------------------------------------

/// `POST /prompts/create` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePromptRequest {
    pub original_prompt: String,
    pub style_id: StyleId,
}

/// One generated prompt, as returned by `/prompts/create` and
/// `/prompts/history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub id: u64,
    pub user_id: UserId,
    pub original_prompt: String,
    #[serde(default)]
    pub style_id: Option<StyleId>,
    #[serde(default)]
    pub generated_prompt: Option<String>,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Pagination for `/prompts/history`, sent as a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub limit: u32,
    pub offset: u32,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}

/// Name and description of one style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// `GET /prompts/styles` response: a JSON object keyed by style id.
///
/// ```json
/// {"1": {"name": "Professional", "description": "..."}, "2": {...}}
/// ```
///
/// serde_json parses the string keys into [`StyleId`] for us.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleCatalog(pub BTreeMap<StyleId, StyleInfo>);

impl StyleCatalog {
    pub fn get(&self, id: StyleId) -> Option<&StyleInfo> {
        self.0.get(&id)
    }

    /// Styles in id order.
    pub fn iter(&self) -> impl Iterator<Item = (StyleId, &StyleInfo)> {
        self.0.iter().map(|(id, info)| (*id, info))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `GET /prompts/limits` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLimits {
    pub daily_limit: u32,
    pub requests_today: u32,
    /// Computed by the backend; may be negative if the limit was lowered
    /// after requests were made.
    pub remaining_requests: i64,
    #[serde(default)]
    pub last_request_date: Option<NaiveDate>,
}

/// `GET /health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

// =========================================================================
// Tests
// =========================================================================
