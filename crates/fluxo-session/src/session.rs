//! Session types: the client's belief about who is logged in.
//!
//! A session records:
//! - WHETHER we know yet (`Loading` until the stored token is checked)
//! - WHO the user is (a [`User`] snapshot from the backend)
//! - HOW to prove it (the bearer token)

use std::fmt;

use fluxo_protocol::User;

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
///
/// ```text
///   Loading ──(stored token valid)──→ Authenticated ──(logout / fetch fails)──→ Anonymous
///      │                                    ↑                                      │
///      └──(no token / token rejected)──→ Anonymous ───────────(login)──────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// The persisted token hasn't been checked yet.
    Loading,
    /// A token is held and the backend returned a profile for it.
    Authenticated,
    /// Nobody is logged in.
    Anonymous,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Anonymous => write!(f, "anonymous"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One immutable snapshot of the session.
///
/// The token and the user live in the same enum variant, so it is
/// impossible to build a `Session` that holds one without the other:
/// `status() == Authenticated` iff both `token()` and `user()` are `Some`.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    inner: Inner,
}

#[derive(Clone, PartialEq, Eq)]
enum Inner {
    Loading,
    Anonymous,
    Authenticated { token: String, user: User },
}

impl Session {
    /// The state before the persisted token has been checked.
    pub fn loading() -> Self {
        Self {
            inner: Inner::Loading,
        }
    }

    /// Nobody logged in.
    pub fn anonymous() -> Self {
        Self {
            inner: Inner::Anonymous,
        }
    }

    /// `user` is logged in with `token`.
    pub fn authenticated(token: impl Into<String>, user: User) -> Self {
        Self {
            inner: Inner::Authenticated {
                token: token.into(),
                user,
            },
        }
    }

    pub fn status(&self) -> SessionStatus {
        match self.inner {
            Inner::Loading => SessionStatus::Loading,
            Inner::Anonymous => SessionStatus::Anonymous,
            Inner::Authenticated { .. } => SessionStatus::Authenticated,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match &self.inner {
            Inner::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match &self.inner {
            Inner::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.inner, Inner::Authenticated { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.inner, Inner::Loading)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::loading()
    }
}

// The token never appears in `{:?}` output, so sessions can be logged.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Session");
        s.field("status", &self.status());
        if let Some(user) = self.user() {
            s.field("user_id", &user.id).field("email", &user.email);
        }
        s.finish()
    }
}
