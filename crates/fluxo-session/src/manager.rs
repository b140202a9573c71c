//! The session manager: the single source of truth for "who is logged in".
//!
//! It is responsible for:
//! - Restoring the session from the persisted token at start-up
//! - Validating a new token on login by fetching the profile
//! - Clearing everything on logout or when the backend rejects the token
//! - Publishing every change to subscribers
//!
//! # Concurrency note
//!
//! All methods take `&self`, so one manager can be shared behind an `Arc`.
//! The current [`Session`] lives in a `tokio::sync::watch` channel: readers
//! borrow the latest snapshot, subscribers are woken on each change, and
//! each write replaces the whole snapshot, so nobody ever sees a token
//! paired with the wrong user.
//!
//! Requests are never cancelled. Instead every login/logout bumps a
//! generation counter, and a profile fetch that finishes after the
//! generation moved on is dropped on arrival. Applying a login result
//! bumps it again, so a refresh started before that login landed is
//! dropped too. A refresh also yields to any login still in flight and
//! to a session that no longer holds the token it checked.
//!
//! Token storage is never touched while the channel's write lock is
//! held. Store writes take their own lock and re-check the generation,
//! so a clear from an outdated fetch can't remove a newer token.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use fluxo_protocol::{ApiError, User};
use tokio::sync::watch;

use crate::{ProfileSource, Session, SessionStatus, TokenStore};

/// Owns the session for one front end.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ [Loading] ──initialize()──→ [Authenticated] or [Anonymous]
///
/// login(token) ──→ persist ──→ fetch profile ──ok──→ [Authenticated]
///                                    └──err──→ forget token ──→ [Anonymous]
///
/// logout() ──→ forget token ──→ [Anonymous]
/// ```
pub struct SessionManager<P, S> {
    /// Validates tokens (normally the `ApiClient`).
    source: P,

    /// Durable home of the token.
    store: S,

    /// Current snapshot + change notification.
    state: watch::Sender<Session>,

    /// Bumped by every login and logout, and again when a login result
    /// is applied. A fetch remembers the value it started under and only
    /// applies its result if it still matches.
    generation: AtomicU64,

    /// Logins whose profile fetch hasn't been applied yet.
    pending_logins: AtomicUsize,

    /// Serializes store writes with the generation bumps that order them.
    store_lock: Mutex<()>,
}

/// Why a profile is being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fetch {
    /// Login or start-up: the result decides the session.
    Establish,
    /// Re-check of the token already held: applies only if nothing
    /// changed meanwhile.
    Refresh,
}

/// Counts a login as pending until dropped, including when the login
/// future itself is dropped mid-fetch.
struct PendingLogin<'a>(&'a AtomicUsize);

impl<'a> PendingLogin<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for PendingLogin<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<P, S> SessionManager<P, S>
where
    P: ProfileSource,
    S: TokenStore,
{
    /// Creates a manager in the `Loading` state without touching storage.
    ///
    /// Call [`initialize`](Self::initialize) afterwards. Splitting the two
    /// lets a front end [`subscribe`](Self::subscribe) first and render a
    /// loading indicator while the stored token is checked.
    pub fn new(source: P, store: S) -> Self {
        let (state, _) = watch::channel(Session::loading());
        Self {
            source,
            store,
            state,
            generation: AtomicU64::new(0),
            pending_logins: AtomicUsize::new(0),
            store_lock: Mutex::new(()),
        }
    }

    /// Creates a manager and restores the persisted session in one step.
    pub async fn start(source: P, store: S) -> Self {
        let manager = Self::new(source, store);
        manager.initialize().await;
        manager
    }

    /// Restores the session from storage.
    ///
    /// With a stored token this performs the same fetch-and-validate step
    /// as [`login`](Self::login); without one the session settles to
    /// `Anonymous` straight away. An unreadable store counts as empty.
    pub async fn initialize(&self) -> SessionStatus {
        let stored = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored token");
                None
            }
        };

        match stored {
            Some(token) => {
                tracing::debug!("validating stored token");
                let generation = self.next_generation();
                self.validate(token, generation, Fetch::Establish).await
            }
            None => {
                self.state.send_replace(Session::anonymous());
                tracing::info!("no stored session");
                SessionStatus::Anonymous
            }
        }
    }

    /// Logs in with a token obtained from `/auth/login`.
    ///
    /// The token is persisted first, then checked against the backend.
    /// If the profile fetch fails the token is forgotten again and the
    /// session ends up `Anonymous`. The failure itself is only logged:
    /// the returned status is the caller's only signal.
    pub async fn login(&self, token: impl Into<String>) -> SessionStatus {
        let token = token.into();
        let _pending = PendingLogin::enter(&self.pending_logins);

        // Bump before persisting so an older in-flight fetch can't
        // clear the token we are about to write.
        let generation = {
            let _store = self.lock_store();
            let generation = self.next_generation();
            if let Err(e) = self.store.save(&token) {
                tracing::warn!(error = %e, "could not persist token");
            }
            generation
        };

        self.validate(token, generation, Fetch::Establish).await
    }

    /// Forgets the token and the user. No backend call.
    pub fn logout(&self) {
        {
            let _store = self.lock_store();
            self.next_generation();
            self.clear_store();
        }
        self.state.send_replace(Session::anonymous());
        tracing::info!("logged out");
    }

    /// Re-fetches the profile for the current token, e.g. after a prompt
    /// was generated and the quota changed.
    ///
    /// Does nothing unless a token is held. Fails the same way as
    /// [`login`](Self::login), except that the result is dropped if a
    /// login or logout overtook it.
    pub async fn refresh_user(&self) -> SessionStatus {
        let generation = self.generation.load(Ordering::SeqCst);
        let Some(token) = self.token() else {
            return self.status();
        };
        self.validate(token, generation, Fetch::Refresh).await
    }

    // -----------------------------------------------------------------
    // Readers
    // -----------------------------------------------------------------

    /// A copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    /// The current bearer token, if authenticated.
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_owned)
    }

    /// The current user snapshot, if authenticated.
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// A receiver woken on every session change.
    ///
    /// `receiver.borrow()` always returns the latest snapshot;
    /// `receiver.changed().await` waits for the next one.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lock_store(&self) -> MutexGuard<'_, ()> {
        self.store_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Caller holds `store_lock`.
    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "could not remove stored token");
        }
    }

    /// Clears the store unless the generation moved past `generation`,
    /// i.e. unless a newer login or logout owns the store now.
    fn forget_token(&self, generation: u64) {
        let _store = self.lock_store();
        if self.generation.load(Ordering::SeqCst) == generation {
            self.clear_store();
        } else {
            tracing::debug!("stored token belongs to a newer session, kept");
        }
    }

    /// Fetches the profile for `token` and applies the outcome, unless a
    /// newer login/logout happened while the request was in flight.
    async fn validate(
        &self,
        token: String,
        generation: u64,
        fetch: Fetch,
    ) -> SessionStatus {
        let result: Result<User, ApiError> =
            self.source.fetch_profile(&token).await;

        let mut applied = None;
        // The checks run under the channel's write lock, so they can't
        // interleave with another writer's publish. No store I/O in here.
        self.state.send_if_modified(|session| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            if fetch == Fetch::Refresh
                && (self.pending_logins.load(Ordering::SeqCst) > 0
                    || session.token() != Some(token.as_str()))
            {
                return false;
            }

            let current = match fetch {
                Fetch::Establish => self.next_generation(),
                Fetch::Refresh => generation,
            };
            match &result {
                Ok(user) => {
                    tracing::info!(user_id = %user.id, "session authenticated");
                    *session = Session::authenticated(token.clone(), user.clone());
                    applied = Some((SessionStatus::Authenticated, current));
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        status = ?e.status,
                        "profile fetch failed, clearing session"
                    );
                    *session = Session::anonymous();
                    applied = Some((SessionStatus::Anonymous, current));
                }
            }
            true
        });

        match applied {
            Some((SessionStatus::Anonymous, current)) => {
                self.forget_token(current);
                SessionStatus::Anonymous
            }
            Some((status, _)) => status,
            None => {
                tracing::debug!("profile fetch superseded, result ignored");
                self.status()
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
