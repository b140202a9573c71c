//! Session management for Fluxo.
//!
//! This crate answers one question for the rest of the application:
//! **who is logged in right now?**
//!
//! 1. **Persistence**: the bearer token survives restarts ([`TokenStore`])
//! 2. **Validation**: a token only counts once the backend returns a
//!    profile for it ([`ProfileSource`])
//! 3. **State**: one authoritative [`Session`] snapshot, published to
//!    every subscriber on each change ([`SessionManager`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Front end (above)  ← reads the session, subscribes to changes
//!     ↕
//! Session Layer (this crate)  ← owns token + profile, persists the token
//!     ↕
//! Client Layer (below)  ← GET /auth/me
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod manager;
mod profile;
mod session;
mod store;

pub use error::SessionError;
pub use manager::SessionManager;
pub use profile::ProfileSource;
pub use session::{Session, SessionStatus};
pub use store::{FileTokenStore, MemoryTokenStore, TOKEN_KEY, TokenStore};
