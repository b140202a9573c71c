//! # Fluxo
//!
//! Client core for the Fluxo prompt generator.
//!
//! The facade [`Fluxo`] owns one HTTP gateway and one session manager and
//! exposes what a front end needs: sign-in and sign-up with email
//! confirmation, password changes, prompt generation, history, styles
//! and quota. Every backend failure comes back as a single message; form
//! rules and resend limits are checked before anything is sent.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fluxo::prelude::*;
//!
//! # async fn run() -> Result<(), FluxoError> {
//! fluxo::init_tracing();
//!
//! let app = Fluxo::builder()
//!     .base_url("http://localhost:8000")
//!     .build(FileTokenStore::default())
//!     .await?;
//!
//! app.sign_in(&LoginForm::new("ada@example.com", "secret1")).await?;
//! let record = app
//!     .generate(&PromptForm::new("write a haiku", PromptStyle::Creative.id()))
//!     .await?;
//! println!("{}", record.generated_prompt.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

mod app;
mod error;

pub use app::{Fluxo, FluxoBuilder};
pub use error::FluxoError;

pub use fluxo_client as client;
pub use fluxo_flows as flows;
pub use fluxo_protocol as protocol;
pub use fluxo_session as session;

/// Installs a `tracing` subscriber filtered by `RUST_LOG` (default
/// `info`). Front ends call this once at start-up; later calls are
/// ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

pub mod prelude {
    //! Everything a front end usually needs, in one import.

    pub use crate::{Fluxo, FluxoBuilder, FluxoError};
    pub use fluxo_client::{ApiClient, ClientConfig};
    pub use fluxo_flows::{
        ConfirmationFlow, ConfirmationState, FlowError, FormError, LoginForm,
        PasswordChangeForm, PromptForm, RegisterForm, ResendPolicy,
    };
    pub use fluxo_protocol::{
        ApiError, HistoryQuery, PromptRecord, PromptStyle, StyleCatalog,
        StyleId, UsageLimits, User,
    };
    pub use fluxo_session::{
        FileTokenStore, MemoryTokenStore, Session, SessionStatus, TokenStore,
    };
}
