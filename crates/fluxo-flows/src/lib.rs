//! Client-side flows that sit in front of the Fluxo backend.
//!
//! - [`ConfirmationFlow`]: the email confirmation step after sign-up,
//!   with client-side resend limiting
//! - [`forms`]: validation of user input before any request is sent

#![allow(async_fn_in_trait)]

pub mod confirmation;
pub mod error;
pub mod forms;

pub use confirmation::{
    CODE_LENGTH, ConfirmationFlow, ConfirmationGateway, ConfirmationState,
    ResendPolicy,
};
pub use error::{FlowError, FormError, RESEND_LIMIT_MESSAGE};
pub use forms::{LoginForm, PasswordChangeForm, PromptForm, RegisterForm};
