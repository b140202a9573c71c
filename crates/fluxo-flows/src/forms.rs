//! Input validation for the front-end forms.
//!
//! Each form turns raw user input into the typed request the backend
//! expects, or reports the first field that is wrong. Nothing here talks
//! to the network.

use std::fmt;

use fluxo_protocol::{
    ChangePasswordRequest, CreatePromptRequest, LoginRequest, PromptStyle,
    RegisterRequest, StyleId,
};

use crate::FormError;

pub const MIN_PASSWORD_CHARS: usize = 6;
pub const MIN_NEW_PASSWORD_CHARS: usize = 8;
pub const MIN_NAME_CHARS: usize = 2;
pub const MAX_PROMPT_CHARS: usize = 1000;

/// A loose "is this an email address" check: `local@domain.tld`, no
/// whitespace. The backend has the final word.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, _)| !host.is_empty())
        && !domain.ends_with('.')
}

fn check_email(email: &str) -> Result<String, FormError> {
    let email = email.trim();
    if looks_like_email(email) {
        Ok(email.to_string())
    } else {
        Err(FormError::new("email", "enter a valid email address"))
    }
}

fn check_password(password: &str) -> Result<(), FormError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(FormError::new(
            "password",
            format!("password must be at least {MIN_PASSWORD_CHARS} characters"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// LoginForm
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<LoginRequest, FormError> {
        let email = check_email(&self.email)?;
        check_password(&self.password)?;
        Ok(LoginRequest {
            email,
            password: self.password.clone(),
        })
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// RegisterForm
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl RegisterForm {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
        }
    }

    /// Login rules plus a name of at least two characters after trimming.
    pub fn validate(&self) -> Result<RegisterRequest, FormError> {
        let email = check_email(&self.email)?;
        check_password(&self.password)?;

        let name = self.name.trim();
        if name.chars().count() < MIN_NAME_CHARS {
            return Err(FormError::new(
                "name",
                format!("name must be at least {MIN_NAME_CHARS} characters"),
            ));
        }

        Ok(RegisterRequest {
            email,
            password: self.password.clone(),
            name: name.to_string(),
        })
    }
}

impl fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterForm")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// PasswordChangeForm
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct PasswordChangeForm {
    pub current_password: String,
    pub new_password: String,
    /// The new password typed a second time.
    pub confirmation: String,
}

impl PasswordChangeForm {
    pub fn new(
        current_password: impl Into<String>,
        new_password: impl Into<String>,
        confirmation: impl Into<String>,
    ) -> Self {
        Self {
            current_password: current_password.into(),
            new_password: new_password.into(),
            confirmation: confirmation.into(),
        }
    }

    /// Checks are applied in this order, first failure wins:
    /// current present, new present, new long enough, confirmation
    /// matches, new differs from current.
    pub fn validate(&self) -> Result<ChangePasswordRequest, FormError> {
        if self.current_password.trim().is_empty() {
            return Err(FormError::new(
                "current_password",
                "enter your current password",
            ));
        }
        if self.new_password.trim().is_empty() {
            return Err(FormError::new("new_password", "enter a new password"));
        }
        if self.new_password.chars().count() < MIN_NEW_PASSWORD_CHARS {
            return Err(FormError::new(
                "new_password",
                format!(
                    "new password must be at least {MIN_NEW_PASSWORD_CHARS} characters"
                ),
            ));
        }
        if self.new_password != self.confirmation {
            return Err(FormError::new(
                "confirmation",
                "new password and confirmation do not match",
            ));
        }
        if self.new_password == self.current_password {
            return Err(FormError::new(
                "new_password",
                "new password must differ from the current one",
            ));
        }

        Ok(ChangePasswordRequest {
            current_password: self.current_password.clone(),
            new_password: self.new_password.clone(),
        })
    }
}

impl fmt::Debug for PasswordChangeForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordChangeForm").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// PromptForm
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct PromptForm {
    pub text: String,
    pub style: Option<StyleId>,
}

impl PromptForm {
    pub fn new(text: impl Into<String>, style: impl Into<StyleId>) -> Self {
        Self {
            text: text.into(),
            style: Some(style.into()),
        }
    }

    /// The text is sent trimmed.
    pub fn validate(&self) -> Result<CreatePromptRequest, FormError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(FormError::new("text", "enter some prompt text"));
        }
        if text.chars().count() > MAX_PROMPT_CHARS {
            return Err(FormError::new(
                "text",
                format!("prompt is too long (at most {MAX_PROMPT_CHARS} characters)"),
            ));
        }

        let Some(style_id) = self.style else {
            return Err(FormError::new("style", "choose a generation style"));
        };
        let style = PromptStyle::from_id(style_id).ok_or_else(|| {
            FormError::new("style", "choose a valid style (1-4)")
        })?;

        Ok(CreatePromptRequest {
            original_prompt: text.to_string(),
            style_id: style.id(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(err: FormError) -> &'static str {
        err.field
    }

    // =====================================================================
    // Email
    // =====================================================================

    #[test]
    fn test_looks_like_email() {
        for ok in ["a@b.co", "ada.lovelace+x@mail.example.org"] {
            assert!(looks_like_email(ok), "{ok} should pass");
        }
        for bad in ["", "ada", "@b.co", "a@", "a@b", "a@.co", "a@b.", "a b@c.de", "a@b@c.de"] {
            assert!(!looks_like_email(bad), "{bad} should fail");
        }
    }

    // =====================================================================
    // LoginForm / RegisterForm
    // =====================================================================

    #[test]
    fn test_login_valid_trims_email() {
        let req = LoginForm::new(" ada@example.com ", "secret1").validate().unwrap();
        assert_eq!(req.email, "ada@example.com");
        assert_eq!(req.password, "secret1");
    }

    #[test]
    fn test_login_short_password_rejected() {
        let err = LoginForm::new("ada@example.com", "12345").validate().unwrap_err();
        assert_eq!(field(err), "password");
    }

    #[test]
    fn test_login_bad_email_reported_first() {
        let err = LoginForm::new("nope", "1").validate().unwrap_err();
        assert_eq!(field(err), "email");
    }

    #[test]
    fn test_register_name_is_trimmed_and_checked() {
        let err = RegisterForm::new("ada@example.com", "secret1", "  A  ")
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "name must be at least 2 characters");

        let req = RegisterForm::new("ada@example.com", "secret1", "  Ada ")
            .validate()
            .unwrap();
        assert_eq!(req.name, "Ada");
    }

    #[test]
    fn test_debug_never_prints_passwords() {
        let printed = format!(
            "{:?} {:?} {:?}",
            LoginForm::new("ada@example.com", "hunter22"),
            RegisterForm::new("ada@example.com", "hunter22", "Ada"),
            PasswordChangeForm::new("hunter22", "hunter23", "hunter23"),
        );
        assert!(!printed.contains("hunter2"));
    }

    // =====================================================================
    // PasswordChangeForm
    // =====================================================================

    #[test]
    fn test_password_change_rules_in_order() {
        let cases = [
            (("", "newpassword", "newpassword"), "current_password"),
            (("old", "   ", "   "), "new_password"),
            (("old", "short", "short"), "new_password"),
            (("old", "newpassword", "newpasswrd"), "confirmation"),
            (("samepassword", "samepassword", "samepassword"), "new_password"),
        ];
        for ((current, new, confirm), expected) in cases {
            let err = PasswordChangeForm::new(current, new, confirm)
                .validate()
                .unwrap_err();
            assert_eq!(err.field, expected, "case {current:?}/{new:?}/{confirm:?}");
        }
    }

    #[test]
    fn test_password_change_valid() {
        let req = PasswordChangeForm::new("oldpass", "newpassword", "newpassword")
            .validate()
            .unwrap();
        assert_eq!(req.current_password, "oldpass");
        assert_eq!(req.new_password, "newpassword");
    }

    // =====================================================================
    // PromptForm
    // =====================================================================

    #[test]
    fn test_prompt_trims_text() {
        let req = PromptForm::new("  write a haiku \n", PromptStyle::Creative)
            .validate()
            .unwrap();
        assert_eq!(req.original_prompt, "write a haiku");
        assert_eq!(req.style_id, StyleId(2));
    }

    #[test]
    fn test_prompt_blank_or_too_long_rejected() {
        assert!(PromptForm::new("   ", StyleId(1)).validate().is_err());

        let exactly = "é".repeat(MAX_PROMPT_CHARS);
        assert!(PromptForm::new(exactly.clone(), StyleId(1)).validate().is_ok());

        let err = PromptForm::new(exactly + "x", StyleId(1))
            .validate()
            .unwrap_err();
        assert_eq!(err.field, "text");
    }

    #[test]
    fn test_prompt_style_must_be_known() {
        let missing = PromptForm {
            text: "hello".into(),
            style: None,
        };
        assert_eq!(missing.validate().unwrap_err().field, "style");

        for id in [0, 5] {
            let err = PromptForm::new("hello", StyleId(id)).validate().unwrap_err();
            assert_eq!(err.to_string(), "choose a valid style (1-4)");
        }
    }
}
