//! Client-side validation for account forms.

use crate::constants::MIN_PASSWORD_LEN;
use crate::models::auth::RegisterRequest;

/// Values entered into the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Per-field error messages; `None` means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub username: Option<&'static str>,
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
    pub confirm_password: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
    }

    /// Field name/message pairs for every failing field, in form order.
    pub fn messages(&self) -> Vec<(&'static str, &'static str)> {
        [
            ("username", self.username),
            ("email", self.email),
            ("password", self.password),
            ("confirm_password", self.confirm_password),
        ]
        .into_iter()
        .filter_map(|(field, message)| message.map(|message| (field, message)))
        .collect()
    }
}

/// Loose structural email check: `local@domain.tld` without whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

impl RegistrationForm {
    /// Check every field.
    pub fn validate(&self) -> FieldErrors {
        let username = self
            .username
            .trim()
            .is_empty()
            .then_some("Name is required");
        let email = if self.email.is_empty() {
            Some("Email is required")
        } else if !is_valid_email(&self.email) {
            Some("Not a valid email")
        } else {
            None
        };
        let password = if self.password.is_empty() {
            Some("Password is required")
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            Some("Password must be at least 8 characters")
        } else {
            None
        };
        let confirm_password = if self.confirm_password.is_empty() {
            Some("Confirmation password is required")
        } else if self.confirm_password != self.password {
            Some("Passwords do not match")
        } else {
            None
        };
        FieldErrors {
            username,
            email,
            password,
            confirm_password,
        }
    }

    /// Build the request body when the form is valid.
    ///
    /// # Errors
    /// Returns the field errors that block submission.
    pub fn into_request(self) -> Result<RegisterRequest, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email,
            password: self.password,
        })
    }
}
