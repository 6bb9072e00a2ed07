//! Login and registration form validation.
//!
//! Checks run locally before any request; every failing field gets one
//! message so the view can show it next to the input.

use std::collections::BTreeMap;
use std::fmt;

use foody_core::Email;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Field names used as [`FieldErrors`] keys.
pub mod fields {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const PASSWORD: &str = "password";
    pub const CONFIRM_PASSWORD: &str = "confirm_password";
}

const EMAIL_REQUIRED: &str = "Email is required.";
const EMAIL_INVALID: &str = "Invalid email format.";
const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters.";
const NAME_REQUIRED: &str = "Name is required.";
const PHONE_REQUIRED: &str = "Phone number is required.";
const CONFIRM_TOO_SHORT: &str = "Password confirmation must be at least 6 characters.";
const CONFIRM_MISMATCH: &str = "Password and confirmation do not match.";

/// Validation messages keyed by field name. The first error per field wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    fn add(&mut self, field: &'static str, message: &str) {
        self.0.entry(field).or_insert_with(|| message.to_string());
    }

    /// Message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// A form failed local validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub FieldErrors);

impl ValidationError {
    #[must_use]
    pub const fn fields(&self) -> &FieldErrors {
        &self.0
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Login form input.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
    /// Remember the credentials to prefill the next login.
    pub remember_me: bool,
}

impl LoginForm {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
            remember_me: true,
        }
    }

    /// Check the form.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        check_email(&mut errors, &self.email);
        check_password(&mut errors, fields::PASSWORD, &self.password, PASSWORD_TOO_SHORT);
        errors.into_result()
    }
}

/// Registration form input.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

impl RegisterForm {
    /// Check the form.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();

        if self.name.trim().is_empty() {
            errors.add(fields::NAME, NAME_REQUIRED);
        }
        check_email(&mut errors, &self.email);
        if self.phone.trim().is_empty() {
            errors.add(fields::PHONE, PHONE_REQUIRED);
        }
        check_password(&mut errors, fields::PASSWORD, &self.password, PASSWORD_TOO_SHORT);
        check_password(
            &mut errors,
            fields::CONFIRM_PASSWORD,
            &self.confirm_password,
            CONFIRM_TOO_SHORT,
        );
        if self.password.expose_secret() != self.confirm_password.expose_secret() {
            errors.add(fields::CONFIRM_PASSWORD, CONFIRM_MISMATCH);
        }

        errors.into_result()
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add(fields::EMAIL, EMAIL_REQUIRED);
    } else if Email::parse(email.trim()).is_err() {
        errors.add(fields::EMAIL, EMAIL_INVALID);
    }
}

fn check_password(
    errors: &mut FieldErrors,
    field: &'static str,
    password: &SecretString,
    message: &str,
) {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
        errors.add(field, message);
    }
}
