//! Client-side form validation for login and registration
//!
//! These rules mirror what the portal enforces server-side, so obviously
//! bad input is rejected before any request is made. Each failing field
//! produces exactly one error (the first failing rule wins), and
//! `FormState` tracks the per-field invalid marker and inline message,
//! clearing a field's error as soon as it is edited.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

const MIN_PASSWORD_LEN: usize = 8;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Invalid email regex")
    })
}

fn username_regex() -> &'static Regex {
    static USERNAME: OnceLock<Regex> = OnceLock::new();
    USERNAME.get_or_init(|| Regex::new(r"^[\w.@+-]{3,150}$").expect("Invalid username regex"))
}

/// A validated form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Username,
    Email,
    Password,
    PasswordConfirm,
    PolicyAgreement,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username => write!(f, "username"),
            Self::Email => write!(f, "email"),
            Self::Password => write!(f, "password"),
            Self::PasswordConfirm => write!(f, "password confirmation"),
            Self::PolicyAgreement => write!(f, "policy agreement"),
        }
    }
}

/// One field-scoped validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// Login form input
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    /// Username or email address
    pub username: String,
    pub password: String,
}

/// Registration form input
///
/// `policy_agreement` is `None` when the form has no policy checkbox,
/// in which case the rule does not apply.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub policy_agreement: Option<bool>,
}

/// Validate a login form
///
/// The username field accepts either a username or an email address;
/// the email pattern only applies when the value contains `@`.
pub fn validate_login(form: &LoginForm) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let username = form.username.trim();
    if username.is_empty() {
        errors.push(FieldError::new(
            Field::Username,
            "Enter a username or email address.",
        ));
    } else if username.contains('@') && !email_regex().is_match(username) {
        errors.push(FieldError::new(
            Field::Username,
            "Enter a valid email address.",
        ));
    }

    if form.password.is_empty() {
        errors.push(FieldError::new(Field::Password, "Enter a password."));
    } else if form.password.len() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            Field::Password,
            "Password must be at least 8 characters long.",
        ));
    }

    errors
}

/// Validate a registration form
pub fn validate_registration(form: &RegistrationForm) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let username = form.username.trim();
    if username.is_empty() {
        errors.push(FieldError::new(Field::Username, "Enter a username."));
    } else if !username_regex().is_match(username) {
        errors.push(FieldError::new(
            Field::Username,
            "Letters, digits and @/./+/-/_ only. At least 3 characters.",
        ));
    }

    let email = form.email.trim();
    if email.is_empty() {
        errors.push(FieldError::new(Field::Email, "Enter an email address."));
    } else if !email_regex().is_match(email) {
        errors.push(FieldError::new(
            Field::Email,
            "Enter a valid email address.",
        ));
    }

    if form.password.is_empty() {
        errors.push(FieldError::new(Field::Password, "Enter a password."));
    } else if form.password.len() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            Field::Password,
            "Password must be at least 8 characters long.",
        ));
    }

    if form.password_confirm.is_empty() {
        errors.push(FieldError::new(
            Field::PasswordConfirm,
            "Repeat the password.",
        ));
    } else if !form.password.is_empty() && form.password != form.password_confirm {
        errors.push(FieldError::new(
            Field::PasswordConfirm,
            "Passwords do not match.",
        ));
    }

    if form.policy_agreement == Some(false) {
        errors.push(FieldError::new(
            Field::PolicyAgreement,
            "You must agree to the privacy policy.",
        ));
    }

    errors
}

/// Per-field error state for a form
///
/// Holds the invalid marker and inline message per field, the analogue
/// of the `is-invalid` CSS class plus error node. Editing a field clears
/// its error immediately, independent of re-validation.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    errors: HashMap<Field, String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current errors with a fresh validation result
    pub fn apply(&mut self, errors: Vec<FieldError>) {
        self.errors = errors
            .into_iter()
            .map(|e| (e.field, e.message))
            .collect();
    }

    /// Clear one field's error because the user edited it
    pub fn note_edit(&mut self, field: Field) {
        self.errors.remove(&field);
    }

    /// Whether a field currently carries the invalid marker
    pub fn is_invalid(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    /// The inline error message for a field, if any
    pub fn message(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Whether submission may proceed
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
