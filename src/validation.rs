//! Client-side form validation
//!
//! Validation runs before any network call. Each failing field gets its own
//! message so the front-end can show it inline next to the field.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Minimum password length accepted by the service.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum username length accepted by the service.
pub const MIN_USERNAME_LEN: usize = 3;

/// Length of emailed one-time codes.
pub const OTP_LEN: usize = 6;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email pattern"))
}

/// Form field an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Username,
    Email,
    Password,
    ConfirmPassword,
    Otp,
    NewPassword,
    Url,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirm password",
            Self::Otp => "code",
            Self::NewPassword => "new password",
            Self::Url => "url",
        };
        f.write_str(name)
    }
}

/// Per-field validation messages, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless the field already has one.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(())` when no field failed.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Input of the registration form.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Input of the login form.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn check_email(email: &str, errors: &mut FieldErrors) {
    if email.trim().is_empty() {
        errors.add(Field::Email, "Email is required");
    } else if !email_regex().is_match(email) {
        errors.add(Field::Email, "Invalid email format");
    }
}

/// Validate an email address on its own.
pub fn validate_email(email: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_email(email, &mut errors);
    errors.into_result()
}

/// Validate the registration form.
///
/// # Examples
///
/// ```
/// use linklens::validation::{validate_registration, Field, RegistrationForm};
///
/// let form = RegistrationForm {
///     username: String::new(),
///     email: "not-an-email".into(),
///     password: "123".into(),
///     confirm_password: "123".into(),
/// };
/// let errors = validate_registration(&form).unwrap_err();
/// assert_eq!(errors.get(Field::Username), Some("Username is required"));
/// assert_eq!(errors.get(Field::Email), Some("Invalid email format"));
/// assert_eq!(
///     errors.get(Field::Password),
///     Some("Password must be at least 6 characters")
/// );
/// ```
pub fn validate_registration(form: &RegistrationForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let username = form.username.trim();
    if username.is_empty() {
        errors.add(Field::Username, "Username is required");
    } else if username.chars().count() < MIN_USERNAME_LEN {
        errors.add(Field::Username, "Username must be at least 3 characters");
    }

    check_email(&form.email, &mut errors);

    if form.password.is_empty() {
        errors.add(Field::Password, "Password is required");
    } else if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(Field::Password, "Password must be at least 6 characters");
    }

    if form.password != form.confirm_password {
        errors.add(Field::ConfirmPassword, "Passwords do not match");
    }

    errors.into_result()
}

/// Validate the login form.
pub fn validate_login(form: &LoginForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_email(&form.email, &mut errors);
    if form.password.is_empty() {
        errors.add(Field::Password, "Password is required");
    }
    errors.into_result()
}

/// Validate a one-time code: exactly six ASCII digits.
pub fn validate_otp(otp: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    let otp = otp.trim();
    if otp.is_empty() {
        errors.add(Field::Otp, "OTP is required");
    } else if otp.len() != OTP_LEN || !otp.bytes().all(|b| b.is_ascii_digit()) {
        errors.add(Field::Otp, "OTP must be 6 digits");
    }
    errors.into_result()
}

/// Validate the new-password step of a password reset.
pub fn validate_new_password(new_password: &str, confirm: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if new_password.is_empty() {
        errors.add(Field::NewPassword, "New password is required");
    } else if new_password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(Field::NewPassword, "Password must be at least 6 characters");
    }

    if confirm.is_empty() {
        errors.add(Field::ConfirmPassword, "Please confirm your password");
    } else if new_password != confirm {
        errors.add(Field::ConfirmPassword, "Passwords do not match");
    }
    errors.into_result()
}

/// Validate a URL submitted for analysis.
///
/// Anything the `url` crate can parse as an absolute URL is accepted.
pub fn validate_url(value: &str) -> Result<url::Url, FieldErrors> {
    let mut errors = FieldErrors::new();
    let value = value.trim();
    if value.is_empty() {
        errors.add(Field::Url, "Please enter a URL");
        return Err(errors);
    }
    match url::Url::parse(value) {
        Ok(parsed) => Ok(parsed),
        Err(_) => {
            errors.add(Field::Url, "Please enter a valid URL");
            Err(errors)
        }
    }
}
