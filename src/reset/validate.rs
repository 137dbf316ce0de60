//! Local field validation. Every check runs before a request is sent; the
//! first failing rule wins, in the order non-empty, format or length, then
//! consistency between fields.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::sync::LazyLock;
use thiserror::Error;

/// Number of digits in a one-time code.
pub const OTP_LENGTH: usize = 6;
/// Minimum password length accepted by the reset step.
pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// Validation failures; the `Display` text is the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Email is required")]
    EmailRequired,
    #[error("Please enter a valid email address")]
    EmailInvalid,
    #[error("OTP code is required")]
    OtpRequired,
    #[error("OTP code must be 6 digits")]
    OtpLength,
    #[error("Please fill in both password fields")]
    PasswordRequired,
    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_string()
}

#[must_use]
pub fn valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

/// Keeps only ASCII digits and caps the result at [`OTP_LENGTH`].
#[must_use]
pub fn sanitize_otp(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(OTP_LENGTH)
        .collect()
}

/// # Errors
/// Returns the first rule the email breaks.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !valid_email(email.trim()) {
        return Err(ValidationError::EmailInvalid);
    }
    Ok(())
}

/// # Errors
/// Returns the first rule the code breaks.
pub fn validate_otp(otp_code: &str) -> Result<(), ValidationError> {
    if otp_code.is_empty() {
        return Err(ValidationError::OtpRequired);
    }
    if otp_code.len() != OTP_LENGTH || !otp_code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::OtpLength);
    }
    Ok(())
}

/// # Errors
/// Returns the first rule the password pair breaks.
pub fn validate_passwords(
    new_password: &SecretString,
    confirm_password: &SecretString,
) -> Result<(), ValidationError> {
    let new_password = new_password.expose_secret();
    let confirm_password = confirm_password.expose_secret();

    if new_password.trim().is_empty() || confirm_password.trim().is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if new_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if new_password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}
