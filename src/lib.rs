//! # passreset
//!
//! Client-side password reset wizard. The flow has three steps, each backed
//! by one call to the reset API:
//!
//! 1. **Request:** the user enters an email and the API sends a one-time code
//!    (`POST /api/password-reset/request/`).
//! 2. **Verify:** the user enters the 6-digit code and the API returns a
//!    short-lived reset token (`POST /api/password-reset/verify-otp/`).
//! 3. **Reset:** the user picks a new password, which is sent together with
//!    the reset token (`POST /api/password-reset/reset/`). On success the
//!    wizard redirects to the login route after a short delay.
//!
//! Validation is local and always runs before any request. Every failure is
//! non-fatal: it becomes a status message and leaves the wizard on the same
//! step. The reset token and passwords are held as `SecretString` and must
//! never be logged.

pub mod api;
pub mod cli;
pub mod reset;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
