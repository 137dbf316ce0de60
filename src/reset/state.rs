//! Wizard state. Each variant carries only the data valid for its step, so a
//! reset token cannot exist before the code is verified and the submit lock
//! cannot drift away from the step it belongs to.

use secrecy::SecretString;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Request,
    Verify,
    Reset,
    Complete,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Request => "request",
            Self::Verify => "verify",
            Self::Reset => "reset",
            Self::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Submit lock. While `Pending`, the step's submit and resend triggers are inert.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Submission {
    #[default]
    Idle,
    Pending,
}

#[derive(Clone, Debug)]
pub enum WizardState {
    Request {
        email: String,
        submit: Submission,
    },
    Verify {
        email: String,
        otp_code: String,
        submit: Submission,
    },
    Reset {
        email: String,
        reset_token: SecretString,
        new_password: SecretString,
        confirm_password: SecretString,
        submit: Submission,
    },
    Complete {
        email: String,
    },
}

impl Default for WizardState {
    fn default() -> Self {
        Self::Request {
            email: String::new(),
            submit: Submission::Idle,
        }
    }
}

impl WizardState {
    #[must_use]
    pub const fn step(&self) -> Step {
        match self {
            Self::Request { .. } => Step::Request,
            Self::Verify { .. } => Step::Verify,
            Self::Reset { .. } => Step::Reset,
            Self::Complete { .. } => Step::Complete,
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        match self {
            Self::Request { email, .. }
            | Self::Verify { email, .. }
            | Self::Reset { email, .. }
            | Self::Complete { email } => email,
        }
    }

    #[must_use]
    pub const fn submission(&self) -> Submission {
        match self {
            Self::Request { submit, .. }
            | Self::Verify { submit, .. }
            | Self::Reset { submit, .. } => *submit,
            Self::Complete { .. } => Submission::Idle,
        }
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submission() == Submission::Pending
    }

    #[must_use]
    pub fn otp_code(&self) -> Option<&str> {
        match self {
            Self::Verify { otp_code, .. } => Some(otp_code),
            _ => None,
        }
    }

    #[must_use]
    pub fn reset_token(&self) -> Option<&SecretString> {
        match self {
            Self::Reset { reset_token, .. } => Some(reset_token),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Message shown under the current step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StatusKind::Success => write!(f, "[ok] {}", self.text),
            StatusKind::Error => write!(f, "[error] {}", self.text),
        }
    }
}
