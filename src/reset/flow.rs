//! Pure transition function for the reset wizard. `ResetFlow::handle` takes an
//! `Event` (field edit, trigger or network completion) and returns at most one
//! `Effect` for the driver to run. It never performs I/O itself.
//!
//! Events that do not fit the current state are ignored: a submit while a
//! request is pending, a completion for a step the wizard already left, field
//! edits for another step, and anything after the reset completed.

use crate::{
    api::{ApiError, PasswordResetRequest, ResetRequest, VerifyRequest},
    reset::{
        navigator::{NavigationContext, Route},
        redirect::DEFAULT_REDIRECT_DELAY,
        state::{Status, Step, Submission, WizardState},
        validate::{
            normalize_email, sanitize_otp, validate_email, validate_otp, validate_passwords,
        },
    },
};
use secrecy::SecretString;
use std::time::Duration;
use tracing::{debug, warn};

pub const CODE_SENT: &str = "A verification code has been sent to your email";
pub const CODE_RESENT: &str = "A new verification code has been sent to your email";
pub const CODE_VERIFIED: &str = "Code verified. Choose a new password.";
pub const PASSWORD_RESET: &str = "Password reset successfully. Redirecting to login...";
pub const LOGIN_MESSAGE: &str =
    "Your password has been reset. Please sign in with your new password.";

const SEND_REJECTED: &str = "Failed to send verification code";
const SEND_FAILED: &str = "Unable to send verification code. Please try again.";
const VERIFY_REJECTED: &str = "Invalid or expired verification code";
const VERIFY_FAILED: &str = "Unable to verify code. Please try again.";
const RESET_REJECTED: &str = "Failed to reset password";
const RESET_FAILED: &str = "Unable to reset password. Please try again.";

#[derive(Debug)]
pub enum Event {
    EmailChanged(String),
    OtpChanged(String),
    NewPasswordChanged(SecretString),
    ConfirmPasswordChanged(SecretString),
    Submit,
    Resend,
    Back,
    CodeSent {
        resend: bool,
        result: Result<(), ApiError>,
    },
    CodeVerified(Result<SecretString, ApiError>),
    PasswordReset(Result<(), ApiError>),
}

impl Event {
    const fn name(&self) -> &'static str {
        match self {
            Self::EmailChanged(_) => "email_changed",
            Self::OtpChanged(_) => "otp_changed",
            Self::NewPasswordChanged(_) => "new_password_changed",
            Self::ConfirmPasswordChanged(_) => "confirm_password_changed",
            Self::Submit => "submit",
            Self::Resend => "resend",
            Self::Back => "back",
            Self::CodeSent { .. } => "code_sent",
            Self::CodeVerified(_) => "code_verified",
            Self::PasswordReset(_) => "password_reset",
        }
    }
}

/// Work requested by a transition.
#[derive(Debug)]
pub enum Effect {
    SendCode {
        request: PasswordResetRequest,
        resend: bool,
    },
    VerifyCode(VerifyRequest),
    ResetPassword(ResetRequest),
    Navigate {
        route: Route,
        context: NavigationContext,
    },
    ScheduleRedirect {
        route: Route,
        context: NavigationContext,
        delay: Duration,
    },
}

#[derive(Debug)]
pub struct ResetFlow {
    state: WizardState,
    status: Option<Status>,
    redirect_delay: Duration,
}

impl Default for ResetFlow {
    fn default() -> Self {
        Self::new(DEFAULT_REDIRECT_DELAY)
    }
}

impl ResetFlow {
    #[must_use]
    pub fn new(redirect_delay: Duration) -> Self {
        Self {
            state: WizardState::default(),
            status: None,
            redirect_delay,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &WizardState {
        &self.state
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.state.step()
    }

    #[must_use]
    pub const fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting()
    }

    pub fn handle(&mut self, event: Event) -> Option<Effect> {
        let state = std::mem::take(&mut self.state);
        let (next, effect) = self.transition(state, event);
        self.state = next;
        effect
    }

    #[allow(clippy::too_many_lines)]
    fn transition(&mut self, state: WizardState, event: Event) -> (WizardState, Option<Effect>) {
        use Submission::{Idle, Pending};

        match (state, event) {
            // Field edits, accepted only on the matching step while idle.
            (WizardState::Request { submit: Idle, .. }, Event::EmailChanged(email)) => (
                WizardState::Request {
                    email,
                    submit: Idle,
                },
                None,
            ),
            (WizardState::Verify { email, submit: Idle, .. }, Event::OtpChanged(raw)) => (
                WizardState::Verify {
                    email,
                    otp_code: sanitize_otp(&raw),
                    submit: Idle,
                },
                None,
            ),
            (
                WizardState::Reset {
                    email,
                    reset_token,
                    confirm_password,
                    submit: Idle,
                    ..
                },
                Event::NewPasswordChanged(new_password),
            ) => (
                WizardState::Reset {
                    email,
                    reset_token,
                    new_password,
                    confirm_password,
                    submit: Idle,
                },
                None,
            ),
            (
                WizardState::Reset {
                    email,
                    reset_token,
                    new_password,
                    submit: Idle,
                    ..
                },
                Event::ConfirmPasswordChanged(confirm_password),
            ) => (
                WizardState::Reset {
                    email,
                    reset_token,
                    new_password,
                    confirm_password,
                    submit: Idle,
                },
                None,
            ),

            // Submit
            (WizardState::Request { email, submit: Idle }, Event::Submit) => {
                let email = normalize_email(&email);
                if let Err(err) = validate_email(&email) {
                    self.status = Some(Status::error(err.to_string()));
                    return (WizardState::Request { email, submit: Idle }, None);
                }

                self.status = None;
                let request = PasswordResetRequest {
                    email: email.clone(),
                };
                (
                    WizardState::Request {
                        email,
                        submit: Pending,
                    },
                    Some(Effect::SendCode {
                        request,
                        resend: false,
                    }),
                )
            }
            (
                WizardState::Verify {
                    email,
                    otp_code,
                    submit: Idle,
                },
                Event::Submit,
            ) => {
                if let Err(err) = validate_otp(&otp_code) {
                    self.status = Some(Status::error(err.to_string()));
                    return (
                        WizardState::Verify {
                            email,
                            otp_code,
                            submit: Idle,
                        },
                        None,
                    );
                }

                self.status = None;
                let request = VerifyRequest {
                    email: email.clone(),
                    otp_code: otp_code.clone(),
                };
                (
                    WizardState::Verify {
                        email,
                        otp_code,
                        submit: Pending,
                    },
                    Some(Effect::VerifyCode(request)),
                )
            }
            (
                WizardState::Reset {
                    email,
                    reset_token,
                    new_password,
                    confirm_password,
                    submit: Idle,
                },
                Event::Submit,
            ) => {
                let effect = match validate_passwords(&new_password, &confirm_password) {
                    Err(err) => {
                        self.status = Some(Status::error(err.to_string()));
                        None
                    }
                    Ok(()) => {
                        self.status = None;
                        Some(Effect::ResetPassword(ResetRequest {
                            reset_token: reset_token.clone(),
                            email: email.clone(),
                            new_password: new_password.clone(),
                            confirm_password: confirm_password.clone(),
                        }))
                    }
                };
                let submit = if effect.is_some() { Pending } else { Idle };
                (
                    WizardState::Reset {
                        email,
                        reset_token,
                        new_password,
                        confirm_password,
                        submit,
                    },
                    effect,
                )
            }

            // Resend repeats the request action without leaving the step.
            (
                WizardState::Verify {
                    email,
                    otp_code,
                    submit: Idle,
                },
                Event::Resend,
            ) => {
                self.status = None;
                let request = PasswordResetRequest {
                    email: email.clone(),
                };
                (
                    WizardState::Verify {
                        email,
                        otp_code,
                        submit: Pending,
                    },
                    Some(Effect::SendCode {
                        request,
                        resend: true,
                    }),
                )
            }

            // Back
            (state @ WizardState::Request { submit: Idle, .. }, Event::Back) => (
                state,
                Some(Effect::Navigate {
                    route: Route::Login,
                    context: NavigationContext::default(),
                }),
            ),
            (WizardState::Verify { email, submit: Idle, .. }, Event::Back) => {
                self.status = None;
                (WizardState::Request { email, submit: Idle }, None)
            }
            (WizardState::Reset { email, submit: Idle, .. }, Event::Back) => {
                self.status = None;
                (
                    WizardState::Verify {
                        email,
                        otp_code: String::new(),
                        submit: Idle,
                    },
                    None,
                )
            }

            // Completions
            (
                WizardState::Request {
                    email,
                    submit: Pending,
                },
                Event::CodeSent {
                    resend: false,
                    result,
                },
            ) => match result {
                Ok(()) => {
                    self.status = Some(Status::success(CODE_SENT));
                    (
                        WizardState::Verify {
                            email,
                            otp_code: String::new(),
                            submit: Idle,
                        },
                        None,
                    )
                }
                Err(err) => {
                    self.status = Some(Status::error(failure_text(&err, SEND_REJECTED, SEND_FAILED)));
                    (WizardState::Request { email, submit: Idle }, None)
                }
            },
            (
                WizardState::Verify {
                    email,
                    otp_code,
                    submit: Pending,
                },
                Event::CodeSent { resend: true, result },
            ) => {
                self.status = Some(match result {
                    Ok(()) => Status::success(CODE_RESENT),
                    Err(err) => Status::error(failure_text(&err, SEND_REJECTED, SEND_FAILED)),
                });
                (
                    WizardState::Verify {
                        email,
                        otp_code,
                        submit: Idle,
                    },
                    None,
                )
            }
            (
                WizardState::Verify {
                    email,
                    otp_code,
                    submit: Pending,
                },
                Event::CodeVerified(result),
            ) => match result {
                Ok(reset_token) => {
                    self.status = Some(Status::success(CODE_VERIFIED));
                    (
                        WizardState::Reset {
                            email,
                            reset_token,
                            new_password: SecretString::default(),
                            confirm_password: SecretString::default(),
                            submit: Idle,
                        },
                        None,
                    )
                }
                Err(err) => {
                    self.status = Some(Status::error(failure_text(
                        &err,
                        VERIFY_REJECTED,
                        VERIFY_FAILED,
                    )));
                    (
                        WizardState::Verify {
                            email,
                            otp_code,
                            submit: Idle,
                        },
                        None,
                    )
                }
            },
            (
                WizardState::Reset {
                    email,
                    reset_token,
                    new_password,
                    confirm_password,
                    submit: Pending,
                },
                Event::PasswordReset(result),
            ) => match result {
                Ok(()) => {
                    self.status = Some(Status::success(PASSWORD_RESET));
                    let context = NavigationContext {
                        message: Some(LOGIN_MESSAGE.to_string()),
                        email: Some(email.clone()),
                    };
                    (
                        WizardState::Complete { email },
                        Some(Effect::ScheduleRedirect {
                            route: Route::Login,
                            context,
                            delay: self.redirect_delay,
                        }),
                    )
                }
                Err(err) => {
                    self.status = Some(Status::error(failure_text(
                        &err,
                        RESET_REJECTED,
                        RESET_FAILED,
                    )));
                    (
                        WizardState::Reset {
                            email,
                            reset_token,
                            new_password,
                            confirm_password,
                            submit: Idle,
                        },
                        None,
                    )
                }
            },

            (state, event) => {
                debug!(
                    step = %state.step(),
                    pending = state.is_submitting(),
                    event = event.name(),
                    "ignoring event"
                );
                (state, None)
            }
        }
    }
}

/// Server message when present, else the step's rejection or transport fallback.
fn failure_text(err: &ApiError, rejected: &str, failed: &str) -> String {
    warn!("reset step failed: {err}");

    match err.server_message() {
        Some(message) => message.to_string(),
        None if err.is_rejection() => rejected.to_string(),
        None => failed.to_string(),
    }
}
