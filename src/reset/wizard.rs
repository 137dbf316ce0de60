//! Async driver around [`ResetFlow`]. It feeds user input into the flow, runs
//! the resulting effects against the API and navigator, and feeds completions
//! back. At most one request is outstanding at a time.

use crate::{
    api::ResetApi,
    reset::{
        flow::{Effect, Event, ResetFlow},
        navigator::Navigator,
        redirect::{ScheduledRedirect, DEFAULT_REDIRECT_DELAY},
        state::{Status, Step, WizardState},
    },
};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

pub struct Wizard<A, N: ?Sized> {
    flow: ResetFlow,
    api: A,
    navigator: Arc<N>,
    redirect: Option<ScheduledRedirect>,
}

impl<A, N> Wizard<A, N>
where
    A: ResetApi,
    N: Navigator + ?Sized + 'static,
{
    pub fn new(api: A, navigator: Arc<N>) -> Self {
        Self::with_redirect_delay(api, navigator, DEFAULT_REDIRECT_DELAY)
    }

    pub fn with_redirect_delay(api: A, navigator: Arc<N>, redirect_delay: Duration) -> Self {
        Self {
            flow: ResetFlow::new(redirect_delay),
            api,
            navigator,
            redirect: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &WizardState {
        self.flow.state()
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.flow.step()
    }

    #[must_use]
    pub const fn status(&self) -> Option<&Status> {
        self.flow.status()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.flow.is_submitting()
    }

    /// True while the post-reset redirect is scheduled but has not fired.
    #[must_use]
    pub fn redirect_pending(&self) -> bool {
        self.redirect
            .as_ref()
            .is_some_and(|redirect| !redirect.is_finished())
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.flow.handle(Event::EmailChanged(email.into()));
    }

    pub fn set_otp_code(&mut self, otp_code: impl Into<String>) {
        self.flow.handle(Event::OtpChanged(otp_code.into()));
    }

    pub fn set_new_password(&mut self, password: SecretString) {
        self.flow.handle(Event::NewPasswordChanged(password));
    }

    pub fn set_confirm_password(&mut self, password: SecretString) {
        self.flow.handle(Event::ConfirmPasswordChanged(password));
    }

    pub async fn submit(&mut self) {
        self.dispatch(Event::Submit).await;
    }

    pub async fn resend(&mut self) {
        self.dispatch(Event::Resend).await;
    }

    pub async fn back(&mut self) {
        self.dispatch(Event::Back).await;
    }

    /// Hands an event to the flow and runs effects until the flow settles.
    pub async fn dispatch(&mut self, event: Event) {
        let mut next = self.flow.handle(event);
        while let Some(effect) = next {
            next = self.run(effect).await;
        }
    }

    /// Cancels the scheduled redirect, if any. Dropping the wizard does the same.
    pub fn teardown(&mut self) {
        if let Some(redirect) = self.redirect.take() {
            redirect.cancel();
        }
    }

    async fn run(&mut self, effect: Effect) -> Option<Effect> {
        match effect {
            Effect::SendCode { request, resend } => {
                debug!(resend, "requesting verification code");
                let result = self.api.request_code(&request).await;
                self.flow.handle(Event::CodeSent { resend, result })
            }
            Effect::VerifyCode(request) => {
                debug!("verifying code");
                let result = self.api.verify_code(&request).await;
                self.flow.handle(Event::CodeVerified(result))
            }
            Effect::ResetPassword(request) => {
                debug!("resetting password");
                let result = self.api.reset_password(&request).await;
                self.flow.handle(Event::PasswordReset(result))
            }
            Effect::Navigate { route, context } => {
                info!(%route, "navigating");
                self.navigator.navigate(route, context);
                None
            }
            Effect::ScheduleRedirect {
                route,
                context,
                delay,
            } => {
                let redirect =
                    ScheduledRedirect::spawn(Arc::clone(&self.navigator), route, context, delay);
                // Replacing an older guard cancels it.
                self.redirect = Some(redirect);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{ApiError, PasswordResetRequest, ResetRequest, VerifyRequest},
        reset::{
            flow::LOGIN_MESSAGE,
            navigator::{testing::RecordingNavigator, Route},
            state::StatusKind,
        },
    };
    use secrecy::ExposeSecret;
    use std::sync::Mutex;
    use tokio::time::sleep;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Request(String),
        Verify(String, String),
        Reset(String, String, String),
    }

    /// In-memory API with scripted responses.
    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<Call>>,
        request_result: Mutex<Option<Result<(), ApiError>>>,
        verify_result: Mutex<Option<Result<String, ApiError>>>,
        reset_result: Mutex<Option<Result<(), ApiError>>>,
    }

    impl FakeApi {
        fn succeeding(token: &str) -> Self {
            let api = Self::default();
            *api.verify_result.lock().unwrap() = Some(Ok(token.to_string()));
            api
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn fail_request(&self, err: ApiError) {
            *self.request_result.lock().unwrap() = Some(Err(err));
        }

        fn fail_reset(&self, err: ApiError) {
            *self.reset_result.lock().unwrap() = Some(Err(err));
        }
    }

    impl ResetApi for &FakeApi {
        async fn request_code(&self, request: &PasswordResetRequest) -> Result<(), ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Request(request.email.clone()));
            self.request_result.lock().unwrap().clone().unwrap_or(Ok(()))
        }

        async fn verify_code(&self, request: &VerifyRequest) -> Result<SecretString, ApiError> {
            self.calls.lock().unwrap().push(Call::Verify(
                request.email.clone(),
                request.otp_code.clone(),
            ));
            self.verify_result
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Ok("token".to_string()))
                .map(SecretString::from)
        }

        async fn reset_password(&self, request: &ResetRequest) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(Call::Reset(
                request.reset_token.expose_secret().to_string(),
                request.email.clone(),
                request.new_password.expose_secret().to_string(),
            ));
            self.reset_result.lock().unwrap().clone().unwrap_or(Ok(()))
        }
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn full_reset_flow_redirects_to_login() {
        let api = FakeApi::succeeding("abc");
        let navigator = Arc::new(RecordingNavigator::default());
        let mut wizard = Wizard::new(&api, Arc::clone(&navigator));

        wizard.set_email("user@example.com");
        wizard.submit().await;
        assert_eq!(wizard.step(), Step::Verify);
        assert_eq!(
            wizard.status().map(|status| status.kind),
            Some(StatusKind::Success)
        );

        wizard.set_otp_code("123456");
        wizard.submit().await;
        assert_eq!(wizard.step(), Step::Reset);
        assert_eq!(
            wizard
                .state()
                .reset_token()
                .map(|token| token.expose_secret().to_string()),
            Some("abc".to_string())
        );

        wizard.set_new_password(secret("Passw0rd!"));
        wizard.set_confirm_password(secret("Passw0rd!"));
        wizard.submit().await;
        assert_eq!(wizard.step(), Step::Complete);
        assert!(wizard.redirect_pending());
        assert!(navigator.calls().is_empty());

        sleep(Duration::from_millis(1900)).await;
        assert!(navigator.calls().is_empty());

        sleep(Duration::from_millis(200)).await;
        let calls = navigator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].route, Route::Login);
        assert_eq!(calls[0].context.email.as_deref(), Some("user@example.com"));
        assert_eq!(calls[0].context.message.as_deref(), Some(LOGIN_MESSAGE));
        assert!(!wizard.redirect_pending());

        assert_eq!(
            api.calls(),
            vec![
                Call::Request("user@example.com".to_string()),
                Call::Verify("user@example.com".to_string(), "123456".to_string()),
                Call::Reset(
                    "abc".to_string(),
                    "user@example.com".to_string(),
                    "Passw0rd!".to_string()
                ),
            ]
        );

        // Exactly one navigation, even long after.
        sleep(Duration::from_secs(10)).await;
        assert_eq!(navigator.calls().len(), 1);
    }

    #[tokio::test]
    async fn validation_failures_issue_no_requests() {
        let api = FakeApi::default();
        let navigator = Arc::new(RecordingNavigator::default());
        let mut wizard = Wizard::new(&api, Arc::clone(&navigator));

        wizard.set_email("bad-email");
        wizard.submit().await;
        assert_eq!(wizard.step(), Step::Request);
        assert_eq!(
            wizard.status().map(|status| status.text.as_str()),
            Some("Please enter a valid email address")
        );
        assert!(api.calls().is_empty());

        wizard.set_email("user@example.com");
        wizard.submit().await;
        wizard.set_otp_code("12a45");
        wizard.submit().await;
        assert_eq!(wizard.step(), Step::Verify);
        assert_eq!(
            wizard.status().map(|status| status.text.as_str()),
            Some("OTP code must be 6 digits")
        );
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn api_failure_leaves_wizard_idle_on_same_step() {
        let api = FakeApi::default();
        api.fail_request(ApiError::Timeout("Request timed out.".to_string()));
        let navigator = Arc::new(RecordingNavigator::default());
        let mut wizard = Wizard::new(&api, Arc::clone(&navigator));

        wizard.set_email("user@example.com");
        wizard.submit().await;

        assert_eq!(wizard.step(), Step::Request);
        assert!(!wizard.is_submitting());
        assert_eq!(
            wizard.status().map(|status| status.text.as_str()),
            Some("Unable to send verification code. Please try again.")
        );
    }

    #[tokio::test]
    async fn resend_repeats_request() {
        let api = FakeApi::default();
        let navigator = Arc::new(RecordingNavigator::default());
        let mut wizard = Wizard::new(&api, Arc::clone(&navigator));

        wizard.set_email("user@example.com");
        wizard.submit().await;
        wizard.resend().await;

        assert_eq!(wizard.step(), Step::Verify);
        assert_eq!(
            api.calls(),
            vec![
                Call::Request("user@example.com".to_string()),
                Call::Request("user@example.com".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn back_from_request_navigates_immediately() {
        let api = FakeApi::default();
        let navigator = Arc::new(RecordingNavigator::default());
        let mut wizard = Wizard::new(&api, Arc::clone(&navigator));

        wizard.back().await;

        let calls = navigator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].route, Route::Login);
        assert_eq!(calls[0].context.email, None);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn back_from_verify_returns_to_request() {
        let api = FakeApi::default();
        let navigator = Arc::new(RecordingNavigator::default());
        let mut wizard = Wizard::new(&api, Arc::clone(&navigator));

        wizard.set_email("user@example.com");
        wizard.submit().await;
        assert!(wizard.status().is_some());

        wizard.back().await;
        assert_eq!(wizard.step(), Step::Request);
        assert!(wizard.status().is_none());
        assert!(navigator.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_suppresses_redirect() {
        let api = FakeApi::default();
        let navigator = Arc::new(RecordingNavigator::default());
        let mut wizard = Wizard::new(&api, Arc::clone(&navigator));

        wizard.set_email("user@example.com");
        wizard.submit().await;
        wizard.set_otp_code("123456");
        wizard.submit().await;
        wizard.set_new_password(secret("Passw0rd!"));
        wizard.set_confirm_password(secret("Passw0rd!"));
        wizard.submit().await;
        assert!(wizard.redirect_pending());

        sleep(Duration::from_secs(1)).await;
        wizard.teardown();
        sleep(Duration::from_secs(5)).await;

        assert!(navigator.calls().is_empty());
        assert!(!wizard.redirect_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_wizard_suppresses_redirect() {
        let api = FakeApi::default();
        let navigator = Arc::new(RecordingNavigator::default());
        {
            let mut wizard = Wizard::new(&api, Arc::clone(&navigator));
            wizard.set_email("user@example.com");
            wizard.submit().await;
            wizard.set_otp_code("123456");
            wizard.submit().await;
            wizard.set_new_password(secret("Passw0rd!"));
            wizard.set_confirm_password(secret("Passw0rd!"));
            wizard.submit().await;
            assert_eq!(wizard.step(), Step::Complete);
        }

        sleep(Duration::from_secs(5)).await;
        assert!(navigator.calls().is_empty());
    }

    #[tokio::test]
    async fn reset_rejection_keeps_token_for_retry() {
        let api = FakeApi::succeeding("abc");
        api.fail_reset(ApiError::Http {
            status: 400,
            message: Some("Password is too common".to_string()),
        });
        let navigator = Arc::new(RecordingNavigator::default());
        let mut wizard = Wizard::new(&api, Arc::clone(&navigator));

        wizard.set_email("user@example.com");
        wizard.submit().await;
        wizard.set_otp_code("123456");
        wizard.submit().await;
        wizard.set_new_password(secret("Passw0rd!"));
        wizard.set_confirm_password(secret("Passw0rd!"));
        wizard.submit().await;

        assert_eq!(wizard.step(), Step::Reset);
        assert!(!wizard.redirect_pending());
        assert_eq!(
            wizard.status().map(|status| status.text.as_str()),
            Some("Password is too common")
        );
        assert!(wizard.state().reset_token().is_some());
    }
}
