//! HTTP client for the password reset API. Every call goes through the same
//! helpers so timeouts and error mapping stay consistent across the three
//! steps. Request bodies carry the reset token and passwords; they must never
//! be logged.

mod error;
mod types;

pub use error::{sanitize_message, ApiError, MAX_ERROR_CHARS};
pub use types::{PasswordResetRequest, ResetRequest, VerifyRequest};

use crate::APP_USER_AGENT;
use reqwest::{Client, Response};
use secrecy::SecretString;
use serde::Serialize;
use std::{future::Future, time::Duration};
use tracing::{debug, instrument};
use types::{ErrorBody, VerifyResponse};
use url::Url;

pub const REQUEST_CODE_PATH: &str = "/api/password-reset/request/";
pub const VERIFY_CODE_PATH: &str = "/api/password-reset/verify-otp/";
pub const RESET_PASSWORD_PATH: &str = "/api/password-reset/reset/";

/// Default request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The three calls the wizard makes. Implemented by [`ResetClient`] over HTTP
/// and by in-memory fakes in tests.
pub trait ResetApi {
    /// Asks the API to email a one-time code.
    fn request_code(
        &self,
        request: &PasswordResetRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Verifies the one-time code and returns the reset token.
    fn verify_code(
        &self,
        request: &VerifyRequest,
    ) -> impl Future<Output = Result<SecretString, ApiError>> + Send;

    /// Sets the new password using the reset token.
    fn reset_password(
        &self,
        request: &ResetRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ResetClient {
    client: Client,
    base_url: String,
}

/// Parse and check an API base URL: it must be absolute and use http(s).
///
/// # Errors
/// Returns `ApiError::Config` describing why the URL was rejected.
pub fn parse_base_url(base_url: &str) -> Result<Url, ApiError> {
    let parsed = Url::parse(base_url.trim())
        .map_err(|err| ApiError::Config(format!("Invalid API URL: {err}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(ApiError::Config(format!(
            "Invalid API URL: unsupported scheme {scheme}"
        ))),
    }
}

impl ResetClient {
    /// Build a client for the API rooted at `base_url`.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the URL is not an absolute http(s) URL or
    /// the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        parse_base_url(base_url)?;

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim().to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        let url = build_url(&self.base_url, path);
        debug!(url = %url, "POST");

        self.client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_request_error)
    }
}

impl ResetApi for ResetClient {
    #[instrument(skip_all)]
    async fn request_code(&self, request: &PasswordResetRequest) -> Result<(), ApiError> {
        let response = self.post_json(REQUEST_CODE_PATH, request).await?;
        handle_empty_response(response).await
    }

    #[instrument(skip_all)]
    async fn verify_code(&self, request: &VerifyRequest) -> Result<SecretString, ApiError> {
        let response = self.post_json(VERIFY_CODE_PATH, request).await?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))?;

        match body.reset_token {
            Some(token) if !token.trim().is_empty() => Ok(SecretString::from(token)),
            _ => Err(ApiError::Parse(
                "Response is missing the reset token".to_string(),
            )),
        }
    }

    #[instrument(skip_all)]
    async fn reset_password(&self, request: &ResetRequest) -> Result<(), ApiError> {
        let response = self.post_json(RESET_PASSWORD_PATH, request).await?;
        handle_empty_response(response).await
    }
}

/// Builds a URL from the base URL and the provided path.
fn build_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps transport errors into `ApiError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ApiError::Serialization(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Accepts any success status and ignores the body.
async fn handle_empty_response(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(rejection(response).await)
    }
}

/// Turns a non-success response into `ApiError::Http`, keeping the server's
/// `error` field when the body has one.
async fn rejection(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.error)
        .and_then(|message| sanitize_message(&message));

    debug!(status, has_message = message.is_some(), "request rejected");

    ApiError::Http { status, message }
}
