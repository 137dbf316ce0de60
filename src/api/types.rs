//! Request and response payloads for the password reset endpoints. The reset
//! token and passwords are secrets: they are serialized for the wire but never
//! printed through `Debug`.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerifyRequest {
    pub email: String,
    pub otp_code: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResetRequest {
    #[serde(serialize_with = "expose")]
    pub reset_token: SecretString,
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub new_password: SecretString,
    #[serde(serialize_with = "expose")]
    pub confirm_password: SecretString,
}

#[derive(Deserialize)]
pub(crate) struct VerifyResponse {
    #[serde(default)]
    pub reset_token: Option<String>,
}

/// Body returned by the API on non-success responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
