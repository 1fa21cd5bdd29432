//! Error taxonomy for calls against the hosted service.

use serde::Deserialize;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Wrong email or password.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The account exists but its email address is not confirmed yet.
    #[error("email address not confirmed yet")]
    Unverified,
    /// The stored session is expired or was revoked.
    #[error("session expired, please sign in again")]
    SessionExpired,
    /// Generic authorization failure; deliberately does not say whether
    /// the row exists.
    #[error("operation not permitted")]
    Forbidden,
    /// Network failure or backend unavailability.
    #[error("request failed: {0}")]
    Transport(String),
    /// The backend answered with something we could not parse.
    #[error("malformed response: {0}")]
    Decode(String),
    /// Error message reported by the service itself.
    #[error("{0}")]
    Backend(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

impl From<ClientError> for store::BackendError {
    fn from(e: ClientError) -> Self {
        use store::BackendError;
        match e {
            ClientError::InvalidCredentials
            | ClientError::Unverified
            | ClientError::SessionExpired => BackendError::Unauthenticated,
            ClientError::Forbidden => BackendError::Forbidden,
            ClientError::Transport(msg) => BackendError::Transport(msg),
            ClientError::Decode(msg) => BackendError::Decode(msg),
            ClientError::Backend(msg) => BackendError::Invalid(msg),
            ClientError::Config(e) => BackendError::Transport(e.to_string()),
        }
    }
}

/// Error body shape used by the service's auth and REST endpoints. The
/// two APIs disagree on field names, so every known spelling is optional.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error_code: Option<String>,
    pub error_description: Option<String>,
    pub msg: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ApiErrorBody {
    fn text(&self) -> Option<&str> {
        self.error_description
            .as_deref()
            .or(self.msg.as_deref())
            .or(self.message.as_deref())
            .or(self.error.as_deref())
    }
}

/// Map a non-success auth response to a [`ClientError`].
pub(crate) fn auth_error(status: u16, body: &str) -> ClientError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    if parsed.error_code.as_deref() == Some("email_not_confirmed") {
        return ClientError::Unverified;
    }
    match status {
        401 => ClientError::InvalidCredentials,
        // 400 covers more than bad credentials ("User already
        // registered" among others); keep the service's message unless
        // the body says credentials.
        400 => match parsed.text() {
            _ if parsed.error_code.as_deref() == Some("invalid_credentials") => {
                ClientError::InvalidCredentials
            }
            Some(msg) if msg.contains("Invalid login credentials") => {
                ClientError::InvalidCredentials
            }
            Some(msg) => ClientError::Backend(msg.to_string()),
            None => ClientError::InvalidCredentials,
        },
        403 => ClientError::Forbidden,
        _ => match parsed.text() {
            Some(msg) => ClientError::Backend(msg.to_string()),
            None => ClientError::Transport(format!("unexpected status {status}")),
        },
    }
}

/// Map a non-success REST response to a [`ClientError`].
pub(crate) fn rest_error(status: u16, body: &str) -> ClientError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    match status {
        401 => ClientError::SessionExpired,
        // 404 is folded into the generic failure so a guessed id reveals
        // nothing about rows under another owner.
        403 | 404 => ClientError::Forbidden,
        _ => match parsed.text() {
            Some(msg) => ClientError::Backend(msg.to_string()),
            None => ClientError::Transport(format!("unexpected status {status}")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_login_maps_to_invalid_credentials() {
        let err = auth_error(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(err, ClientError::InvalidCredentials);
    }

    #[test]
    fn non_credential_auth_failures_keep_the_service_message() {
        let err = auth_error(400, r#"{"msg":"User already registered"}"#);
        assert_eq!(err, ClientError::Backend("User already registered".into()));

        let err = auth_error(
            400,
            r#"{"msg":"Password should be at least 6 characters"}"#,
        );
        assert_eq!(
            err,
            ClientError::Backend("Password should be at least 6 characters".into())
        );

        // A bare 400 still reads as a credentials failure.
        assert_eq!(auth_error(400, ""), ClientError::InvalidCredentials);
        assert_eq!(
            auth_error(400, r#"{"error_code":"invalid_credentials"}"#),
            ClientError::InvalidCredentials
        );
    }

    #[test]
    fn unconfirmed_email_is_distinguished() {
        let err = auth_error(
            400,
            r#"{"error_code":"email_not_confirmed","msg":"Email not confirmed"}"#,
        );
        assert_eq!(err, ClientError::Unverified);
    }

    #[test]
    fn rest_authorization_failures_stay_generic() {
        assert_eq!(rest_error(403, ""), ClientError::Forbidden);
        assert_eq!(rest_error(404, "{}"), ClientError::Forbidden);
        assert_eq!(rest_error(401, ""), ClientError::SessionExpired);
    }

    #[test]
    fn service_messages_survive_for_other_statuses() {
        let err = rest_error(409, r#"{"message":"duplicate key value"}"#);
        assert_eq!(err, ClientError::Backend("duplicate key value".into()));

        let err = rest_error(500, "not json");
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
