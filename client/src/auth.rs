//! Session-based authentication against the hosted service.

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::error::{auth_error, ClientError};
use crate::session::{clear_session, load_session, save_session, AuthUser, Session};

/// Client for the service's authentication API.
///
/// All failures surface as [`ClientError`] result values; nothing here
/// panics into the rendering layer.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    config: Config,
}

/// Token payload returned by sign-in and refresh.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now().timestamp() + self.expires_in,
            user: self.user,
        }
    }
}

/// Outcome of a sign-up request.
#[derive(Clone, Debug, PartialEq)]
pub struct SignUpOutcome {
    /// Present when the service signs the new account in immediately.
    pub session: Option<Session>,
    /// True when the account must confirm its email address first. This
    /// is service policy and an informational notice, not an error.
    pub verification_pending: bool,
}

impl AuthClient {
    pub fn new(config: Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.config.anon_key)
    }

    /// Exchange email + password for a session. The session is persisted
    /// so it can be restored after a reload.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let response = self
            .request(
                reqwest::Method::POST,
                format!("{}?grant_type=password", self.config.auth_url("token")),
            )
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        if !(200..300).contains(&status) {
            return Err(auth_error(status, &body));
        }
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
        let session = token.into_session();
        save_session(&session);
        Ok(session)
    }

    /// Request account creation. Depending on service policy the account
    /// is either signed in immediately or left pending email
    /// verification.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignUpOutcome, ClientError> {
        let mut body = json!({ "email": email, "password": password });
        if let Some(name) = display_name.filter(|n| !n.trim().is_empty()) {
            body["data"] = json!({ "full_name": name.trim() });
        }

        let response = self
            .request(reqwest::Method::POST, self.config.auth_url("signup"))
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        if !(200..300).contains(&status) {
            return Err(auth_error(status, &text));
        }

        // With auto-confirm enabled the response is a full token payload;
        // otherwise it is just the created user.
        if let Ok(token) = serde_json::from_str::<TokenResponse>(&text) {
            let session = token.into_session();
            save_session(&session);
            return Ok(SignUpOutcome {
                session: Some(session),
                verification_pending: false,
            });
        }
        serde_json::from_str::<AuthUser>(&text)
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(SignUpOutcome {
            session: None,
            verification_pending: true,
        })
    }

    /// Destroy the session. The persisted copy is cleared first so the
    /// user is signed out locally even when the revocation request fails.
    pub async fn sign_out(&self, session: &Session) -> Result<(), ClientError> {
        clear_session();
        let response = self
            .request(reqwest::Method::POST, self.config.auth_url("logout"))
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        let status = response.status().as_u16();
        // An already-dead token is as signed out as it gets.
        if (200..300).contains(&status) || status == 401 {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(auth_error(status, &body))
        }
    }

    /// Exchange a refresh token for a fresh session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, ClientError> {
        let response = self
            .request(
                reqwest::Method::POST,
                format!("{}?grant_type=refresh_token", self.config.auth_url("token")),
            )
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        if !(200..300).contains(&status) {
            return Err(auth_error(status, &body));
        }
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
        let session = token.into_session();
        save_session(&session);
        Ok(session)
    }

    /// Restore the persisted session, refreshing it when expired. Returns
    /// `None` when nothing usable is stored; restore never fails hard.
    pub async fn restore(&self) -> Option<Session> {
        let stored = load_session()?;
        if !stored.is_expired() {
            return Some(stored);
        }
        match self.refresh(&stored.refresh_token).await {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("session refresh failed: {e}");
                clear_session();
                None
            }
        }
    }
}
