//! Backend connection settings.

use thiserror::Error;

/// Environment variable naming the service endpoint URL.
pub const BACKEND_URL_VAR: &str = "TASKPAD_BACKEND_URL";
/// Environment variable naming the anonymous API key.
pub const BACKEND_KEY_VAR: &str = "TASKPAD_BACKEND_KEY";

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Startup must abort; the application never runs degraded without
    /// its backend settings.
    #[error("missing required setting {0}")]
    Missing(&'static str),
}

/// Connection settings for the hosted backend service.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Service endpoint, e.g. `https://project.example.com`.
    pub url: String,
    /// Anonymous API key sent with every request.
    pub anon_key: String,
}

impl Config {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Read the two required settings.
    ///
    /// Native targets consult the process environment (with `.env` loaded
    /// via dotenvy); WASM bundles have no process environment, so there
    /// the values are baked in at compile time.
    pub fn from_env() -> Result<Self, ConfigError> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            dotenvy::dotenv().ok();
            let url = std::env::var(BACKEND_URL_VAR)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(BACKEND_URL_VAR))?;
            let key = std::env::var(BACKEND_KEY_VAR)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(BACKEND_KEY_VAR))?;
            Ok(Self::new(url, key))
        }
        #[cfg(target_arch = "wasm32")]
        {
            let url = option_env!("TASKPAD_BACKEND_URL")
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(BACKEND_URL_VAR))?;
            let key = option_env!("TASKPAD_BACKEND_KEY")
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(BACKEND_KEY_VAR))?;
            Ok(Self::new(url, key))
        }
    }

    /// URL of an authentication endpoint, e.g. `auth_url("token")`.
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.url)
    }

    /// URL of a REST table endpoint, e.g. `rest_url("tasks")`.
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.url)
    }

    /// WebSocket URL of the realtime endpoint.
    pub fn realtime_url(&self) -> String {
        let ws = if self.url.starts_with("https") {
            self.url.replacen("https", "wss", 1)
        } else {
            self.url.replacen("http", "ws", 1)
        };
        format!("{ws}/realtime/v1/websocket?apikey={}&vsn=1.0.0", self.anon_key)
    }
}
