//! Session types and platform-appropriate persistence.
//!
//! A [`Session`] survives reloads the way the hosted service's own SDKs
//! handle it: serialized to localStorage in the browser, to a JSON file
//! under the user's data directory on native targets.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The authenticated principal, as the auth API returns it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// A signed-in session: tokens plus the user they belong to. Owned by the
/// session manager; read-only everywhere else.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds after which the access token stops working.
    pub expires_at: i64,
    pub user: AuthUser,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.expires_at
    }
}

const SESSION_KEY: &str = "taskpad.session";

/// Persist the session so it survives a reload or restart.
pub fn save_session(session: &Session) {
    let Ok(json) = serde_json::to_string(session) else {
        return;
    };
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(storage) = local_storage() {
            if storage.set_item(SESSION_KEY, &json).is_err() {
                tracing::warn!("failed to persist session to localStorage");
            }
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let path = session_path();
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Err(e) = std::fs::write(&path, json) {
            tracing::warn!("failed to persist session: {e}");
        }
    }
}

/// Load the persisted session, if any. Corrupt data is treated as absent.
pub fn load_session() -> Option<Session> {
    #[cfg(target_arch = "wasm32")]
    {
        let json = local_storage()?.get_item(SESSION_KEY).ok()??;
        serde_json::from_str(&json).ok()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let json = std::fs::read_to_string(session_path()).ok()?;
        serde_json::from_str(&json).ok()
    }
}

/// Forget the persisted session.
pub fn clear_session() {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(SESSION_KEY);
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = std::fs::remove_file(session_path());
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

#[cfg(not(target_arch = "wasm32"))]
fn session_path() -> std::path::PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("taskpad")
        .join("session.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: i64) -> Session {
        Session {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_at,
            user: AuthUser {
                id: "u1".into(),
                email: "a@example.com".into(),
            },
        }
    }

    #[test]
    fn expiry_is_checked_against_wall_clock() {
        assert!(session(0).is_expired());
        assert!(!session(Utc::now().timestamp() + 3600).is_expired());
    }

    #[test]
    fn session_round_trips_through_json() {
        let original = session(1_900_000_000);
        let json = serde_json::to_string(&original).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
    }
}
