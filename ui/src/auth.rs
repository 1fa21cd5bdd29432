//! Session context and hooks for the UI.

use client::{AuthClient, Config, Session};
use dioxus::prelude::*;

/// Session state for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub session: Option<Session>,
    pub loading: bool,
    /// Informational notice for the auth screens, e.g. the
    /// check-your-email prompt after sign-up.
    pub notice: Option<String>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            session: None,
            loading: true,
            notice: None,
        }
    }
}

impl AuthState {
    pub fn user_email(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user.email.as_str())
    }
}

/// Get the current session state.
/// Returns a signal that updates when the user signs in or out.
pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

/// Get the shared authentication client.
pub fn use_auth_client() -> AuthClient {
    use_context::<AuthClient>()
}

/// Provider component that manages session state.
/// Wrap your app with this component to enable authentication.
#[component]
pub fn AuthProvider(config: Config, children: Element) -> Element {
    let mut auth_state = use_signal(AuthState::default);
    let client = use_hook(|| AuthClient::new(config.clone()));

    use_context_provider(|| auth_state);
    use_context_provider({
        let client = client.clone();
        move || client
    });
    use_context_provider(move || config);

    // Restore the persisted session on mount; an expired one is refreshed
    // transparently, anything unusable leaves the user signed out.
    let _ = use_resource(move || {
        let client = client.clone();
        async move {
            let session = client.restore().await;
            auth_state.set(AuthState {
                session,
                loading: false,
                notice: None,
            });
        }
    });

    rsx! {
        {children}
    }
}

/// Button to sign out the current user.
#[component]
pub fn SignOutButton(
    #[props(default = "Sign out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let mut auth_state = use_auth();
    let client = use_auth_client();

    let onclick = move |_| {
        let client = client.clone();
        async move {
            let session = auth_state().session;
            // Local state goes first; the previous user's data must never
            // stay on screen waiting for the network.
            auth_state.set(AuthState {
                session: None,
                loading: false,
                notice: None,
            });
            if let Some(session) = session {
                if let Err(e) = client.sign_out(&session).await {
                    tracing::warn!("sign-out revocation failed: {e}");
                }
            }
        }
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}
