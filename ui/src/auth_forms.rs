//! Email/password sign-in and sign-up forms.
//!
//! Both forms validate locally before touching the network and surface
//! service failures inline as messages, never as panics.

use dioxus::prelude::*;

use crate::auth::{use_auth, use_auth_client, AuthState};

/// Sign-in form component.
#[component]
pub fn SignInForm() -> Element {
    let mut auth = use_auth();
    let client = use_auth_client();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let client = client.clone();
        spawn(async move {
            error.set(None);

            let e = email().trim().to_string();
            let p = password();
            if e.is_empty() || p.is_empty() {
                error.set(Some("Please fill in all fields".to_string()));
                return;
            }

            loading.set(true);
            match client.sign_in(&e, &p).await {
                Ok(session) => {
                    auth.set(AuthState {
                        session: Some(session),
                        loading: false,
                        notice: None,
                    });
                }
                Err(e) => {
                    loading.set(false);
                    error.set(Some(e.to_string()));
                }
            }
        });
    };

    rsx! {
        form {
            class: "auth-form",
            onsubmit: handle_submit,

            if let Some(notice) = auth().notice {
                div { class: "auth-notice", "{notice}" }
            }
            if let Some(err) = error() {
                div { class: "auth-error", "{err}" }
            }

            input {
                class: "auth-input",
                r#type: "email",
                placeholder: "Email",
                value: email(),
                oninput: move |evt: FormEvent| email.set(evt.value()),
            }
            input {
                class: "auth-input",
                r#type: "password",
                placeholder: "Password",
                value: password(),
                oninput: move |evt: FormEvent| password.set(evt.value()),
            }
            button {
                class: "btn btn-primary auth-submit",
                r#type: "submit",
                disabled: loading(),
                if loading() { "Signing in..." } else { "Sign in" }
            }
        }
    }
}

/// Sign-up form component.
///
/// `on_verification_sent` fires when the service defers the account to
/// email confirmation instead of signing it in immediately, so the page
/// can switch back to the sign-in form with the notice visible.
#[component]
pub fn SignUpForm(on_verification_sent: EventHandler<()>) -> Element {
    let mut auth = use_auth();
    let client = use_auth_client();
    let mut name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut confirm_password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let client = client.clone();
        spawn(async move {
            error.set(None);

            let e = email().trim().to_string();
            let p = password();
            let cp = confirm_password();

            if e.is_empty() || !e.contains('@') {
                error.set(Some("Please enter a valid email".to_string()));
                return;
            }
            if p.len() < 6 {
                error.set(Some("Password must be at least 6 characters".to_string()));
                return;
            }
            if p != cp {
                error.set(Some("Passwords do not match".to_string()));
                return;
            }

            loading.set(true);
            let display_name = name();
            let display_name = (!display_name.trim().is_empty()).then_some(display_name);
            match client.sign_up(&e, &p, display_name.as_deref()).await {
                Ok(outcome) => {
                    if let Some(session) = outcome.session {
                        auth.set(AuthState {
                            session: Some(session),
                            loading: false,
                            notice: None,
                        });
                    } else {
                        let mut state = auth();
                        state.notice = Some(
                            "Account created. Check your email to confirm it, then sign in."
                                .to_string(),
                        );
                        auth.set(state);
                        on_verification_sent.call(());
                    }
                }
                Err(e) => {
                    loading.set(false);
                    error.set(Some(e.to_string()));
                }
            }
        });
    };

    rsx! {
        form {
            class: "auth-form",
            onsubmit: handle_submit,

            if let Some(err) = error() {
                div { class: "auth-error", "{err}" }
            }

            input {
                class: "auth-input",
                r#type: "text",
                placeholder: "Name (optional)",
                value: name(),
                oninput: move |evt: FormEvent| name.set(evt.value()),
            }
            input {
                class: "auth-input",
                r#type: "email",
                placeholder: "Email",
                value: email(),
                oninput: move |evt: FormEvent| email.set(evt.value()),
            }
            input {
                class: "auth-input",
                r#type: "password",
                placeholder: "Password (min 6 characters)",
                value: password(),
                oninput: move |evt: FormEvent| password.set(evt.value()),
            }
            input {
                class: "auth-input",
                r#type: "password",
                placeholder: "Confirm password",
                value: confirm_password(),
                oninput: move |evt: FormEvent| confirm_password.set(evt.value()),
            }
            button {
                class: "btn btn-primary auth-submit",
                r#type: "submit",
                disabled: loading(),
                if loading() { "Creating account..." } else { "Sign up" }
            }
        }
    }
}
