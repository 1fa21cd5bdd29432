//! Sign-in / sign-up page.

use dioxus::prelude::*;
use ui::{use_auth, SignInForm, SignUpForm};

use crate::Route;

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    SignIn,
    SignUp,
}

/// Login page component. Toggles between the sign-in and sign-up forms;
/// an already-signed-in visitor is sent straight to the dashboard.
#[component]
pub fn Login() -> Element {
    let auth = use_auth();
    let nav = use_navigator();
    let mut mode = use_signal(|| Mode::SignIn);

    if !auth().loading && auth().session.is_some() {
        nav.replace(Route::Dashboard {});
        return rsx! {};
    }

    rsx! {
        div { class: "auth-page",
            h1 { class: "auth-title", "TaskPad" }
            p { class: "auth-subtitle",
                if mode() == Mode::SignIn {
                    "Sign in to your tasks"
                } else {
                    "Create an account"
                }
            }

            if mode() == Mode::SignIn {
                SignInForm {}
                p { class: "auth-switch",
                    "No account yet? "
                    button {
                        class: "link-btn",
                        onclick: move |_| mode.set(Mode::SignUp),
                        "Sign up"
                    }
                }
            } else {
                SignUpForm {
                    on_verification_sent: move |_| mode.set(Mode::SignIn),
                }
                p { class: "auth-switch",
                    "Already have an account? "
                    button {
                        class: "link-btn",
                        onclick: move |_| mode.set(Mode::SignIn),
                        "Sign in"
                    }
                }
            }
        }
    }
}
