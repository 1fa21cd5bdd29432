use dioxus::prelude::*;

use ui::AuthProvider;
use views::{Dashboard, Login};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Root {},
    #[route("/login")]
    Login {},
    #[route("/tasks")]
    Dashboard {},
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    // Both connection settings are required; without them the app renders
    // a configuration error instead of limping along without a backend.
    let config = use_hook(client::Config::from_env);

    let body = match &config {
        Ok(config) => rsx! {
            AuthProvider {
                config: config.clone(),
                Router::<Route> {}
            }
        },
        Err(e) => rsx! {
            div { class: "config-error",
                h1 { "TaskPad is not configured" }
                p { "{e}" }
                p { class: "config-error-hint",
                    "Set "
                    code { "{client::config::BACKEND_URL_VAR}" }
                    " and "
                    code { "{client::config::BACKEND_KEY_VAR}" }
                    " and restart."
                }
            }
        },
    };

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        {body}
    }
}

/// Redirect `/` to `/tasks`
#[component]
fn Root() -> Element {
    let nav = use_navigator();
    nav.replace(Route::Dashboard {});
    rsx! {}
}
