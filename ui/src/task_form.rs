//! Form for creating a new task.

use dioxus::prelude::*;

/// Creation form: a single title field that expands to include an
/// optional description once focused. Cleared after a successful submit.
#[component]
pub fn AddTaskForm(on_add: EventHandler<(String, Option<String>)>) -> Element {
    let mut title = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut expanded = use_signal(|| false);

    let mut clear = move || {
        title.set(String::new());
        description.set(String::new());
        expanded.set(false);
    };

    let mut submit = move || {
        let t = title().trim().to_string();
        if t.is_empty() {
            return;
        }
        let d = description().trim().to_string();
        let d = (!d.is_empty()).then_some(d);
        on_add.call((t, d));
        clear();
    };

    rsx! {
        form {
            class: "add-task-form",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                submit();
            },

            input {
                class: "add-task-title",
                r#type: "text",
                placeholder: "Add a new task...",
                value: title(),
                oninput: move |evt: FormEvent| title.set(evt.value()),
                onfocus: move |_| expanded.set(true),
            }

            if expanded() {
                textarea {
                    class: "add-task-description",
                    placeholder: "Description (optional)",
                    rows: 2,
                    value: description(),
                    oninput: move |evt: FormEvent| description.set(evt.value()),
                }
                div { class: "add-task-actions",
                    button {
                        class: "btn btn-primary",
                        r#type: "submit",
                        disabled: title().trim().is_empty(),
                        "Add task"
                    }
                    button {
                        class: "btn",
                        r#type: "button",
                        onclick: move |_| clear(),
                        "Cancel"
                    }
                }
            }
        }
    }
}
