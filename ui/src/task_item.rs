//! A single task row: toggle, inline edit, delete.

use dioxus::prelude::*;
use store::Task;

use crate::icons::{FaPen, FaTrashCan};
use crate::Icon;

/// One entry in the task list.
///
/// The row renders in one of two modes: display (checkbox, text,
/// edit/delete buttons) or inline edit (title + description fields with
/// save/cancel). The handlers receive ids and field values; all state
/// changes go through the store upstream.
#[component]
pub fn TaskItem(
    task: Task,
    on_toggle: EventHandler<String>,
    on_edit: EventHandler<(String, String, Option<String>)>,
    on_delete: EventHandler<String>,
) -> Element {
    let mut editing = use_signal(|| false);
    let mut draft_title = use_signal(String::new);
    let mut draft_description = use_signal(String::new);

    let begin_edit = {
        let task = task.clone();
        move |_| {
            draft_title.set(task.title.clone());
            draft_description.set(task.description.clone().unwrap_or_default());
            editing.set(true);
        }
    };

    let save_edit = {
        let id = task.id.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let title = draft_title().trim().to_string();
            if title.is_empty() {
                return;
            }
            let description = draft_description().trim().to_string();
            let description = (!description.is_empty()).then_some(description);
            on_edit.call((id.clone(), title, description));
            editing.set(false);
        }
    };

    let request_delete = {
        let id = task.id.clone();
        let title = task.title.clone();
        move |_| {
            if confirm_delete(&title) {
                on_delete.call(id.clone());
            }
        }
    };

    let toggle = {
        let id = task.id.clone();
        move |_| on_toggle.call(id.clone())
    };

    let created = task.created_at.format("%b %-d, %Y");
    let edited = task.updated_at > task.created_at;

    rsx! {
        li {
            class: if task.completed { "task-item task-item-done" } else { "task-item" },

            if editing() {
                form {
                    class: "task-edit-form",
                    onsubmit: save_edit,
                    input {
                        class: "task-edit-title",
                        r#type: "text",
                        value: draft_title(),
                        oninput: move |evt: FormEvent| draft_title.set(evt.value()),
                    }
                    textarea {
                        class: "task-edit-description",
                        placeholder: "Description (optional)",
                        rows: 2,
                        value: draft_description(),
                        oninput: move |evt: FormEvent| draft_description.set(evt.value()),
                    }
                    div { class: "task-edit-actions",
                        button {
                            class: "btn btn-primary",
                            r#type: "submit",
                            disabled: draft_title().trim().is_empty(),
                            "Save"
                        }
                        button {
                            class: "btn",
                            r#type: "button",
                            onclick: move |_| editing.set(false),
                            "Cancel"
                        }
                    }
                }
            } else {
                input {
                    class: "task-checkbox",
                    r#type: "checkbox",
                    checked: task.completed,
                    onchange: toggle,
                }
                div { class: "task-body",
                    span { class: "task-title", "{task.title}" }
                    if let Some(description) = task.description.as_deref() {
                        p { class: "task-description", "{description}" }
                    }
                    span { class: "task-meta",
                        if edited {
                            "{created} (edited)"
                        } else {
                            "{created}"
                        }
                    }
                }
                div { class: "task-actions",
                    button {
                        class: "icon-btn",
                        title: "Edit",
                        onclick: begin_edit,
                        Icon { icon: FaPen, width: 14, height: 14 }
                    }
                    button {
                        class: "icon-btn icon-btn-danger",
                        title: "Delete",
                        onclick: request_delete,
                        Icon { icon: FaTrashCan, width: 14, height: 14 }
                    }
                }
            }
        }
    }
}

/// Ask before destroying a row. Browser confirm dialog on the web; native
/// shells fall through without a prompt.
fn confirm_delete(title: &str) -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(&format!("Delete \"{title}\"?")).ok())
            .unwrap_or(true)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = title;
        true
    }
}
