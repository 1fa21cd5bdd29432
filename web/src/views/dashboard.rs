//! The signed-in task dashboard.

use dioxus::prelude::*;
use store::Task;
use ui::{
    use_auth, use_tasks, AddTaskForm, SignOutButton, TaskFilter, TaskFilterBar, TaskItem,
    TaskStats,
};

use crate::Route;

/// Dashboard component: counts, creation form, filter bar, and the task
/// list, with banners for fetch and mutation failures.
#[component]
pub fn Dashboard() -> Element {
    let auth = use_auth();
    let nav = use_navigator();
    let tasks = use_tasks();
    let filter = use_signal(TaskFilter::default);

    if auth().loading {
        return rsx! {
            div { class: "page-loading", "Loading..." }
        };
    }
    if auth().session.is_none() {
        nav.replace(Route::Login {});
        return rsx! {};
    }

    let snap = tasks.snapshot();
    let total = snap.tasks.len();
    let completed = snap.tasks.iter().filter(|t| t.completed).count();
    let visible: Vec<Task> = snap
        .tasks
        .iter()
        .filter(|t| filter().matches(t))
        .cloned()
        .collect();

    rsx! {
        div { class: "dashboard",
            header { class: "dashboard-header",
                h1 { "TaskPad" }
                div { class: "dashboard-user",
                    if let Some(email) = auth().user_email() {
                        span { class: "user-email", "{email}" }
                    }
                    SignOutButton { class: "btn" }
                }
            }

            TaskStats { total, completed }

            AddTaskForm {
                on_add: move |(title, description): (String, Option<String>)| {
                    spawn(async move { tasks.add(title, description).await });
                },
            }

            if let Some(error) = snap.error.clone() {
                div { class: "banner banner-error",
                    span { "{error}" }
                    button {
                        class: "btn",
                        onclick: move |_| tasks.refresh(),
                        "Retry"
                    }
                }
            }
            if let Some(error) = tasks.action_error() {
                div { class: "banner banner-warn",
                    span { "{error}" }
                    button {
                        class: "banner-dismiss",
                        onclick: move |_| tasks.dismiss_error(),
                        "Dismiss"
                    }
                }
            }

            TaskFilterBar { selected: filter }

            if snap.loading && snap.tasks.is_empty() {
                div { class: "empty-state", "Loading tasks..." }
            } else if visible.is_empty() {
                div { class: "empty-state", {empty_copy(filter(), total)} }
            } else {
                ul { class: "task-list",
                    for task in visible {
                        TaskItem {
                            key: "{task.id}",
                            task: task.clone(),
                            on_toggle: move |id: String| {
                                spawn(async move { tasks.toggle(id).await });
                            },
                            on_edit: move |(id, title, description): (String, String, Option<String>)| {
                                spawn(async move { tasks.edit(id, title, description).await });
                            },
                            on_delete: move |id: String| {
                                spawn(async move { tasks.remove(id).await });
                            },
                        }
                    }
                }
            }
        }
    }
}

fn empty_copy(filter: TaskFilter, total: usize) -> &'static str {
    if total == 0 {
        return "No tasks yet. Add your first one above.";
    }
    match filter {
        TaskFilter::Active => "Nothing left to do. Nice.",
        TaskFilter::Completed => "Nothing completed yet.",
        TaskFilter::All => "No tasks yet. Add your first one above.",
    }
}
