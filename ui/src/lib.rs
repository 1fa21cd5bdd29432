//! This crate contains all shared UI for the workspace.

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

mod auth;
pub use auth::{use_auth, use_auth_client, AuthProvider, AuthState, SignOutButton};

mod auth_forms;
pub use auth_forms::{SignInForm, SignUpForm};

mod tasks;
pub use tasks::{use_tasks, TasksHandle};

mod task_form;
pub use task_form::AddTaskForm;

mod task_item;
pub use task_item::TaskItem;

mod task_filter;
pub use task_filter::{TaskFilter, TaskFilterBar, TaskStats};
