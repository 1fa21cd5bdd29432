//! Completion filter and the summary counts above the list.

use dioxus::prelude::*;
use store::Task;

/// Which slice of the collection the dashboard shows. Purely a view
/// concern; the store always holds every task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 3] = [TaskFilter::All, TaskFilter::Active, TaskFilter::Completed];

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => !task.completed,
            TaskFilter::Completed => task.completed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskFilter::All => "All",
            TaskFilter::Active => "Active",
            TaskFilter::Completed => "Completed",
        }
    }
}

/// Row of filter buttons bound to the dashboard's filter signal.
#[component]
pub fn TaskFilterBar(mut selected: Signal<TaskFilter>) -> Element {
    rsx! {
        div { class: "task-filter-bar",
            for filter in TaskFilter::ALL {
                button {
                    class: if selected() == filter { "filter-btn filter-btn-active" } else { "filter-btn" },
                    onclick: move |_| selected.set(filter),
                    {filter.label()}
                }
            }
        }
    }
}

/// Summary counts shown above the list.
#[component]
pub fn TaskStats(total: usize, completed: usize) -> Element {
    let active = total - completed;
    rsx! {
        div { class: "task-stats",
            div { class: "stat",
                span { class: "stat-value", "{total}" }
                span { class: "stat-label", "total" }
            }
            div { class: "stat",
                span { class: "stat-value", "{active}" }
                span { class: "stat-label", "active" }
            }
            div { class: "stat",
                span { class: "stat-value", "{completed}" }
                span { class: "stat-label", "done" }
            }
        }
    }
}
