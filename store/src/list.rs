//! The in-memory task collection and its reconciliation rule.

use std::collections::HashSet;

use crate::event::ChangeEvent;
use crate::models::Task;

/// A set of tasks keyed by `id`, kept in display order: descending
/// `created_at` after a full load, newest prepended on live inserts.
///
/// [`apply`](TaskList::apply) is the single merge rule used both for
/// direct backend responses and for subscription events, so the two paths
/// cannot diverge. Live inserts are prepended without a re-sort; under
/// concurrent inserts items can land slightly out of strict order until
/// the next full fetch, which is accepted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn to_vec(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Replace the whole collection with a fresh fetch, newest first.
    /// Duplicate ids keep their first occurrence.
    pub fn replace_all(&mut self, mut tasks: Vec<Task>) {
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut seen = HashSet::new();
        tasks.retain(|t| seen.insert(t.id.clone()));
        self.tasks = tasks;
    }

    /// Insert or replace by id. An existing row is replaced in place; a
    /// new row is prepended.
    pub fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.insert(0, task),
        }
    }

    /// Remove by id; absence is not an error.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// The reconciliation rule: merge one remote change, deduplicating by
    /// id.
    pub fn apply(&mut self, event: ChangeEvent) {
        match event {
            ChangeEvent::Inserted { task } | ChangeEvent::Updated { task } => self.upsert(task),
            ChangeEvent::Deleted { id } => {
                self.remove(&id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn task(id: &str, age_secs: i64) -> Task {
        let created = Utc::now() - Duration::seconds(age_secs);
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            description: None,
            completed: false,
            created_at: created,
            updated_at: created,
            user_id: "u1".to_string(),
        }
    }

    fn ids(list: &TaskList) -> Vec<&str> {
        list.tasks().iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn replace_all_sorts_newest_first_and_dedupes() {
        let mut list = TaskList::new();
        list.replace_all(vec![task("old", 60), task("new", 1), task("old", 60)]);
        assert_eq!(ids(&list), vec!["new", "old"]);
    }

    #[test]
    fn insert_event_with_known_id_replaces_instead_of_duplicating() {
        let mut list = TaskList::new();
        list.replace_all(vec![task("a", 10)]);

        let mut replacement = task("a", 10);
        replacement.title = "edited elsewhere".to_string();
        list.apply(ChangeEvent::Inserted { task: replacement });

        assert_eq!(list.len(), 1);
        assert_eq!(list.get("a").unwrap().title, "edited elsewhere");
    }

    #[test]
    fn update_event_for_unknown_id_inserts_it() {
        let mut list = TaskList::new();
        list.apply(ChangeEvent::Updated { task: task("b", 5) });
        assert_eq!(ids(&list), vec!["b"]);
    }

    #[test]
    fn delete_event_leaves_no_phantom_and_tolerates_absence() {
        let mut list = TaskList::new();
        list.replace_all(vec![task("a", 10), task("b", 5)]);

        list.apply(ChangeEvent::Deleted { id: "b".into() });
        assert_eq!(ids(&list), vec!["a"]);
        assert!(list.get("b").is_none());

        // A second delete for the same id is a no-op.
        list.apply(ChangeEvent::Deleted { id: "b".into() });
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn live_insert_is_prepended() {
        let mut list = TaskList::new();
        list.replace_all(vec![task("a", 10)]);
        list.apply(ChangeEvent::Inserted { task: task("b", 0) });
        assert_eq!(ids(&list), vec!["b", "a"]);
    }
}
