use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::backend::{BackendError, TasksBackend};
use crate::event::{ChangeEvent, ChangeFeed, ChangeSender};
use crate::models::{Task, TaskDraft, TaskPatch};

/// In-memory stand-in for the hosted service, used by tests.
///
/// Behaves the way the service does from a client's point of view: it
/// assigns row ids and timestamps, scopes reads and writes to the calling
/// user, and fans change events out to that user's subscribers.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    rows: Vec<Task>,
    subscribers: Vec<(String, ChangeSender)>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle scoped to one authenticated user, the way the service
    /// scopes its REST and realtime APIs by the caller's token.
    pub fn for_user(&self, user_id: &str) -> MemoryTasks {
        MemoryTasks {
            backend: self.clone(),
            user_id: user_id.to_string(),
        }
    }

    fn emit(&self, user_id: &str, event: ChangeEvent) {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.retain(|(uid, tx)| {
            if uid != user_id {
                return !tx.is_closed();
            }
            tx.send(event.clone())
        });
    }
}

/// User-scoped [`TasksBackend`] over a [`MemoryBackend`].
#[derive(Clone)]
pub struct MemoryTasks {
    backend: MemoryBackend,
    user_id: String,
}

impl TasksBackend for MemoryTasks {
    async fn list(&self) -> Result<Vec<Task>, BackendError> {
        let inner = self.backend.inner.lock().unwrap();
        let mut rows: Vec<Task> = inner
            .rows
            .iter()
            .filter(|t| t.user_id == self.user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert(&self, draft: TaskDraft) -> Result<Task, BackendError> {
        if draft.title.trim().is_empty() {
            return Err(BackendError::Invalid("title must not be empty".into()));
        }
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            completed: false,
            created_at: now,
            updated_at: now,
            user_id: self.user_id.clone(),
        };
        self.backend.inner.lock().unwrap().rows.push(task.clone());
        self.backend
            .emit(&self.user_id, ChangeEvent::Inserted { task: task.clone() });
        Ok(task)
    }

    async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task, BackendError> {
        let updated = {
            let mut inner = self.backend.inner.lock().unwrap();
            let row = inner
                .rows
                .iter_mut()
                .find(|t| t.id == id && t.user_id == self.user_id)
                // Missing and foreign rows are indistinguishable on purpose.
                .ok_or(BackendError::Forbidden)?;
            patch.apply_to(row);
            row.updated_at = Utc::now();
            row.clone()
        };
        self.backend.emit(
            &self.user_id,
            ChangeEvent::Updated {
                task: updated.clone(),
            },
        );
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        let removed = {
            let mut inner = self.backend.inner.lock().unwrap();
            let before = inner.rows.len();
            inner
                .rows
                .retain(|t| !(t.id == id && t.user_id == self.user_id));
            inner.rows.len() != before
        };
        if removed {
            self.backend
                .emit(&self.user_id, ChangeEvent::Deleted { id: id.to_string() });
        }
        Ok(())
    }

    async fn subscribe(&self) -> Result<ChangeFeed, BackendError> {
        let (tx, feed) = ChangeFeed::channel();
        self.backend
            .inner
            .lock()
            .unwrap()
            .subscribers
            .push((self.user_id.clone(), tx));
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamps() {
        let service = MemoryBackend::new();
        let tasks = service.for_user("u1");

        let task = tasks.insert(draft("Buy milk")).await.unwrap();
        assert!(!task.id.is_empty());
        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(task.user_id, "u1");
    }

    #[tokio::test]
    async fn rows_are_scoped_to_their_owner() {
        let service = MemoryBackend::new();
        let alice = service.for_user("alice");
        let mallory = service.for_user("mallory");

        let task = alice.insert(draft("secret errand")).await.unwrap();

        assert!(mallory.list().await.unwrap().is_empty());
        assert_eq!(
            mallory
                .update(&task.id, TaskPatch::completion(true))
                .await
                .unwrap_err(),
            BackendError::Forbidden
        );

        // A foreign delete is a no-op, not a probe for row existence.
        mallory.delete(&task.id).await.unwrap();
        assert_eq!(alice.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_of_unknown_row_is_a_generic_failure() {
        let service = MemoryBackend::new();
        let tasks = service.for_user("u1");
        assert_eq!(
            tasks
                .update("missing", TaskPatch::completion(true))
                .await
                .unwrap_err(),
            BackendError::Forbidden
        );
    }

    #[tokio::test]
    async fn events_reach_only_the_owners_subscribers() {
        let service = MemoryBackend::new();
        let alice = service.for_user("alice");
        let bob = service.for_user("bob");

        let mut alice_feed = alice.subscribe().await.unwrap();
        let mut bob_feed = bob.subscribe().await.unwrap();

        let task = alice.insert(draft("Buy milk")).await.unwrap();

        let event = alice_feed.try_next().unwrap();
        assert_eq!(event.id(), task.id);
        assert!(bob_feed.try_next().is_none());
    }

    #[tokio::test]
    async fn dropped_feeds_are_pruned() {
        let service = MemoryBackend::new();
        let tasks = service.for_user("u1");

        let feed = tasks.subscribe().await.unwrap();
        drop(feed);

        // Next emission notices the closed channel and prunes it.
        tasks.insert(draft("Buy milk")).await.unwrap();
        assert!(service.inner.lock().unwrap().subscribers.is_empty());
    }
}
