//! # TaskStore — the backend-synchronized task collection
//!
//! [`TaskStore`] owns the current user's tasks in memory and keeps them
//! synchronized with a [`TasksBackend`]. Mutations wait for the
//! authoritative backend response before touching local state; responses
//! and subscription events are merged through the same
//! [`TaskList::apply`] rule.
//!
//! ## Lifecycle
//!
//! A store starts detached. [`attach`](TaskStore::attach) binds it to a
//! user-scoped backend on sign-in; [`detach`](TaskStore::detach)
//! immediately clears the collection on sign-out. Both bump an internal
//! epoch, and every in-flight operation carries the epoch it started
//! under: a result arriving after a session change is discarded with
//! [`StoreError::Superseded`] instead of being applied to the wrong
//! session's state. The same guard covers subscription events via
//! [`SyncToken`].
//!
//! ## Known race
//!
//! Concurrent mutations to the same task id are not serialized: two rapid
//! toggles can be in flight at once and the later-arriving response wins,
//! even when it answers the earlier request. See
//! `tests::concurrent_updates_last_response_wins`.

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::backend::{BackendError, TasksBackend};
use crate::event::{ChangeEvent, ChangeFeed};
use crate::list::TaskList;
use crate::models::{Task, TaskDraft, TaskPatch};

/// Error returned by [`TaskStore`] operations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StoreError {
    /// No session is attached; fetches and mutations require one.
    #[error("not authenticated")]
    NotAuthenticated,
    /// The task id is not in the local collection.
    #[error("task not found")]
    NotFound,
    /// Rejected before any network call.
    #[error("{0}")]
    Validation(String),
    /// The result arrived after a session change and was discarded.
    #[error("superseded by a session change")]
    Superseded,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Point-in-time view of the store for rendering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreSnapshot {
    pub tasks: Vec<Task>,
    /// True while a full fetch is in flight.
    pub loading: bool,
    /// Last fetch failure; prior tasks stay visible alongside it.
    pub error: Option<String>,
}

/// Proof that a subscription belongs to the store's current session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyncToken {
    epoch: u64,
}

#[derive(Default)]
struct StoreState {
    list: TaskList,
    loading: bool,
    error: Option<String>,
    /// Bumped on attach/detach to invalidate in-flight work.
    epoch: u64,
}

/// The in-memory, backend-synchronized collection of the current user's
/// tasks. Cloning is cheap and clones share state.
///
/// The store owns its collection exclusively: every mutation goes through
/// the operations below or through [`apply_event`](TaskStore::apply_event);
/// rendering code only reads [`snapshot`](TaskStore::snapshot)s.
#[derive(Clone)]
pub struct TaskStore<B: TasksBackend> {
    backend: Arc<Mutex<Option<B>>>,
    state: Arc<Mutex<StoreState>>,
}

impl<B: TasksBackend> Default for TaskStore<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: TasksBackend> TaskStore<B> {
    /// A detached store; every operation fails with
    /// [`StoreError::NotAuthenticated`] until [`attach`](TaskStore::attach).
    pub fn new() -> Self {
        Self {
            backend: Arc::new(Mutex::new(None)),
            state: Arc::new(Mutex::new(StoreState::default())),
        }
    }

    /// Bind the store to a user-scoped backend, discarding any state from
    /// a previous session.
    pub fn attach(&self, backend: B) {
        *self.backend.lock().unwrap() = Some(backend);
        self.reset();
    }

    /// Unbind on sign-out. The collection is cleared immediately; results
    /// of in-flight requests and pending subscription events are
    /// discarded.
    pub fn detach(&self) {
        *self.backend.lock().unwrap() = None;
        self.reset();
    }

    fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        state.list = TaskList::new();
        state.loading = false;
        state.error = None;
        state.epoch += 1;
    }

    pub fn is_attached(&self) -> bool {
        self.backend.lock().unwrap().is_some()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.lock().unwrap();
        StoreSnapshot {
            tasks: state.list.to_vec(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    fn scoped(&self) -> Result<(B, u64), StoreError> {
        let backend = self
            .backend
            .lock()
            .unwrap()
            .clone()
            .ok_or(StoreError::NotAuthenticated)?;
        let epoch = self.state.lock().unwrap().epoch;
        Ok((backend, epoch))
    }

    /// Apply a state change unless the session changed in the meantime.
    fn commit<R>(
        &self,
        epoch: u64,
        apply: impl FnOnce(&mut StoreState) -> R,
    ) -> Result<R, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.epoch != epoch {
            return Err(StoreError::Superseded);
        }
        Ok(apply(&mut state))
    }

    /// Retrieve all of the user's tasks and replace the collection,
    /// newest first. Fail-soft: on error the previous collection stays
    /// untouched and only the error message changes.
    pub async fn fetch_all(&self) -> Result<(), StoreError> {
        let (backend, epoch) = self.scoped()?;
        self.commit(epoch, |s| s.loading = true)?;
        match backend.list().await {
            Ok(rows) => self.commit(epoch, |s| {
                s.loading = false;
                s.error = None;
                s.list.replace_all(rows);
            }),
            Err(e) => {
                tracing::warn!("task fetch failed: {e}");
                self.commit(epoch, |s| {
                    s.loading = false;
                    s.error = Some(e.to_string());
                })?;
                Err(e.into())
            }
        }
    }

    /// Create a task. The backend assigns id and timestamps; the returned
    /// canonical row is prepended to the collection.
    pub async fn add(
        &self,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Result<Task, StoreError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(StoreError::Validation("title must not be empty".into()));
        }
        let (backend, epoch) = self.scoped()?;
        let task = backend.insert(TaskDraft { title, description }).await?;
        self.commit(epoch, |s| {
            s.list.apply(ChangeEvent::Inserted { task: task.clone() })
        })?;
        Ok(task)
    }

    /// Patch a task; on success the backend's canonical row replaces the
    /// local entry. On failure the collection is unchanged.
    pub async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task, StoreError> {
        let (backend, epoch) = self.scoped()?;
        let task = backend.update(id, patch).await?;
        self.commit(epoch, |s| {
            s.list.apply(ChangeEvent::Updated { task: task.clone() })
        })?;
        Ok(task)
    }

    /// Delete a task; on success the entry is removed locally.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let (backend, epoch) = self.scoped()?;
        backend.delete(id).await?;
        self.commit(epoch, |s| {
            s.list.apply(ChangeEvent::Deleted { id: id.to_string() })
        })?;
        Ok(())
    }

    /// Negate the local completion flag and delegate to
    /// [`update`](TaskStore::update). Unknown ids fail with
    /// [`StoreError::NotFound`] without a backend call.
    pub async fn toggle_completion(&self, id: &str) -> Result<Task, StoreError> {
        let completed = {
            let state = self.state.lock().unwrap();
            state.list.get(id).map(|t| t.completed)
        }
        .ok_or(StoreError::NotFound)?;
        self.update(id, TaskPatch::completion(!completed)).await
    }

    /// Fetch the collection and then open the change feed. The feed is
    /// only opened once a baseline fetch has succeeded; live events on
    /// top of an unknown baseline would show rows out of thin air. A
    /// failed fetch returns the error with the subscription left closed,
    /// and a later retry opens it.
    pub async fn fetch_then_subscribe(&self) -> Result<(SyncToken, ChangeFeed), StoreError> {
        self.fetch_all().await?;
        self.subscribe().await
    }

    /// Open the change feed for the attached session. The caller drives
    /// the feed and hands events back through
    /// [`apply_event`](TaskStore::apply_event) with the returned token.
    pub async fn subscribe(&self) -> Result<(SyncToken, ChangeFeed), StoreError> {
        let (backend, epoch) = self.scoped()?;
        let feed = backend.subscribe().await?;
        // The session may have changed while the transport connected.
        self.commit(epoch, |_| ())?;
        Ok((SyncToken { epoch }, feed))
    }

    /// Merge one subscription event. Returns `false` when the token's
    /// session has been superseded and the event was discarded.
    pub fn apply_event(&self, token: &SyncToken, event: ChangeEvent) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.epoch != token.epoch {
            return false;
        }
        state.list.apply(event);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::sync::Semaphore;

    use super::*;
    use crate::memory::{MemoryBackend, MemoryTasks};

    fn attached(service: &MemoryBackend, user: &str) -> TaskStore<MemoryTasks> {
        let store = TaskStore::new();
        store.attach(service.for_user(user));
        store
    }

    #[tokio::test]
    async fn add_then_fetch_contains_server_assigned_row() {
        let service = MemoryBackend::new();
        let store = attached(&service, "u1");

        let task = store.add("Buy milk", Some("2 liters".into())).await.unwrap();
        assert!(!task.id.is_empty());
        assert!(!task.completed);
        assert_eq!(task.user_id, "u1");

        store.fetch_all().await.unwrap();
        let snap = store.snapshot();
        assert_eq!(snap.tasks.len(), 1);
        assert_eq!(snap.tasks[0].title, "Buy milk");
        assert_eq!(snap.tasks[0].description.as_deref(), Some("2 liters"));
        assert_eq!(snap.tasks[0].id, task.id);
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn new_task_is_prepended() {
        let service = MemoryBackend::new();
        let store = attached(&service, "u1");

        store.add("first", None).await.unwrap();
        let second = store.add("second", None).await.unwrap();
        assert_eq!(store.snapshot().tasks[0].id, second.id);
    }

    #[tokio::test]
    async fn operations_require_an_attached_session() {
        let store = TaskStore::<MemoryTasks>::new();
        assert_eq!(
            store.add("Buy milk", None).await.unwrap_err(),
            StoreError::NotAuthenticated
        );
        assert_eq!(
            store.fetch_all().await.unwrap_err(),
            StoreError::NotAuthenticated
        );
        assert_eq!(
            store.delete("nope").await.unwrap_err(),
            StoreError::NotAuthenticated
        );
    }

    #[tokio::test]
    async fn empty_title_is_rejected_before_any_call() {
        let service = MemoryBackend::new();
        let store = attached(&service, "u1");

        let err = store.add("   ", None).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(service.for_user("u1").list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_twice_returns_to_original_state() {
        let service = MemoryBackend::new();
        let store = attached(&service, "u1");

        let task = store.add("Buy milk", None).await.unwrap();

        let toggled = store.toggle_completion(&task.id).await.unwrap();
        assert!(toggled.completed);
        assert!(toggled.updated_at > toggled.created_at);

        let back = store.toggle_completion(&task.id).await.unwrap();
        assert!(!back.completed);
    }

    #[tokio::test]
    async fn toggle_of_unknown_id_is_not_found_without_backend_call() {
        let service = MemoryBackend::new();
        let store = attached(&service, "u1");
        assert_eq!(
            store.toggle_completion("missing").await.unwrap_err(),
            StoreError::NotFound
        );
    }

    #[tokio::test]
    async fn delete_removes_row_everywhere() {
        let service = MemoryBackend::new();
        let store = attached(&service, "u1");

        let task = store.add("Buy milk", None).await.unwrap();
        store.delete(&task.id).await.unwrap();

        assert!(store.snapshot().tasks.is_empty());
        store.fetch_all().await.unwrap();
        assert!(store.snapshot().tasks.is_empty());
    }

    #[tokio::test]
    async fn detach_clears_the_collection_immediately() {
        let service = MemoryBackend::new();
        let store = attached(&service, "u1");
        store.add("Buy milk", None).await.unwrap();

        store.detach();
        assert!(store.snapshot().tasks.is_empty());
        assert!(!store.is_attached());
    }

    /// Backend whose `list` reports transport failures on demand, counting
    /// how often a feed was opened.
    #[derive(Clone)]
    struct FlakyBackend {
        inner: MemoryTasks,
        fail_list: Arc<AtomicBool>,
        subscribes: Arc<AtomicUsize>,
    }

    impl TasksBackend for FlakyBackend {
        async fn list(&self) -> Result<Vec<Task>, BackendError> {
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(BackendError::Transport("connection reset".into()));
            }
            self.inner.list().await
        }
        async fn insert(&self, draft: TaskDraft) -> Result<Task, BackendError> {
            self.inner.insert(draft).await
        }
        async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task, BackendError> {
            self.inner.update(id, patch).await
        }
        async fn delete(&self, id: &str) -> Result<(), BackendError> {
            self.inner.delete(id).await
        }
        async fn subscribe(&self) -> Result<ChangeFeed, BackendError> {
            self.subscribes.fetch_add(1, Ordering::SeqCst);
            self.inner.subscribe().await
        }
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_collection() {
        let service = MemoryBackend::new();
        let fail_list = Arc::new(AtomicBool::new(false));
        let store = TaskStore::new();
        store.attach(FlakyBackend {
            inner: service.for_user("u1"),
            fail_list: fail_list.clone(),
            subscribes: Arc::new(AtomicUsize::new(0)),
        });

        store.add("Buy milk", None).await.unwrap();
        store.fetch_all().await.unwrap();

        fail_list.store(true, Ordering::SeqCst);
        let err = store.fetch_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));

        let snap = store.snapshot();
        assert_eq!(snap.tasks.len(), 1, "prior collection must survive");
        assert!(snap.error.is_some());
        assert!(!snap.loading);
    }

    #[tokio::test]
    async fn feed_is_not_opened_until_a_baseline_fetch_succeeds() {
        let service = MemoryBackend::new();
        let other_tab = service.for_user("u1");
        let fail_list = Arc::new(AtomicBool::new(true));
        let subscribes = Arc::new(AtomicUsize::new(0));
        let store = TaskStore::new();
        store.attach(FlakyBackend {
            inner: service.for_user("u1"),
            fail_list: fail_list.clone(),
            subscribes: subscribes.clone(),
        });

        let err = store.fetch_then_subscribe().await.map(|_| ()).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(
            subscribes.load(Ordering::SeqCst),
            0,
            "no feed without a baseline"
        );

        // The retry succeeds and only then opens the feed.
        fail_list.store(false, Ordering::SeqCst);
        let (token, mut feed) = store.fetch_then_subscribe().await.unwrap();
        assert_eq!(subscribes.load(Ordering::SeqCst), 1);

        other_tab
            .insert(TaskDraft {
                title: "after the retry".into(),
                description: None,
            })
            .await
            .unwrap();
        let event = feed.next().await.unwrap();
        assert!(store.apply_event(&token, event));
        assert_eq!(store.snapshot().tasks.len(), 1);
    }

    #[tokio::test]
    async fn loading_is_visible_while_a_fetch_is_in_flight() {
        let service = MemoryBackend::new();
        let gate = Arc::new(Semaphore::new(0));
        let store = TaskStore::new();
        store.attach(GatedBackend {
            inner: service.for_user("u1"),
            gate: gate.clone(),
        });

        let fetch = {
            let store = store.clone();
            tokio::spawn(async move { store.fetch_all().await })
        };
        tokio::task::yield_now().await;
        assert!(store.snapshot().loading, "flag must hold for the duration");

        gate.add_permits(1);
        fetch.await.unwrap().unwrap();
        assert!(!store.snapshot().loading);
    }

    /// Backend whose `list` parks on a semaphore so a test can interleave
    /// a sign-out with an in-flight fetch.
    #[derive(Clone)]
    struct GatedBackend {
        inner: MemoryTasks,
        gate: Arc<Semaphore>,
    }

    impl TasksBackend for GatedBackend {
        async fn list(&self) -> Result<Vec<Task>, BackendError> {
            let _permit = self.gate.acquire().await.unwrap();
            self.inner.list().await
        }
        async fn insert(&self, draft: TaskDraft) -> Result<Task, BackendError> {
            self.inner.insert(draft).await
        }
        async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task, BackendError> {
            self.inner.update(id, patch).await
        }
        async fn delete(&self, id: &str) -> Result<(), BackendError> {
            self.inner.delete(id).await
        }
        async fn subscribe(&self) -> Result<ChangeFeed, BackendError> {
            self.inner.subscribe().await
        }
    }

    #[tokio::test]
    async fn in_flight_fetch_is_discarded_after_sign_out() {
        let service = MemoryBackend::new();
        let backend = service.for_user("u1");
        backend
            .insert(TaskDraft {
                title: "stale".into(),
                description: None,
            })
            .await
            .unwrap();

        let gate = Arc::new(Semaphore::new(0));
        let store = TaskStore::new();
        store.attach(GatedBackend {
            inner: backend,
            gate: gate.clone(),
        });

        let fetch = {
            let store = store.clone();
            tokio::spawn(async move { store.fetch_all().await })
        };
        tokio::task::yield_now().await;

        store.detach();
        gate.add_permits(1);

        let result = fetch.await.unwrap();
        assert!(matches!(result, Err(StoreError::Superseded)));
        assert!(
            store.snapshot().tasks.is_empty(),
            "no stale-user data may remain visible"
        );
    }

    #[tokio::test]
    async fn subscription_mirrors_another_sessions_changes() {
        let service = MemoryBackend::new();
        let store = attached(&service, "u1");
        let other_tab = service.for_user("u1");

        store.fetch_all().await.unwrap();
        let (token, mut feed) = store.subscribe().await.unwrap();

        // Insert from another session arrives as an event.
        let created = other_tab
            .insert(TaskDraft {
                title: "from the other tab".into(),
                description: None,
            })
            .await
            .unwrap();
        let event = feed.next().await.unwrap();
        assert!(store.apply_event(&token, event));
        assert_eq!(store.snapshot().tasks.len(), 1);

        // Replaying the same insert never duplicates the entry.
        assert!(store.apply_event(
            &token,
            ChangeEvent::Inserted {
                task: created.clone()
            }
        ));
        assert_eq!(store.snapshot().tasks.len(), 1);

        // Remote edits and deletes flow through the same rule.
        other_tab
            .update(&created.id, TaskPatch::completion(true))
            .await
            .unwrap();
        let event = feed.next().await.unwrap();
        assert!(store.apply_event(&token, event));
        assert!(store.snapshot().tasks[0].completed);

        other_tab.delete(&created.id).await.unwrap();
        let event = feed.next().await.unwrap();
        assert!(store.apply_event(&token, event));
        assert!(store.snapshot().tasks.is_empty());
    }

    #[tokio::test]
    async fn events_after_sign_out_are_discarded() {
        let service = MemoryBackend::new();
        let store = attached(&service, "u1");
        store.fetch_all().await.unwrap();
        let (token, mut feed) = store.subscribe().await.unwrap();

        service
            .for_user("u1")
            .insert(TaskDraft {
                title: "late arrival".into(),
                description: None,
            })
            .await
            .unwrap();
        let event = feed.next().await.unwrap();

        store.detach();
        assert!(!store.apply_event(&token, event));
        assert!(store.snapshot().tasks.is_empty());
    }

    #[tokio::test]
    async fn concurrent_updates_last_response_wins() {
        let service = MemoryBackend::new();
        let store = attached(&service, "u1");
        let backend = service.for_user("u1");

        let task = store.add("Buy milk", None).await.unwrap();
        let (token, _feed) = store.subscribe().await.unwrap();

        // Two updates issued in quick succession; the store does not
        // serialize them, so their responses can land in either order.
        let first = backend
            .update(&task.id, TaskPatch::edit("first", None))
            .await
            .unwrap();
        let second = backend
            .update(&task.id, TaskPatch::edit("second", None))
            .await
            .unwrap();

        // Here the earlier request's response arrives last and wins,
        // which is the documented last-write-wins behavior.
        store.apply_event(&token, ChangeEvent::Updated { task: second });
        store.apply_event(&token, ChangeEvent::Updated { task: first });
        assert_eq!(store.snapshot().tasks[0].title, "first");
    }
}
