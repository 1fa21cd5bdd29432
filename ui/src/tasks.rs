//! The task-collection hook: binds a [`TaskStore`] to the session.
//!
//! [`use_tasks`] attaches a fresh REST backend whenever a session appears,
//! detaches (clearing the collection immediately) when it goes away, and
//! drives the live change feed in a background task that is cancelled on
//! every session change so stale events never reach the new state. The
//! feed is only opened once the baseline fetch for the session succeeded;
//! a retry opens it after a later successful fetch.

use client::{Config, TasksClient};
use dioxus::prelude::*;
use store::{StoreError, StoreSnapshot, TaskPatch, TaskStore};

use crate::auth::use_auth;

/// Handle returned by [`use_tasks`]. `Copy`, so event handlers can capture
/// it freely.
#[derive(Clone, Copy)]
pub struct TasksHandle {
    store: Signal<TaskStore<TasksClient>>,
    snapshot: Signal<StoreSnapshot>,
    /// Failure of the most recent mutation, for the dashboard banner.
    action_error: Signal<Option<String>>,
    /// The background task driving the change feed, if one is running.
    feed_task: Signal<Option<Task>>,
}

/// Bind the task collection to the current session.
pub fn use_tasks() -> TasksHandle {
    let auth = use_auth();
    let config = use_context::<Config>();
    let store = use_signal(TaskStore::<TasksClient>::new);
    let mut snapshot = use_signal(StoreSnapshot::default);
    let mut action_error = use_signal(|| Option::<String>::None);
    let feed_task = use_signal(|| Option::<Task>::None);

    let handle = TasksHandle {
        store,
        snapshot,
        action_error,
        feed_task,
    };

    use_effect(move || {
        let session = auth().session;

        // The previous session's feed must stop before the store is
        // rebound; a cancelled task drops its feed, closing the transport.
        handle.stop_sync();
        action_error.set(None);

        let st = store.peek().clone();
        let Some(session) = session else {
            st.detach();
            snapshot.set(st.snapshot());
            return;
        };

        st.attach(TasksClient::new(config.clone(), session));
        snapshot.set(st.snapshot());
        handle.start_sync();
    });

    handle
}

impl TasksHandle {
    pub fn snapshot(&self) -> StoreSnapshot {
        (self.snapshot)()
    }

    pub fn action_error(&self) -> Option<String> {
        (self.action_error)()
    }

    pub fn dismiss_error(mut self) {
        self.action_error.set(None);
    }

    /// Refetch the collection; used by the error banner's retry. A
    /// success reopens the feed, covering the case where the first fetch
    /// of the session failed and no subscription exists yet.
    pub fn refresh(self) {
        self.start_sync();
    }

    fn stop_sync(mut self) {
        if let Some(running) = self.feed_task.peek().as_ref() {
            running.cancel();
        }
        self.feed_task.set(None);
    }

    /// Fetch a baseline and, only when that succeeds, drive the change
    /// feed until it closes or the session changes.
    fn start_sync(mut self) {
        self.stop_sync();
        // Observable immediately; the store flips it back when the fetch
        // settles.
        self.snapshot.write().loading = true;

        let st = self.store.peek().clone();
        let mut snapshot = self.snapshot;
        let task = spawn(async move {
            let subscription = st.fetch_then_subscribe().await;
            snapshot.set(st.snapshot());
            match subscription {
                Ok((token, mut feed)) => {
                    while let Some(event) = feed.next().await {
                        if !st.apply_event(&token, event) {
                            break;
                        }
                        snapshot.set(st.snapshot());
                    }
                }
                // Fetch failures are already on the snapshot; a session
                // change made the result irrelevant.
                Err(StoreError::Superseded) | Err(StoreError::NotAuthenticated) => {}
                Err(e) => tracing::warn!("change subscription unavailable: {e}"),
            }
        });
        self.feed_task.set(Some(task));
    }

    /// Publish the store's state after a mutation settled.
    fn finish<T>(mut self, result: Result<T, StoreError>) {
        let st = self.store.peek().clone();
        self.snapshot.set(st.snapshot());
        match result {
            Ok(_) => self.action_error.set(None),
            // A session change already reset the view; nothing to report.
            Err(StoreError::Superseded) => {}
            Err(e) => self.action_error.set(Some(e.to_string())),
        }
    }

    pub async fn add(self, title: String, description: Option<String>) {
        let st = self.store.peek().clone();
        let result = st.add(title, description).await;
        self.finish(result);
    }

    pub async fn toggle(self, id: String) {
        let st = self.store.peek().clone();
        let result = st.toggle_completion(&id).await;
        self.finish(result);
    }

    pub async fn edit(self, id: String, title: String, description: Option<String>) {
        let st = self.store.peek().clone();
        let result = st.update(&id, TaskPatch::edit(title, description)).await;
        self.finish(result);
    }

    pub async fn remove(self, id: String) {
        let st = self.store.peek().clone();
        let result = st.delete(&id).await;
        self.finish(result);
    }
}
