//! Typed change-notification stream delivered by the backend.
//!
//! Remote row changes arrive as [`ChangeEvent`]s over a [`ChangeFeed`], a
//! bounded-lifetime subscription: dropping the feed closes it, and senders
//! observe the closed channel and stop delivery.

use futures::channel::mpsc;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::models::Task;

/// One remote row change, scoped to the subscribed user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A row was inserted, possibly by another session of the same user.
    Inserted { task: Task },
    /// A row was updated; carries the full new row.
    Updated { task: Task },
    /// A row was deleted. Only the id is guaranteed to be present in the
    /// notification.
    Deleted { id: String },
}

impl ChangeEvent {
    /// Id of the affected row.
    pub fn id(&self) -> &str {
        match self {
            ChangeEvent::Inserted { task } | ChangeEvent::Updated { task } => &task.id,
            ChangeEvent::Deleted { id } => id,
        }
    }
}

/// Receiving end of a change subscription.
///
/// Dropped on sign-out or store teardown; the sending side notices the
/// closed channel and tears the underlying transport down.
pub struct ChangeFeed {
    rx: mpsc::UnboundedReceiver<ChangeEvent>,
}

impl ChangeFeed {
    /// Create a feed together with its sending half.
    pub fn channel() -> (ChangeSender, ChangeFeed) {
        let (tx, rx) = mpsc::unbounded();
        (ChangeSender { tx }, ChangeFeed { rx })
    }

    /// Next event, or `None` once the subscription is closed.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        self.rx.next().await
    }

    /// Non-blocking variant of [`next`](ChangeFeed::next); `None` when no
    /// event is currently buffered.
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        self.rx.try_next().ok().flatten()
    }
}

/// Sending half of a change subscription.
#[derive(Clone)]
pub struct ChangeSender {
    tx: mpsc::UnboundedSender<ChangeEvent>,
}

impl ChangeSender {
    /// Deliver one event. Returns `false` once the receiving feed is gone.
    pub fn send(&self, event: ChangeEvent) -> bool {
        self.tx.unbounded_send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
