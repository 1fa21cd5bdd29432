//! The async interface every task backend implements.

use thiserror::Error;

use crate::event::ChangeFeed;
use crate::models::{Task, TaskDraft, TaskPatch};

/// Failure surfaced by a [`TasksBackend`] implementation.
///
/// Authorization failures are deliberately generic: the backend never
/// reveals whether a row exists under another owner.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BackendError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error("operation not permitted")]
    Forbidden,
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("backend unavailable: {0}")]
    Transport(String),
    #[error("malformed backend response: {0}")]
    Decode(String),
}

/// Async interface to the hosted `tasks` table, already scoped to one
/// authenticated user. Implementations attach the user's identity to every
/// request themselves; callers cannot widen the scope.
///
/// Implementations live in sibling modules ([`crate::memory`]) and in the
/// service client crate.
pub trait TasksBackend: Clone + 'static {
    /// All of the user's tasks, newest first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Task>, BackendError>>;
    /// Insert a new row; returns the canonical row with the server-assigned
    /// id and timestamps.
    fn insert(
        &self,
        draft: TaskDraft,
    ) -> impl std::future::Future<Output = Result<Task, BackendError>>;
    /// Patch an existing row; returns the updated canonical row.
    fn update(
        &self,
        id: &str,
        patch: TaskPatch,
    ) -> impl std::future::Future<Output = Result<Task, BackendError>>;
    /// Delete a row. Deleting an already-absent row is not an error.
    fn delete(&self, id: &str) -> impl std::future::Future<Output = Result<(), BackendError>>;
    /// Open a change feed for rows owned by this user.
    fn subscribe(&self) -> impl std::future::Future<Output = Result<ChangeFeed, BackendError>>;
}
