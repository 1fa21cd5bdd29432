//! # Domain models for tasks and profiles
//!
//! Defines the data structures shared between the backend client, the
//! [`crate::TaskStore`], and the UI. These types are `Serialize + Deserialize`
//! so they can cross the wire to the hosted service unchanged.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`Task`] | One row of the service's `tasks` table: id, title, optional description, completion flag, audit timestamps, and the owning `user_id`. |
//! | [`TaskDraft`] | The caller-supplied fields of a new task. The owning `user_id` is attached by the backend client, never by the caller. |
//! | [`TaskPatch`] | A partial update. Unset fields are omitted from the request; `description: Some(None)` clears the column. |
//! | [`Profile`] | Row shape of the service's `profiles` table; modeled but not exercised by the core task flows. |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user-owned to-do item, exactly as the backend stores it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Backend-assigned row id; never generated client-side.
    pub id: String,
    pub title: String,
    /// Optional free text. `None` is distinct from an empty string.
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    /// Always >= `created_at`; advanced by the backend on every write.
    pub updated_at: DateTime<Utc>,
    /// Owning user's id. A row is only ever visible to its owner.
    pub user_id: String,
}

/// Fields for a new task.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A partial update to an existing task.
///
/// The double `Option` on `description` distinguishes "leave untouched"
/// (`None`) from "clear to NULL" (`Some(None)`).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch that only flips the completion flag.
    pub fn completion(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Patch produced by the inline edit form: sets the title and sets or
    /// clears the description.
    pub fn edit(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description),
            completed: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// Apply this patch to a row, the way the backend does before
    /// returning the canonical result.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Row shape of the service's `profiles` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = TaskPatch::completion(true);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "completed": true }));
    }

    #[test]
    fn patch_clears_description_with_explicit_null() {
        let patch = TaskPatch::edit("Buy milk", None);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "title": "Buy milk", "description": null })
        );
    }

    #[test]
    fn patch_applies_in_order() {
        let mut task = Task {
            id: "t1".into(),
            title: "old".into(),
            description: Some("keep".into()),
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            user_id: "u1".into(),
        };
        TaskPatch::completion(true).apply_to(&mut task);
        assert!(task.completed);
        assert_eq!(task.description.as_deref(), Some("keep"));

        TaskPatch::edit("new", None).apply_to(&mut task);
        assert_eq!(task.title, "new");
        assert_eq!(task.description, None);
    }
}
