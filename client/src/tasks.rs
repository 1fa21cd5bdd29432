//! REST client for the `tasks` table.

use serde::Serialize;

use store::{BackendError, ChangeFeed, Task, TaskDraft, TaskPatch, TasksBackend};

use crate::config::Config;
use crate::error::{rest_error, ClientError};
use crate::realtime;
use crate::session::Session;

/// [`TasksBackend`] over the service's REST API, bound to one signed-in
/// session.
///
/// Every request carries the session's bearer token and an explicit
/// `user_id` filter. The service enforces row ownership on its side; the
/// filter here is defense in depth, not the sole guarantee.
#[derive(Clone)]
pub struct TasksClient {
    http: reqwest::Client,
    config: Config,
    session: Session,
}

/// Insert body with the owner forced from the session, so a caller can
/// never attach someone else's `user_id`.
#[derive(Serialize)]
struct InsertRow<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    user_id: &'a str,
}

impl TasksClient {
    pub fn new(config: Config, session: Session) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.session.access_token)
    }

    fn owner_filter(&self) -> String {
        format!("eq.{}", self.session.user_id())
    }

    async fn read_rows(response: reqwest::Response) -> Result<Vec<Task>, ClientError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        if !(200..300).contains(&status) {
            return Err(rest_error(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn fetch(&self) -> Result<Vec<Task>, ClientError> {
        let response = self
            .authed(self.http.get(self.config.rest_url("tasks")))
            .query(&[
                ("select", "*"),
                ("user_id", &self.owner_filter()),
                ("order", "created_at.desc"),
            ])
            .send()
            .await?;
        Self::read_rows(response).await
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, ClientError> {
        let row = InsertRow {
            title: &draft.title,
            description: draft.description.as_deref(),
            user_id: self.session.user_id(),
        };
        let response = self
            .authed(self.http.post(self.config.rest_url("tasks")))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let mut rows = Self::read_rows(response).await?;
        rows.pop()
            .ok_or_else(|| ClientError::Decode("insert returned no row".into()))
    }

    async fn patch(&self, id: &str, patch: &TaskPatch) -> Result<Task, ClientError> {
        let response = self
            .authed(self.http.patch(self.config.rest_url("tasks")))
            .query(&[
                ("id", &format!("eq.{id}")),
                ("user_id", &self.owner_filter()),
            ])
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;
        let mut rows = Self::read_rows(response).await?;
        // Zero affected rows: missing or owned by someone else. Either
        // way the caller learns nothing beyond "not permitted".
        rows.pop().ok_or(ClientError::Forbidden)
    }

    async fn remove(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .authed(self.http.delete(self.config.rest_url("tasks")))
            .query(&[
                ("id", &format!("eq.{id}")),
                ("user_id", &self.owner_filter()),
            ])
            .send()
            .await?;
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(rest_error(status, &body))
        }
    }
}

impl TasksBackend for TasksClient {
    async fn list(&self) -> Result<Vec<Task>, BackendError> {
        self.fetch().await.map_err(Into::into)
    }

    async fn insert(&self, draft: TaskDraft) -> Result<Task, BackendError> {
        self.create(&draft).await.map_err(Into::into)
    }

    async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task, BackendError> {
        self.patch(id, &patch).await.map_err(Into::into)
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        self.remove(id).await.map_err(Into::into)
    }

    async fn subscribe(&self) -> Result<ChangeFeed, BackendError> {
        realtime::subscribe(&self.config, &self.session)
            .await
            .map_err(Into::into)
    }
}
