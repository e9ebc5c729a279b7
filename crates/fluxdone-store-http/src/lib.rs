//! REST-backed persistence for FluxDone tasks.
//!
//! The backend exposes `GET /tasks?list=`, `POST /tasks`, `PATCH /tasks/{id}` and
//! `DELETE /tasks/{id}` relative to a configurable base URL. Any non-2xx status
//! is reported as [`HttpStoreError::Status`].

/// Error types for HTTP store operations.
pub mod error;

pub use error::HttpStoreError;

use std::time::Duration;

use fluxdone_core::{NewTask, Task, TaskId};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result alias for HTTP store calls.
pub type Result<T> = std::result::Result<T, HttpStoreError>;

/// Task persistence over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

// Older backends wrap listings as `{"tasks": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskListBody {
    Wrapped { tasks: Vec<Task> },
    Bare(Vec<Task>),
}

#[derive(Serialize)]
struct CompletionPatch {
    completed: bool,
}

impl HttpStore {
    /// Create a store rooted at `base_url` (e.g. `http://localhost:8080/api`).
    ///
    /// # Errors
    /// Returns an error if the URL is malformed or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Same as [`new`](Self::new) with an optional per-request timeout.
    ///
    /// # Errors
    /// Returns an error if the URL is malformed or the HTTP client cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed).map_err(|err| HttpStoreError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: err.to_string(),
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: trimmed.to_owned(),
        })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn task_url(&self, id: TaskId) -> String {
        format!("{}/tasks/{id}", self.base_url)
    }

    /// Fetch the tasks of a list or computed category.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status, or malformed JSON.
    pub async fn fetch_tasks(&self, list: &str) -> Result<Vec<Task>> {
        debug!(list, "fetching tasks");
        let response = self
            .client
            .get(self.tasks_url())
            .query(&[("list", list)])
            .send()
            .await?;
        let body = Self::success_body(response).await?;
        let tasks = match serde_json::from_str(&body)? {
            TaskListBody::Wrapped { tasks } | TaskListBody::Bare(tasks) => tasks,
        };
        debug!(list, count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    /// Persist a new task and return it with its assigned id.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status, or malformed JSON.
    pub async fn create_task(&self, candidate: &NewTask) -> Result<Task> {
        debug!(title = %candidate.title, list = %candidate.list, "creating task");
        let response = self
            .client
            .post(self.tasks_url())
            .json(candidate)
            .send()
            .await?;
        let body = Self::success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Overwrite the completion flag of a task.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    pub async fn set_completion(&self, id: TaskId, completed: bool) -> Result<()> {
        debug!(%id, completed, "updating completion");
        let response = self
            .client
            .patch(self.task_url(id))
            .json(&CompletionPatch { completed })
            .send()
            .await?;
        Self::success_body(response).await.map(|_| ())
    }

    /// Delete a task.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    pub async fn delete_task(&self, id: TaskId) -> Result<()> {
        debug!(%id, "deleting task");
        let response = self.client.delete(self.task_url(id)).send().await?;
        Self::success_body(response).await.map(|_| ())
    }

    async fn success_body(response: Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(HttpStoreError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
