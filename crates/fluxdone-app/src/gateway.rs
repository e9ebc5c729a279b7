//! Persistence gateway abstraction used by [`crate::TaskMediator`].

use std::sync::Arc;

use anyhow::Error;
use fluxdone_core::{Category, NewTask, Task, TaskId};
use fluxdone_store_http::{HttpStore, HttpStoreError};

/// Remote persistence the mediator confirms every mutation with.
///
/// Methods are async; each call is the single suspension point of a mediated
/// operation.
#[allow(async_fn_in_trait)]
pub trait TaskGateway: Send + Sync {
    /// Error type bubbled up from the backend.
    type Error: Into<Error> + Send;

    /// Load the tasks for `category`.
    ///
    /// # Errors
    /// Returns a backend-specific error when the listing fails.
    async fn fetch_tasks(&self, category: &Category) -> Result<Vec<Task>, Self::Error>;

    /// Persist a candidate and return it with its assigned id.
    ///
    /// # Errors
    /// Returns a backend-specific error when the task cannot be created.
    async fn create_task(&self, candidate: &NewTask) -> Result<Task, Self::Error>;

    /// Overwrite the completion flag of a task.
    ///
    /// # Errors
    /// Returns a backend-specific error when the update is rejected.
    async fn set_completion(&self, id: TaskId, completed: bool) -> Result<(), Self::Error>;

    /// Delete a task.
    ///
    /// # Errors
    /// Returns a backend-specific error when the deletion is rejected.
    async fn delete_task(&self, id: TaskId) -> Result<(), Self::Error>;
}

impl TaskGateway for HttpStore {
    type Error = HttpStoreError;

    async fn fetch_tasks(&self, category: &Category) -> Result<Vec<Task>, Self::Error> {
        Self::fetch_tasks(self, category.as_str()).await
    }

    async fn create_task(&self, candidate: &NewTask) -> Result<Task, Self::Error> {
        Self::create_task(self, candidate).await
    }

    async fn set_completion(&self, id: TaskId, completed: bool) -> Result<(), Self::Error> {
        Self::set_completion(self, id, completed).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), Self::Error> {
        Self::delete_task(self, id).await
    }
}

impl<G: TaskGateway> TaskGateway for Arc<G> {
    type Error = G::Error;

    async fn fetch_tasks(&self, category: &Category) -> Result<Vec<Task>, Self::Error> {
        G::fetch_tasks(self, category).await
    }

    async fn create_task(&self, candidate: &NewTask) -> Result<Task, Self::Error> {
        G::create_task(self, candidate).await
    }

    async fn set_completion(&self, id: TaskId, completed: bool) -> Result<(), Self::Error> {
        G::set_completion(self, id, completed).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), Self::Error> {
        G::delete_task(self, id).await
    }
}
