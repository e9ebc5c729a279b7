//! Task operations mediated through a [`TaskGateway`].
//!
//! The local [`TaskStore`] only ever reflects changes the gateway confirmed:
//! every mutation awaits the backend first and touches the store afterwards.
//! Operations on the same task id are serialized, so an operation that waited
//! behind another re-validates against the store the first one left behind.
//!
//! Lock order is store before view wherever both are held.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use fluxdone_core::{
    Category, CategoryCounts, Clock, NewTask, Priority, SortMode, Task, TaskId, select_view,
};
use time::OffsetDateTime;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::FluxConfig;
use crate::error::{TaskOp, TaskOpError};
use crate::events::StoreEvent;
use crate::gateway::TaskGateway;
use crate::task_store::TaskStore;

const EVENT_CAPACITY: usize = 64;

/// Category and sort mode currently shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Active category.
    pub category: Category,
    /// Active sort mode.
    pub sort: SortMode,
}

/// Input for [`TaskMediator::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTask {
    /// Raw title; trimmed before use.
    pub title: String,
    /// Requested priority.
    pub priority: Priority,
    /// Target list; `None` or a computed category means the active/default list.
    pub list: Option<String>,
    /// Optional due instant.
    pub due_date: Option<OffsetDateTime>,
}

impl AddTask {
    /// Request with default priority in the active list.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            priority: Priority::default(),
            list: None,
            due_date: None,
        }
    }

    /// Set the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Target an explicit list.
    #[must_use]
    pub fn list(mut self, list: impl Into<String>) -> Self {
        self.list = Some(list.into());
        self
    }

    /// Set a due date.
    #[must_use]
    pub const fn due(mut self, due_date: OffsetDateTime) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

type TaskLock = Arc<tokio::sync::Mutex<()>>;

/// Per-task async locks held across the gateway call.
///
/// An entry lives only while some operation holds or waits for it.
#[derive(Default)]
struct TaskLocks {
    inner: Mutex<HashMap<TaskId, TaskLock>>,
}

impl TaskLocks {
    /// Run `op` while holding the lock for `id`.
    async fn exclusive<T>(&self, id: TaskId, op: impl Future<Output = T>) -> T {
        let lock = Arc::clone(guard(&self.inner).entry(id).or_default());
        let _release = Release {
            locks: self,
            id,
            lock: &lock,
        };
        let _held = lock.lock().await;
        op.await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        guard(&self.inner).len()
    }
}

/// Drops the map entry on the way out unless another operation still references it.
struct Release<'a> {
    locks: &'a TaskLocks,
    id: TaskId,
    lock: &'a TaskLock,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        let mut map = guard(&self.locks.inner);
        // Clones are only taken under the map lock: two means the map and us.
        let idle = map
            .get(&self.id)
            .is_some_and(|entry| Arc::ptr_eq(entry, self.lock) && Arc::strong_count(entry) == 2);
        if idle {
            map.remove(&self.id);
        }
    }
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the task store and view state; the single entry point for presentation layers.
pub struct TaskMediator<G> {
    gateway: G,
    clock: Arc<dyn Clock>,
    default_list: String,
    store: RwLock<TaskStore>,
    view: RwLock<ViewState>,
    locks: TaskLocks,
    events: broadcast::Sender<StoreEvent>,
}

impl<G> TaskMediator<G> {
    /// Create a mediator with an empty store, the inbox as default list and custom sort.
    #[must_use]
    pub fn new(gateway: G, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            gateway,
            clock,
            default_list: fluxdone_core::category::INBOX.to_owned(),
            store: RwLock::new(TaskStore::default()),
            view: RwLock::new(ViewState::default()),
            locks: TaskLocks::default(),
            events,
        }
    }

    /// Create a mediator using the clock, default list and sort from `config`.
    #[must_use]
    pub fn from_config(gateway: G, config: &FluxConfig) -> Self {
        let view = ViewState {
            category: Category::from(config.view.default_list.as_str()),
            sort: config.view.default_sort,
        };
        Self::new(gateway, config.clock())
            .with_default_list(config.view.default_list.clone())
            .with_view(view)
    }

    /// List that receives tasks added while a computed category is active.
    #[must_use]
    pub fn with_default_list(mut self, list: impl Into<String>) -> Self {
        self.default_list = list.into();
        self
    }

    /// Initial category and sort mode.
    #[must_use]
    pub fn with_view(mut self, view: ViewState) -> Self {
        self.view = RwLock::new(view);
        self
    }

    /// Borrow the gateway.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Receive a [`StoreEvent`] after every confirmed change.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Current view settings.
    #[must_use]
    pub fn view_state(&self) -> ViewState {
        self.read_view().clone()
    }

    /// Change the active category without refetching.
    pub fn switch_category(&self, category: Category) {
        debug!(%category, "switching category");
        self.write_view().category = category.clone();
        self.notify(StoreEvent::CategoryChanged(category));
    }

    /// Change the sort mode.
    pub fn set_sort(&self, sort: SortMode) {
        self.write_view().sort = sort;
        self.notify(StoreEvent::SortChanged(sort));
    }

    /// Filtered and sorted tasks for the active category.
    #[must_use]
    pub fn view(&self) -> Vec<Task> {
        let now = self.clock.now();
        let store = self.read_store();
        let ViewState { category, sort } = self.view_state();
        select_view(store.all(), &category, sort, now)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Filtered and sorted tasks for an arbitrary category.
    #[must_use]
    pub fn view_of(&self, category: &Category, sort: SortMode) -> Vec<Task> {
        let now = self.clock.now();
        let store = self.read_store();
        select_view(store.all(), category, sort, now)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Incomplete-task counts over the whole store.
    #[must_use]
    pub fn counts(&self) -> CategoryCounts {
        let now = self.clock.now();
        CategoryCounts::compute(self.read_store().all(), now)
    }

    /// Copy of every stored task in insertion order.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.read_store().all().to_vec()
    }

    /// Copy of a single stored task.
    #[must_use]
    pub fn find(&self, id: TaskId) -> Option<Task> {
        self.read_store().find_by_id(id).cloned()
    }

    /// Current instant according to the injected clock.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    fn notify(&self, event: StoreEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    fn read_store(&self) -> RwLockReadGuard<'_, TaskStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, TaskStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_view(&self) -> RwLockReadGuard<'_, ViewState> {
        self.view.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_view(&self) -> RwLockWriteGuard<'_, ViewState> {
        self.view.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<G: TaskGateway> TaskMediator<G> {
    /// Replace the store with the gateway's tasks for `category` and make it active.
    ///
    /// # Errors
    /// Returns [`TaskOpError::Persistence`] when the fetch fails; the store is kept as is.
    pub async fn load(&self, category: Category) -> Result<usize, TaskOpError> {
        let tasks = match self.gateway.fetch_tasks(&category).await {
            Ok(tasks) => tasks,
            Err(err) => {
                let err = TaskOpError::persistence(TaskOp::Load, err);
                warn!(%category, error = %err, "fetching tasks failed");
                return Err(err);
            }
        };

        let (count, dropped) = {
            let mut store = self.write_store();
            let dropped = store.replace_all(tasks);
            self.write_view().category = category.clone();
            (store.len(), dropped)
        };
        info!(%category, count, dropped, "loaded tasks");
        self.notify(StoreEvent::Reloaded { category, count });
        Ok(count)
    }

    /// Refetch the active category.
    ///
    /// # Errors
    /// Returns [`TaskOpError::Persistence`] when the fetch fails.
    pub async fn refresh(&self) -> Result<usize, TaskOpError> {
        let category = self.view_state().category;
        self.load(category).await
    }

    /// Create a task and insert the confirmed result.
    ///
    /// # Errors
    /// - [`TaskOpError::Validation`] for a blank title or list, before any gateway call.
    /// - [`TaskOpError::Persistence`] when the gateway rejects the task or returns one
    ///   that is invalid or has a duplicate id.
    pub async fn add(&self, request: AddTask) -> Result<Task, TaskOpError> {
        let AddTask {
            title,
            priority,
            list,
            due_date,
        } = request;

        let category = list.map_or_else(
            || self.view_state().category,
            |raw| Category::from(raw.trim()),
        );
        let target = category.target_list(&self.default_list);
        let candidate =
            NewTask::new(&title, priority, target, self.clock.now())?.with_due_date(due_date);

        let created = match self.gateway.create_task(&candidate).await {
            Ok(task) => task,
            Err(err) => {
                let err = TaskOpError::persistence(TaskOp::Add, err);
                warn!(title = %candidate.title, error = %err, "creating task failed");
                return Err(err);
            }
        };
        let id = created.id;
        let created = created.validated().map_err(|err| {
            warn!(%id, error = %err, "gateway returned an invalid task");
            TaskOpError::persistence(TaskOp::Add, err)
        })?;

        if let Err(duplicate) = self.write_store().insert(created.clone()) {
            warn!(id = %created.id, "gateway returned an id that is already stored");
            return Err(TaskOpError::persistence(TaskOp::Add, duplicate));
        }
        info!(id = %created.id, list = %created.list, "task added");
        self.notify(StoreEvent::TaskAdded(created.id));
        Ok(created)
    }

    /// Flip a task's completion flag once the gateway accepts the new value.
    ///
    /// # Errors
    /// - [`TaskOpError::NotFound`] when the id is not stored (checked after waiting
    ///   for any in-flight operation on the same id).
    /// - [`TaskOpError::Persistence`] when the gateway rejects the update.
    pub async fn toggle_completion(&self, id: TaskId) -> Result<Task, TaskOpError> {
        self.locks.exclusive(id, self.toggle_locked(id)).await
    }

    async fn toggle_locked(&self, id: TaskId) -> Result<Task, TaskOpError> {
        let completed = {
            let store = self.read_store();
            let task = store.find_by_id(id).ok_or(TaskOpError::NotFound(id))?;
            !task.completed
        };

        if let Err(err) = self.gateway.set_completion(id, completed).await {
            let err = TaskOpError::persistence(TaskOp::Toggle, err);
            warn!(%id, error = %err, "updating completion failed");
            return Err(err);
        }

        let updated = self
            .write_store()
            .set_completed(id, completed)
            .cloned()
            .ok_or(TaskOpError::NotFound(id))?;
        info!(%id, completed, "task completion updated");
        self.notify(StoreEvent::TaskUpdated(id));
        Ok(updated)
    }

    /// Delete a task once the gateway confirms.
    ///
    /// # Errors
    /// - [`TaskOpError::NotFound`] when the id is not stored; the gateway is not called.
    /// - [`TaskOpError::Persistence`] when the gateway rejects the deletion; the task stays.
    pub async fn remove(&self, id: TaskId) -> Result<Task, TaskOpError> {
        self.locks.exclusive(id, self.remove_locked(id)).await
    }

    async fn remove_locked(&self, id: TaskId) -> Result<Task, TaskOpError> {
        if self.read_store().find_by_id(id).is_none() {
            return Err(TaskOpError::NotFound(id));
        }

        if let Err(err) = self.gateway.delete_task(id).await {
            let err = TaskOpError::persistence(TaskOp::Remove, err);
            warn!(%id, error = %err, "deleting task failed");
            return Err(err);
        }

        let removed = self
            .write_store()
            .remove_by_id(id)
            .ok_or(TaskOpError::NotFound(id))?;
        info!(%id, "task removed");
        self.notify(StoreEvent::TaskRemoved(id));
        Ok(removed)
    }
}
