//! In-process [`TaskGateway`] with failure injection and demo data.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fluxdone_core::{Category, NewTask, Priority, Task, TaskId};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::error::TaskOp;
use crate::gateway::TaskGateway;

/// Errors produced by [`MemoryGateway`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryGatewayError {
    /// Failure switched on through [`MemoryGateway::fail`].
    #[error("injected {0:?} failure")]
    Injected(TaskOp),
    /// Update or delete targeted an id the gateway never created.
    #[error("task {0} does not exist")]
    UnknownTask(TaskId),
}

/// A call received by the gateway, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    /// `fetch_tasks`
    Fetch(Category),
    /// `create_task`
    Create(NewTask),
    /// `set_completion`
    SetCompletion(TaskId, bool),
    /// `delete_task`
    Delete(TaskId),
}

/// Gateway keeping tasks in memory. Clones share state.
///
/// Fetching a concrete list returns that list's tasks; fetching a computed
/// category returns everything and leaves date filtering to the caller.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    inner: Arc<MemoryGatewayInner>,
}

#[derive(Debug, Default)]
struct MemoryGatewayInner {
    tasks: Mutex<Vec<Task>>,
    failing: Mutex<HashSet<TaskOp>>,
    calls: Mutex<Vec<GatewayCall>>,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryGateway {
    /// Empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway pre-populated with `tasks`.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let gateway = Self::default();
        *guard(&gateway.inner.tasks) = tasks;
        gateway
    }

    /// Gateway seeded with the sample tasks shipped with the web client.
    #[must_use]
    pub fn with_demo_data(now: OffsetDateTime) -> Self {
        Self::with_tasks(demo_tasks(now))
    }

    /// Make every subsequent call of `op` fail until [`recover`](Self::recover).
    pub fn fail(&self, op: TaskOp) {
        guard(&self.inner.failing).insert(op);
    }

    /// Stop failing `op`.
    pub fn recover(&self, op: TaskOp) {
        guard(&self.inner.failing).remove(&op);
    }

    /// Calls received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        guard(&self.inner.calls).clone()
    }

    /// Snapshot of the persisted tasks.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        guard(&self.inner.tasks).clone()
    }

    fn record(&self, call: GatewayCall, op: TaskOp) -> Result<(), MemoryGatewayError> {
        guard(&self.inner.calls).push(call);
        if guard(&self.inner.failing).contains(&op) {
            return Err(MemoryGatewayError::Injected(op));
        }
        Ok(())
    }
}

impl TaskGateway for MemoryGateway {
    type Error = MemoryGatewayError;

    async fn fetch_tasks(&self, category: &Category) -> Result<Vec<Task>, Self::Error> {
        self.record(GatewayCall::Fetch(category.clone()), TaskOp::Load)?;
        let tasks = guard(&self.inner.tasks);
        Ok(tasks
            .iter()
            .filter(|task| category.is_virtual() || task.list == category.as_str())
            .cloned()
            .collect())
    }

    async fn create_task(&self, candidate: &NewTask) -> Result<Task, Self::Error> {
        self.record(GatewayCall::Create(candidate.clone()), TaskOp::Add)?;
        let task = candidate.clone().into_task(TaskId::new());
        guard(&self.inner.tasks).push(task.clone());
        Ok(task)
    }

    async fn set_completion(&self, id: TaskId, completed: bool) -> Result<(), Self::Error> {
        self.record(GatewayCall::SetCompletion(id, completed), TaskOp::Toggle)?;
        let mut tasks = guard(&self.inner.tasks);
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(MemoryGatewayError::UnknownTask(id))?;
        task.completed = completed;
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), Self::Error> {
        self.record(GatewayCall::Delete(id), TaskOp::Remove)?;
        let mut tasks = guard(&self.inner.tasks);
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Err(MemoryGatewayError::UnknownTask(id));
        }
        Ok(())
    }
}

fn demo_tasks(now: OffsetDateTime) -> Vec<Task> {
    let samples: [(&str, &str, Priority, bool, Option<Duration>); 14] = [
        ("Review project proposal", "inbox", Priority::High, false, Some(Duration::ZERO)),
        ("Buy groceries for dinner", "inbox", Priority::Medium, false, Some(Duration::days(1))),
        ("Schedule dentist appointment", "inbox", Priority::Low, true, None),
        ("Read article about productivity", "inbox", Priority::None, false, None),
        ("Team standup meeting", "work", Priority::Medium, false, Some(Duration::ZERO)),
        ("Submit expense report", "work", Priority::High, false, Some(Duration::days(2))),
        ("Update documentation", "work", Priority::Low, true, None),
        ("Code review for PR #234", "work", Priority::Medium, false, Some(Duration::days(1))),
        ("Prepare presentation slides", "work", Priority::High, false, Some(Duration::days(3))),
        ("Buy groceries for dinner", "personal", Priority::Medium, false, Some(Duration::days(1))),
        ("Call mom", "personal", Priority::Low, false, None),
        ("Plan weekend trip", "personal", Priority::None, false, Some(Duration::days(4))),
        ("Milk", "shopping", Priority::Low, false, None),
        ("Eggs", "shopping", Priority::Low, false, None),
    ];

    samples
        .into_iter()
        .map(|(title, list, priority, completed, due_in)| Task {
            id: TaskId::new(),
            title: title.to_owned(),
            completed,
            priority,
            due_date: due_in.map(|offset| now + offset),
            list: list.to_owned(),
            created_at: now,
        })
        .collect()
}
