//! Authoritative in-memory task collection.

use std::collections::HashMap;

use fluxdone_core::{Task, TaskId};
use thiserror::Error;
use tracing::warn;

/// Insert rejected because the id is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("task {0} already exists")]
pub struct DuplicateTask(pub TaskId);

/// Tasks in insertion order with an id index.
#[derive(Debug, Default, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    index: HashMap<TaskId, usize>,
}

impl TaskStore {
    /// Build a store from fetched tasks; invalid rows and later duplicates of an id are dropped.
    #[must_use]
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut store = Self::default();
        store.replace_all(tasks);
        store
    }

    /// Replace every task, returning how many rows were dropped.
    ///
    /// Rows failing [`Task::validated`] and repeated ids never reach the store.
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> usize {
        self.tasks.clear();
        self.index.clear();
        let mut dropped = 0;
        for task in tasks {
            let id = task.id;
            let task = match task.validated() {
                Ok(task) => task,
                Err(err) => {
                    warn!(%id, error = %err, "dropping invalid task from fetch");
                    dropped += 1;
                    continue;
                }
            };
            if let Err(DuplicateTask(id)) = self.insert(task) {
                warn!(%id, "dropping duplicate task from fetch");
                dropped += 1;
            }
        }
        dropped
    }

    /// Append a task.
    ///
    /// # Errors
    /// Returns [`DuplicateTask`] when a task with the same id is already stored.
    pub fn insert(&mut self, task: Task) -> Result<(), DuplicateTask> {
        if self.index.contains_key(&task.id) {
            return Err(DuplicateTask(task.id));
        }
        self.index.insert(task.id, self.tasks.len());
        self.tasks.push(task);
        Ok(())
    }

    /// Remove and return the task with `id`.
    pub fn remove_by_id(&mut self, id: TaskId) -> Option<Task> {
        let idx = self.index.remove(&id)?;
        let removed = self.tasks.remove(idx);
        self.rebuild_index();
        Some(removed)
    }

    /// Look up a task.
    #[must_use]
    pub fn find_by_id(&self, id: TaskId) -> Option<&Task> {
        self.index.get(&id).and_then(|&idx| self.tasks.get(idx))
    }

    /// Overwrite the completion flag. Returns the updated task, or `None` if absent.
    pub fn set_completed(&mut self, id: TaskId, completed: bool) -> Option<&Task> {
        let idx = *self.index.get(&id)?;
        let task = self.tasks.get_mut(idx)?;
        task.completed = completed;
        Some(&*task)
    }

    /// All tasks in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of stored tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when no tasks are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (idx, task) in self.tasks.iter().enumerate() {
            self.index.insert(task.id, idx);
        }
    }
}
