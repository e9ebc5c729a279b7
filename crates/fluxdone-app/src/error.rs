//! Outcome errors for task operations.

use anyhow::Error;
use fluxdone_core::{TaskError, TaskId};
use thiserror::Error;

/// Which mediated operation produced a [`TaskOpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOp {
    /// Initial or repeated fetch of a category.
    Load,
    /// Task creation.
    Add,
    /// Completion toggle.
    Toggle,
    /// Task deletion.
    Remove,
}

/// Failure of a mediated operation. The store is unchanged whenever one is returned.
#[derive(Debug, Error)]
pub enum TaskOpError {
    /// Input rejected before contacting the backend.
    #[error("invalid input: {0}")]
    Validation(#[from] TaskError),
    /// Target task is not in the local store.
    #[error("task {0} not found")]
    NotFound(TaskId),
    /// Backend call failed or returned an unusable result.
    #[error("{op:?} failed: {source}")]
    Persistence {
        /// Operation that was attempted.
        op: TaskOp,
        /// Underlying gateway error.
        #[source]
        source: Error,
    },
}

impl TaskOpError {
    pub(crate) fn persistence(op: TaskOp, source: impl Into<Error>) -> Self {
        Self::Persistence {
            op,
            source: source.into(),
        }
    }

    /// Short message suitable for a toast or status line.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(TaskError::EmptyTitle) => "Please enter a task title",
            Self::Validation(_) => "Invalid task",
            Self::NotFound(_) => "Task not found",
            Self::Persistence { op, .. } => match op {
                TaskOp::Load => "Failed to load tasks",
                TaskOp::Add => "Failed to add task",
                TaskOp::Toggle => "Failed to update task",
                TaskOp::Remove => "Failed to delete task",
            },
        }
    }
}
