use crate::category::Category;
use crate::id::TaskId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// Validation failures raised while building task values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Title was empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,
    /// Tasks can only live in concrete lists.
    #[error("'{0}' is a computed category, not a list")]
    VirtualList(String),
    /// List name was empty after trimming.
    #[error("list name must not be empty")]
    EmptyList,
    /// Priority outside the 1..=4 range.
    #[error("invalid priority {0} (expected 1-4)")]
    InvalidPriority(u8),
}

/// Task priority. Lower numeric values sort first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    /// Priority 1.
    High = 1,
    /// Priority 2.
    Medium = 2,
    /// Priority 3.
    Low = 3,
    /// Priority 4, used when nothing else is chosen.
    #[default]
    None = 4,
}

/// Display attributes attached to a priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityDescriptor {
    /// Human-readable label.
    pub label: &'static str,
    /// CSS hex color used by the presentation layer.
    pub color: &'static str,
}

impl Priority {
    /// Every priority, highest first.
    pub const ALL: [Self; 4] = [Self::High, Self::Medium, Self::Low, Self::None];

    /// Numeric wire value (1-4).
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Label and color shown for this priority.
    #[must_use]
    pub const fn descriptor(self) -> PriorityDescriptor {
        match self {
            Self::High => PriorityDescriptor {
                label: "High",
                color: "#FF5E5E",
            },
            Self::Medium => PriorityDescriptor {
                label: "Medium",
                color: "#FAA05A",
            },
            Self::Low => PriorityDescriptor {
                label: "Low",
                color: "#5EB1FF",
            },
            Self::None => PriorityDescriptor {
                label: "None",
                color: "#808080",
            },
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = TaskError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::High),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Low),
            4 => Ok(Self::None),
            other => Err(TaskError::InvalidPriority(other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.value()
    }
}

/// A to-do item as held by the store and exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Backend-assigned identifier.
    pub id: TaskId,
    /// Trimmed, non-empty title.
    pub title: String,
    /// Completion flag; the only field that changes after creation.
    #[serde(default)]
    pub completed: bool,
    /// Priority (defaults to [`Priority::None`]).
    #[serde(default)]
    pub priority: Priority,
    /// Optional due instant.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    /// Concrete list the task belongs to.
    pub list: String,
    /// Creation instant.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Task {
    /// Whether the task has a due date.
    #[must_use]
    pub const fn is_dated(&self) -> bool {
        self.due_date.is_some()
    }

    /// Check a task received from a backend, trimming its title and list.
    ///
    /// # Errors
    /// Returns the same [`TaskError`] a [`NewTask`] with these fields would.
    pub fn validated(mut self) -> Result<Self, TaskError> {
        self.title = normalize_title(&self.title)?;
        self.list = validate_list(&self.list)?;
        Ok(self)
    }
}

/// Candidate task sent to the backend before an id exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Always `false` for fresh candidates.
    pub completed: bool,
    /// Requested priority.
    pub priority: Priority,
    /// Optional due instant.
    #[serde(with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    /// Concrete list.
    pub list: String,
    /// Creation instant.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl NewTask {
    /// Validate inputs and build a candidate.
    ///
    /// # Errors
    /// Returns [`TaskError`] when the title is blank or `list` is not a concrete list.
    pub fn new(
        title: &str,
        priority: Priority,
        list: &str,
        created_at: OffsetDateTime,
    ) -> Result<Self, TaskError> {
        Ok(Self {
            title: normalize_title(title)?,
            completed: false,
            priority,
            due_date: None,
            list: validate_list(list)?,
            created_at,
        })
    }

    /// Attach a due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<OffsetDateTime>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Materialize the candidate with an assigned id.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            completed: self.completed,
            priority: self.priority,
            due_date: self.due_date,
            list: self.list,
            created_at: self.created_at,
        }
    }
}

/// Trim a title, rejecting blank input.
///
/// # Errors
/// Returns [`TaskError::EmptyTitle`] when nothing remains after trimming.
pub fn normalize_title(raw: &str) -> Result<String, TaskError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}

/// Trim a list name, rejecting blank input and computed categories.
///
/// # Errors
/// Returns [`TaskError::EmptyList`] or [`TaskError::VirtualList`].
pub fn validate_list(raw: &str) -> Result<String, TaskError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskError::EmptyList);
    }
    if Category::from(trimmed).is_virtual() {
        return Err(TaskError::VirtualList(trimmed.to_owned()));
    }
    Ok(trimmed.to_owned())
}
