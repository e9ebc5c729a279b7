//! Change notifications for presentation layers.

use fluxdone_core::{Category, SortMode, TaskId};

/// Something observable changed; subscribers should recompute their view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Store contents were replaced by a fetch.
    Reloaded {
        /// Category that was fetched.
        category: Category,
        /// Number of tasks now held.
        count: usize,
    },
    /// A confirmed task was inserted.
    TaskAdded(TaskId),
    /// A task's completion flag flipped.
    TaskUpdated(TaskId),
    /// A task was deleted.
    TaskRemoved(TaskId),
    /// Active category changed.
    CategoryChanged(Category),
    /// Active sort mode changed.
    SortChanged(SortMode),
}

impl StoreEvent {
    /// True when task data (not just view settings) changed, so counts need recomputing.
    #[must_use]
    pub const fn affects_counts(&self) -> bool {
        !matches!(self, Self::CategoryChanged(_) | Self::SortChanged(_))
    }
}
