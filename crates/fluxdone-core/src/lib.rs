//! Domain types and pure view logic for FluxDone tasks.

/// Category model and filtering.
pub mod category;
/// Clock abstraction and calendar helpers.
pub mod clock;
/// Sidebar badge counts.
pub mod counts;
/// Identifier types.
pub mod id;
/// Sort modes.
pub mod sort;
/// Task entity and candidates.
pub mod task;

pub use category::{Category, filter_tasks};
pub use clock::{Clock, FixedClock, SystemClock};
pub use counts::CategoryCounts;
pub use id::TaskId;
pub use sort::{SortMode, sort_tasks};
pub use task::{NewTask, Priority, PriorityDescriptor, Task, TaskError};

use time::OffsetDateTime;

/// Filter `tasks` down to `category` and order the result by `mode`.
pub fn select_view<'a, I>(
    tasks: I,
    category: &Category,
    mode: SortMode,
    now: OffsetDateTime,
) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut selected = filter_tasks(tasks, category, now);
    sort_tasks(&mut selected, mode);
    selected
}
