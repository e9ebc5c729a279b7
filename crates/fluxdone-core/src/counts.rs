use time::OffsetDateTime;

use crate::Task;
use crate::category::Category;

/// Badge counts of incomplete tasks for the fixed sidebar categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    /// Incomplete tasks in the inbox list.
    pub inbox: usize,
    /// Incomplete tasks due today.
    pub today: usize,
    /// Incomplete tasks due within the next seven days.
    pub week: usize,
}

impl CategoryCounts {
    /// Scan every task once, ignoring completed ones.
    pub fn compute<'a, I>(tasks: I, now: OffsetDateTime) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        tasks
            .into_iter()
            .filter(|task| !task.completed)
            .fold(Self::default(), |mut counts, task| {
                counts.inbox += usize::from(Category::Inbox.matches(task, now));
                counts.today += usize::from(Category::Today.matches(task, now));
                counts.week += usize::from(Category::Next7Days.matches(task, now));
                counts
            })
    }
}
