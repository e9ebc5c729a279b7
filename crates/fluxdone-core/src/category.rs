use std::borrow::Cow;
use std::fmt;

use time::OffsetDateTime;

use crate::Task;
use crate::clock::{is_due_today, is_due_within_week};

/// Name of the default concrete list.
pub const INBOX: &str = "inbox";
/// Name of the computed "due today" category.
pub const TODAY: &str = "today";
/// Name of the computed "due within a week" category.
pub const NEXT_7_DAYS: &str = "next7days";

/// Active grouping of tasks: a concrete list or a date-derived view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// The `inbox` list.
    #[default]
    Inbox,
    /// Tasks due on the current local calendar day.
    Today,
    /// Tasks due between now and seven days from now, inclusive.
    Next7Days,
    /// Any other list, matched by exact name.
    List(String),
}

impl Category {
    /// Wire/token name of the category.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inbox => INBOX,
            Self::Today => TODAY,
            Self::Next7Days => NEXT_7_DAYS,
            Self::List(name) => name,
        }
    }

    /// True for categories computed from due dates rather than stored on tasks.
    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        matches!(self, Self::Today | Self::Next7Days)
    }

    /// Title shown above the task list.
    #[must_use]
    pub fn display_name(&self) -> Cow<'_, str> {
        match self {
            Self::Inbox => Cow::Borrowed("Inbox"),
            Self::Today => Cow::Borrowed("Today"),
            Self::Next7Days => Cow::Borrowed("Next 7 Days"),
            Self::List(name) => match name.as_str() {
                "personal" => Cow::Borrowed("Personal"),
                "work" => Cow::Borrowed("Work"),
                "shopping" => Cow::Borrowed("Shopping"),
                other => Cow::Borrowed(other),
            },
        }
    }

    /// List that new tasks created while this category is active belong to.
    #[must_use]
    pub fn target_list<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.is_virtual() {
            fallback
        } else {
            self.as_str()
        }
    }

    /// Decide whether `task` belongs to this category at instant `now`.
    #[must_use]
    pub fn matches(&self, task: &Task, now: OffsetDateTime) -> bool {
        match self {
            Self::Today => task.due_date.is_some_and(|due| is_due_today(due, now)),
            Self::Next7Days => task
                .due_date
                .is_some_and(|due| is_due_within_week(due, now)),
            Self::Inbox | Self::List(_) => task.list == self.as_str(),
        }
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        match name {
            INBOX => Self::Inbox,
            TODAY => Self::Today,
            NEXT_7_DAYS => Self::Next7Days,
            other => Self::List(other.to_owned()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Select the tasks that belong to `category`, preserving input order.
pub fn filter_tasks<'a, I>(tasks: I, category: &Category, now: OffsetDateTime) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|task| category.matches(task, now))
        .collect()
}
