use std::borrow::Borrow;
use std::cmp::Ordering;

use feruca::Collator;

use crate::Task;

/// Ordering applied to a task view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortMode {
    /// Incomplete first, then newest first.
    #[default]
    Custom,
    /// Highest priority first.
    Priority,
    /// Earliest due date first, undated last.
    DueDate,
    /// Alphabetical by title, using Unicode collation.
    Title,
}

impl SortMode {
    /// Every sort mode.
    pub const ALL: [Self; 4] = [Self::Custom, Self::Priority, Self::DueDate, Self::Title];

    /// Token used in configuration and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Priority => "priority",
            Self::DueDate => "due-date",
            Self::Title => "title",
        }
    }

    /// Confirmation shown after switching modes, e.g. `Sorted by due date`.
    #[must_use]
    pub fn confirmation(self) -> String {
        format!("Sorted by {}", self.as_str().replace('-', " "))
    }

    /// Compare two tasks under this mode.
    ///
    /// Sorting many tasks should go through [`sort_tasks`], which reuses one collator.
    #[must_use]
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        self.compare_with(&mut Collator::default(), a, b)
    }

    fn compare_with(self, collator: &mut Collator, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Custom => a
                .completed
                .cmp(&b.completed)
                .then_with(|| b.created_at.cmp(&a.created_at)),
            Self::Priority => a.priority.cmp(&b.priority),
            Self::DueDate => match (a.due_date, b.due_date) {
                (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Title => collator.collate(&a.title, &b.title),
        }
    }
}

/// Stable in-place sort; equal keys keep their relative order.
pub fn sort_tasks<T: Borrow<Task>>(tasks: &mut [T], mode: SortMode) {
    // CLDR root order: accents and case only break ties between equal base letters.
    let mut collator = Collator::default();
    tasks.sort_by(|a, b| mode.compare_with(&mut collator, a.borrow(), b.borrow()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Priority, TaskId};
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};

    fn task(title: &str) -> Task {
        Task {
            id: TaskId::new(),
            title: title.to_owned(),
            completed: false,
            priority: Priority::None,
            due_date: None,
            list: "inbox".to_owned(),
            created_at: datetime!(2025-03-01 00:00 UTC),
        }
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn priority_sort_is_stable_for_equal_priorities() {
        let mut tasks: Vec<Task> = [(Priority::Medium, "a"), (Priority::High, "b"), (Priority::None, "c"), (Priority::High, "d")]
            .into_iter()
            .map(|(priority, title)| Task {
                priority,
                ..task(title)
            })
            .collect();
        sort_tasks(&mut tasks, SortMode::Priority);
        assert_eq!(titles(&tasks), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn due_date_sort_places_undated_last() {
        let base = datetime!(2025-03-10 12:00 UTC);
        let mut tasks = vec![
            task("undated-1"),
            Task {
                due_date: Some(base + Duration::days(30)),
                ..task("late")
            },
            task("undated-2"),
            Task {
                due_date: Some(base - Duration::days(365)),
                ..task("ancient")
            },
        ];
        sort_tasks(&mut tasks, SortMode::DueDate);
        assert_eq!(titles(&tasks), vec!["ancient", "late", "undated-1", "undated-2"]);
    }

    #[test]
    fn custom_sort_groups_incomplete_first_then_newest() {
        let at = |h: u8| -> OffsetDateTime { datetime!(2025-03-10 00:00 UTC) + Duration::hours(i64::from(h)) };
        let mut tasks = vec![
            Task {
                created_at: at(1),
                completed: true,
                ..task("old-done")
            },
            Task {
                created_at: at(2),
                ..task("old-open")
            },
            Task {
                created_at: at(5),
                completed: true,
                ..task("new-done")
            },
            Task {
                created_at: at(4),
                ..task("new-open")
            },
        ];
        sort_tasks(&mut tasks, SortMode::Custom);
        assert_eq!(titles(&tasks), vec!["new-open", "old-open", "new-done", "old-done"]);
    }

    #[test]
    fn custom_sort_keeps_input_order_on_identical_keys() {
        let mut tasks = vec![task("first"), task("second"), task("third")];
        sort_tasks(&mut tasks, SortMode::Custom);
        assert_eq!(titles(&tasks), vec!["first", "second", "third"]);
    }

    #[test]
    fn title_sort_ignores_case() {
        let mut tasks = vec![task("banana"), task("Apple"), task("cherry"), task("apple")];
        sort_tasks(&mut tasks, SortMode::Title);
        assert_eq!(titles(&tasks), vec!["apple", "Apple", "banana", "cherry"]);
    }

    #[test]
    fn title_sort_treats_accented_letters_as_their_base_letter() {
        let mut tasks = vec![task("zebra"), task("\u{c9}clair"), task("eggs")];
        sort_tasks(&mut tasks, SortMode::Title);
        assert_eq!(titles(&tasks), vec!["\u{c9}clair", "eggs", "zebra"]);
    }

    #[test]
    fn title_compare_agrees_with_sort() {
        let accented = task("\u{e9}t\u{e9}");
        let plain = task("ete");
        let later = task("f");
        assert_eq!(SortMode::Title.compare(&plain, &accented), Ordering::Less);
        assert_eq!(SortMode::Title.compare(&accented, &later), Ordering::Less);
    }

    #[test]
    fn sorts_borrowed_slices() {
        let owned = [task("b"), task("a")];
        let mut refs: Vec<&Task> = owned.iter().collect();
        sort_tasks(&mut refs, SortMode::Title);
        assert_eq!(refs[0].title, "a");
    }

    #[test]
    fn confirmation_reads_naturally() {
        assert_eq!(SortMode::DueDate.confirmation(), "Sorted by due date");
        assert_eq!(SortMode::Custom.confirmation(), "Sorted by custom");
    }
}
