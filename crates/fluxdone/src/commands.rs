use std::str::FromStr;

use anyhow::{Context, Result};
use fluxdone_app::{
    AddTask, FluxConfig, TaskGateway, TaskMediator, TaskOpError, parse_category, parse_due_date,
    parse_priority, parse_sort_mode,
};
use fluxdone_core::clock::{due_label, is_overdue};
use fluxdone_core::{Category, CategoryCounts, Task, TaskId};
use time::OffsetDateTime;

use crate::{Command, LsFormat};

pub async fn run<G: TaskGateway>(
    command: Command,
    mediator: &TaskMediator<G>,
    config: &FluxConfig,
) -> Result<()> {
    match command {
        Command::Ls {
            category,
            sort,
            format,
        } => {
            if let Some(sort) = sort {
                mediator.set_sort(parse_sort_mode(&sort)?);
            }
            load(mediator, category.as_deref()).await?;

            let state = mediator.view_state();
            let tasks = mediator.view();
            match format {
                LsFormat::Table => {
                    println!("{} ({})", state.category.display_name(), state.sort.confirmation());
                    if tasks.is_empty() {
                        println!("No tasks found");
                        return Ok(());
                    }
                    let now = mediator.now();
                    println!("ID | Done | Priority | Title | List | Due");
                    println!("-- | ---- | -------- | ----- | ---- | ---");
                    for task in &tasks {
                        println!("{}", format_task_row(task, now));
                    }
                }
                LsFormat::Json => println!("{}", serde_json::to_string_pretty(&tasks)?),
            }
        }
        Command::Add {
            title,
            priority,
            list,
            due,
        } => {
            let priority = priority
                .as_deref()
                .map(parse_priority)
                .transpose()?
                .unwrap_or(config.view.default_priority);
            let mut request = AddTask::new(title).priority(priority);
            if let Some(list) = list {
                request = request.list(list);
            }
            if let Some(due) = due {
                request = request.due(parse_due_date(&due, mediator.now().offset())?);
            }
            let task = mediator.add(request).await.map_err(report)?;
            println!("created task: {} ({})", task.id, task.list);
        }
        Command::Done { task, category } => {
            let id = parse_task_id(&task)?;
            load(mediator, category.as_deref()).await?;
            let task = mediator.toggle_completion(id).await.map_err(report)?;
            let state = if task.completed { "completed" } else { "reopened" };
            println!("{state} task: {} ({})", task.id, task.title);
        }
        Command::Rm { task, category } => {
            let id = parse_task_id(&task)?;
            load(mediator, category.as_deref()).await?;
            let task = mediator.remove(id).await.map_err(report)?;
            println!("deleted task: {} ({})", task.id, task.title);
        }
        Command::Counts => {
            // Computed categories fetch every list.
            mediator.load(Category::Next7Days).await.map_err(report)?;
            print!("{}", format_counts(mediator.counts()));
        }
    }

    Ok(())
}

async fn load<G: TaskGateway>(mediator: &TaskMediator<G>, category: Option<&str>) -> Result<()> {
    let category = match category {
        Some(raw) => parse_category(raw)?,
        None => mediator.view_state().category,
    };
    mediator.load(category).await.map_err(report)?;
    Ok(())
}

fn report(err: TaskOpError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

fn parse_task_id(raw: &str) -> Result<TaskId> {
    TaskId::from_str(raw).with_context(|| format!("Invalid task id: {raw}"))
}

fn format_task_row(task: &Task, now: OffsetDateTime) -> String {
    let done = if task.completed { "x" } else { " " };
    let due = task.due_date.map_or_else(
        || "-".to_owned(),
        |due| {
            let label = due_label(due, now);
            if !task.completed && is_overdue(due, now) {
                format!("{label} (overdue)")
            } else {
                label
            }
        },
    );
    format!(
        "{} | [{done}] | {} | {} | {} | {due}",
        task.id,
        task.priority.descriptor().label,
        task.title,
        task.list
    )
}

fn format_counts(counts: CategoryCounts) -> String {
    format!(
        "{}: {}\n{}: {}\n{}: {}\n",
        Category::Inbox.display_name(),
        counts.inbox,
        Category::Today.display_name(),
        counts.today,
        Category::Next7Days.display_name(),
        counts.week
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxdone_app::MemoryGateway;
    use fluxdone_core::Priority;
    use time::Duration;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-10-16 09:00 UTC);

    fn task(due: Option<OffsetDateTime>, completed: bool) -> Task {
        Task {
            id: TaskId::from_str("00000000-0000-4000-8000-000000000001")
                .unwrap_or_else(|err| panic!("must parse task id: {err}")),
            title: "Pay rent".to_owned(),
            completed,
            priority: Priority::High,
            due_date: due,
            list: "inbox".to_owned(),
            created_at: NOW,
        }
    }

    #[test]
    fn rows_show_due_labels_and_overdue_marker() {
        assert_eq!(
            format_task_row(&task(None, false), NOW),
            "00000000-0000-4000-8000-000000000001 | [ ] | High | Pay rent | inbox | -"
        );
        assert!(format_task_row(&task(Some(NOW + Duration::days(1)), false), NOW).ends_with("| Tomorrow"));
        assert!(
            format_task_row(&task(Some(NOW - Duration::days(2)), false), NOW)
                .ends_with("| Oct 14 (overdue)")
        );
        assert!(format_task_row(&task(Some(NOW - Duration::days(2)), true), NOW).ends_with("| Oct 14"));
    }

    #[test]
    fn counts_use_display_names() {
        let counts = CategoryCounts {
            inbox: 3,
            today: 2,
            week: 8,
        };
        assert_eq!(format_counts(counts), "Inbox: 3\nToday: 2\nNext 7 Days: 8\n");
    }

    #[test]
    fn reported_errors_lead_with_user_message() {
        let err = report(TaskOpError::NotFound(TaskId::new()));
        assert_eq!(err.to_string(), "Task not found");
        assert!(format!("{err:#}").contains("not found"));
    }

    #[tokio::test]
    async fn add_then_done_against_memory_gateway() -> Result<()> {
        let config = FluxConfig::default();
        let gateway = MemoryGateway::new();
        let mediator = TaskMediator::from_config(gateway.clone(), &config);

        run(
            Command::Add {
                title: "Buy milk".into(),
                priority: Some("high".into()),
                list: None,
                due: Some("2025-10-17".into()),
            },
            &mediator,
            &config,
        )
        .await?;
        let created = gateway.tasks();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].priority, Priority::High);
        assert!(created[0].due_date.is_some());

        run(
            Command::Done {
                task: created[0].id.to_string(),
                category: Some("inbox".into()),
            },
            &mediator,
            &config,
        )
        .await?;
        assert!(gateway.tasks()[0].completed);

        let missing = run(
            Command::Rm {
                task: TaskId::new().to_string(),
                category: None,
            },
            &mediator,
            &config,
        )
        .await;
        assert!(missing.is_err());
        Ok(())
    }
}
